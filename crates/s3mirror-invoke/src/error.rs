//! Mirroring errors.

/// Result of one mirroring call.
pub type MirrorOutcome = Result<(), MirrorError>;

/// Why a mirroring call failed.
#[derive(Debug, thiserror::Error)]
pub enum MirrorError {
    #[error("no usable authorization token in request context")]
    AuthMissing,

    #[error("failed to serialize mirror request: {0}")]
    MarshalFailure(#[source] serde_json::Error),

    #[error("mirror function invocation failed: {0}")]
    InvocationFailure(#[source] InvokeError),

    #[error("mirror function returned status {0}")]
    NonSuccessStatus(u16),
}

impl MirrorError {
    /// Short name for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AuthMissing => "auth_missing",
            Self::MarshalFailure(_) => "marshal_failure",
            Self::InvocationFailure(_) => "invocation_failure",
            Self::NonSuccessStatus(_) => "non_success_status",
        }
    }

    /// Collapse into the error reported at the storage-API boundary.
    pub fn into_storage_error(self) -> StorageError {
        StorageError::BackendDown
    }
}

/// Errors from calling the external function.
#[derive(Debug, thiserror::Error)]
pub enum InvokeError {
    #[error("invocation timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid invocation request: {0}")]
    InvalidRequest(String),
}

/// Storage-API error surfaced by the gateway for any mirroring failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    #[error("mirroring backend unavailable")]
    BackendDown,
}

impl From<MirrorError> for StorageError {
    fn from(e: MirrorError) -> Self {
        e.into_storage_error()
    }
}
