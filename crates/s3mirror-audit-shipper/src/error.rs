//! Shipping errors. None of these reach the storage handler.

use s3mirror_audit_capture::QueueError;
use s3mirror_common_http::HttpError;

/// Why one entry was not delivered.
#[derive(Debug, thiserror::Error)]
pub enum ShipError {
    #[error("failed to serialize audit record: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("audit sink request failed: {0}")]
    Transport(#[source] HttpError),

    #[error("audit sink returned status {0}")]
    Rejected(u16),
}

/// Why the pipeline could not start.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("audit shipping is disabled")]
    Disabled,

    #[error(transparent)]
    Http(#[from] HttpError),

    #[error(transparent)]
    Queue(#[from] QueueError),
}
