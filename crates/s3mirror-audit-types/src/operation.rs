//! Mutating storage operations.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// Storage operations that are mirrored and shipped.
///
/// Serialized and displayed as the gateway's API name, e.g. `PutObject`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, EnumIter, EnumString)]
pub enum OperationName {
    PutBucket,
    PutObject,
    DeleteBucket,
    DeleteObject,
    DeleteMultipleObjects,
    CopyObject,
    NewMultipartUpload,
    CompleteMultipartUpload,
    AbortMultipartUpload,
    PutObjectPart,
    CopyObjectPart,
}

impl OperationName {
    /// Get all operations.
    pub fn all() -> impl Iterator<Item = Self> {
        Self::iter()
    }

    /// Look up an operation by its API name. Matching is case-sensitive.
    pub fn from_api_name(name: &str) -> Option<Self> {
        name.parse().ok()
    }

    /// Whether the operation acts on a bucket rather than on an object.
    pub fn is_bucket_level(&self) -> bool {
        matches!(self, Self::PutBucket | Self::DeleteBucket)
    }
}
