//! Wire shapes exchanged with the mirroring function.

use s3mirror_audit_types::OperationName;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Response header key carrying the content hash in a mirror request.
pub const HASH_MARKER_HEADER: &str = "X-FLEEK-IPFS-HASH";

/// The storage operation being mirrored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageOperation {
    pub bucket: String,
    pub name: OperationName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
}

impl StorageOperation {
    pub fn new(name: OperationName, bucket: impl Into<String>, object: Option<String>) -> Self {
        Self {
            bucket: bucket.into(),
            name,
            object,
        }
    }

    pub fn put_bucket(bucket: impl Into<String>) -> Self {
        Self::new(OperationName::PutBucket, bucket, None)
    }

    pub fn put_object(bucket: impl Into<String>, object: impl Into<String>) -> Self {
        Self::new(OperationName::PutObject, bucket, Some(object.into()))
    }
}

/// Payload sent to the mirroring function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorRequest {
    pub entry: MirrorEntry,
    pub hash: String,
}

/// The operation plus the headers the function needs to act on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorEntry {
    pub api: StorageOperation,
    #[serde(rename = "requestHeader")]
    pub request_header: HashMap<String, String>,
    #[serde(rename = "responseHeader")]
    pub response_header: HashMap<String, String>,
}

impl MirrorRequest {
    /// Build the request for one operation.
    pub fn new(operation: &StorageOperation, token: impl Into<String>, hash: impl Into<String>) -> Self {
        let hash = hash.into();
        let request_header = HashMap::from([(crate::AUTH_KEY.to_string(), token.into())]);
        let response_header = HashMap::from([(HASH_MARKER_HEADER.to_string(), hash.clone())]);
        Self {
            entry: MirrorEntry {
                api: operation.clone(),
                request_header,
                response_header,
            },
            hash,
        }
    }

    /// Serialize to the JSON payload.
    pub fn to_payload(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

/// Body returned by the mirroring function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    #[serde(default)]
    pub headers: HashMap<String, String>,
}
