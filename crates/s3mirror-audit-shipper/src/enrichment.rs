//! Content metadata lookup.

use async_trait::async_trait;
use s3mirror_audit_types::{ContentKind, EnrichmentResult};
use s3mirror_common_config::EnrichmentConfig;
use s3mirror_common_http::{parse_json, HttpClient, HttpError, ResponseError};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Why a lookup produced no metadata.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("invalid lookup request: {0}")]
    InvalidRequest(String),

    #[error("lookup request failed: {0}")]
    Transport(#[source] HttpError),

    #[error("lookup returned status {0}")]
    Status(u16),

    #[error("unreadable lookup response: {0}")]
    Parse(#[source] ResponseError),

    #[error("lookup response carries no hash")]
    MissingHash,
}

/// Resolves the content hash of a bucket or object.
#[async_trait]
pub trait MetadataLookup: Send + Sync {
    async fn lookup(
        &self,
        bucket: &str,
        object: Option<&str>,
    ) -> Result<EnrichmentResult, LookupError>;
}

/// Body returned by the info endpoint.
#[derive(Debug, Deserialize)]
struct InfoResponse {
    #[serde(default)]
    object: Option<String>,
    #[serde(default)]
    hash: String,
}

impl InfoResponse {
    fn into_result(self) -> Result<EnrichmentResult, LookupError> {
        if self.hash.is_empty() {
            return Err(LookupError::MissingHash);
        }
        let kind = match self.object.as_deref() {
            None | Some("") => ContentKind::Bucket,
            Some(_) => ContentKind::Object,
        };
        Ok(EnrichmentResult {
            hash: self.hash,
            kind,
        })
    }
}

/// Queries the info endpoint: `GET <endpoint>?bucket=<b>[&object=<o>]`.
#[derive(Debug, Clone)]
pub struct EnrichmentClient {
    client: Arc<HttpClient>,
    endpoint: String,
    timeout: Duration,
}

impl EnrichmentClient {
    pub fn new(client: Arc<HttpClient>, config: &EnrichmentConfig) -> Self {
        Self {
            client,
            endpoint: config.info_endpoint.clone(),
            timeout: config.timeout(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl MetadataLookup for EnrichmentClient {
    async fn lookup(
        &self,
        bucket: &str,
        object: Option<&str>,
    ) -> Result<EnrichmentResult, LookupError> {
        let mut query = vec![("bucket", bucket)];
        if let Some(object) = object.filter(|o| !o.is_empty()) {
            query.push(("object", object));
        }

        let response = match self.client.get(&self.endpoint, &query, Some(self.timeout)).await {
            Ok(response) => response,
            Err(HttpError::InvalidRequest(msg)) => return Err(LookupError::InvalidRequest(msg)),
            Err(e) => {
                if e.is_transport() {
                    self.client.close_idle_connections();
                }
                return Err(LookupError::Transport(e));
            }
        };

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }

        let info: InfoResponse = parse_json(response).await.map_err(LookupError::Parse)?;
        let result = info.into_result()?;
        debug!(bucket, object, hash = %result.hash, kind = %result.kind, "content metadata resolved");
        Ok(result)
    }
}
