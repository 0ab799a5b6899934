//! The external function capability and its HTTP implementation.

use crate::error::InvokeError;
use async_trait::async_trait;
use s3mirror_common_config::MirrorConfig;
use s3mirror_common_http::{HttpClient, HttpConfig, HttpError, RequestBuilder};
use std::sync::Arc;
use std::time::Duration;

/// What came back from one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokeOutput {
    /// Status reported for the invocation.
    pub status_code: u16,
    /// Raw function result.
    pub payload: Vec<u8>,
}

/// Synchronously invokes a named function with a JSON payload.
#[async_trait]
pub trait FunctionInvoker: Send + Sync {
    async fn invoke(
        &self,
        function_name: &str,
        payload: Vec<u8>,
        timeout: Duration,
    ) -> Result<InvokeOutput, InvokeError>;
}

/// Invokes functions over the Lambda `Invoke` HTTP API.
///
/// Posts to `<endpoint>/2015-03-31/functions/<name>/invocations` and reports
/// the HTTP status as the invocation status.
#[derive(Debug, Clone)]
pub struct HttpFunctionInvoker {
    client: Arc<HttpClient>,
    endpoint: String,
}

impl HttpFunctionInvoker {
    pub fn new(client: Arc<HttpClient>, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// Build an invoker with its own client from the mirroring config.
    pub fn from_config(config: &MirrorConfig) -> Result<Self, HttpError> {
        let client = HttpClient::with_config(HttpConfig {
            request_timeout: config.timeout(),
            ..HttpConfig::default()
        })?;
        Ok(Self::new(Arc::new(client), &config.endpoint))
    }

    fn invocation_url(&self, function_name: &str) -> String {
        RequestBuilder::new()
            .base_url(&self.endpoint)
            .url(&format!("/2015-03-31/functions/{}/invocations", function_name))
    }
}

#[async_trait]
impl FunctionInvoker for HttpFunctionInvoker {
    async fn invoke(
        &self,
        function_name: &str,
        payload: Vec<u8>,
        timeout: Duration,
    ) -> Result<InvokeOutput, InvokeError> {
        let url = self.invocation_url(function_name);
        let headers = RequestBuilder::new().json_content().into_headers();

        let response = self
            .client
            .post(&url, headers, payload, Some(timeout))
            .await
            .map_err(|e| match e {
                HttpError::Timeout => InvokeError::Timeout,
                HttpError::InvalidRequest(msg) => InvokeError::InvalidRequest(msg),
                other => InvokeError::Transport(other.to_string()),
            })?;

        let status_code = response.status().as_u16();
        let payload = response
            .bytes()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    InvokeError::Timeout
                } else {
                    InvokeError::Transport(e.to_string())
                }
            })?
            .to_vec();

        Ok(InvokeOutput {
            status_code,
            payload,
        })
    }
}
