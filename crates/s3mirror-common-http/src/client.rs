//! HTTP client configuration.

use parking_lot::RwLock;
use reqwest::header::HeaderMap;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Request timeout.
    pub request_timeout: Duration,
    /// User agent string.
    pub user_agent: String,
    /// Maximum idle connections kept per host.
    pub pool_max_idle_per_host: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            user_agent: format!("s3mirror/{}", env!("CARGO_PKG_VERSION")),
            pool_max_idle_per_host: 10,
        }
    }
}

/// Build a configured HTTP client.
pub fn build_client(config: &HttpConfig) -> Result<Client, HttpError> {
    ClientBuilder::new()
        .connect_timeout(config.connect_timeout)
        .timeout(config.request_timeout)
        .user_agent(&config.user_agent)
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .build()
        .map_err(HttpError::ClientBuild)
}

/// HTTP errors.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("request timed out")]
    Timeout,
}

impl HttpError {
    /// Whether the error came from the transport rather than from a response.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Request(_) | Self::Timeout)
    }
}

impl From<reqwest::Error> for HttpError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            HttpError::Timeout
        } else if e.is_builder() {
            HttpError::InvalidRequest(e.to_string())
        } else {
            HttpError::Request(e)
        }
    }
}

/// Shared HTTP client.
///
/// The connection pool lives inside the current [`Client`]; cloning the client
/// is cheap and every clone shares the pool. [`HttpClient::close_idle_connections`]
/// swaps in a freshly built client so later requests start from an empty pool.
#[derive(Debug)]
pub struct HttpClient {
    config: HttpConfig,
    inner: RwLock<Client>,
}

impl HttpClient {
    /// Create a new HTTP client with default config.
    pub fn new() -> Result<Self, HttpError> {
        Self::with_config(HttpConfig::default())
    }

    /// Create a new HTTP client with custom config.
    pub fn with_config(config: HttpConfig) -> Result<Self, HttpError> {
        let inner = build_client(&config)?;
        Ok(Self {
            config,
            inner: RwLock::new(inner),
        })
    }

    /// The configuration this client was built from.
    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    /// Get a handle to the current reqwest client.
    pub fn inner(&self) -> Client {
        self.inner.read().clone()
    }

    /// Drop pooled connections by replacing the underlying client.
    ///
    /// In-flight requests keep their own handle and finish on the old pool.
    pub fn close_idle_connections(&self) {
        match build_client(&self.config) {
            Ok(fresh) => {
                *self.inner.write() = fresh;
                tracing::debug!("closed idle HTTP connections");
            }
            Err(e) => tracing::warn!(error = %e, "failed to rebuild HTTP client, keeping pool"),
        }
    }

    /// Make a GET request with query parameters.
    pub async fn get(
        &self,
        url: &str,
        query: &[(&str, &str)],
        timeout: Option<Duration>,
    ) -> Result<reqwest::Response, HttpError> {
        tracing::debug!("Making GET request to: {}", url);
        let mut request = self.inner().get(url).query(query);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        let response = request.send().await.map_err(HttpError::from)?;
        tracing::debug!("GET response: {} {}", response.status(), url);
        Ok(response)
    }

    /// Make a POST request with a pre-serialized body.
    pub async fn post(
        &self,
        url: &str,
        headers: HeaderMap,
        body: Vec<u8>,
        timeout: Option<Duration>,
    ) -> Result<reqwest::Response, HttpError> {
        tracing::debug!("Making POST request to: {}", url);
        let mut request = self.inner().post(url).headers(headers).body(body);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        let response = request.send().await.map_err(HttpError::from)?;
        tracing::debug!("POST response: {} {}", response.status(), url);
        Ok(response)
    }

}
