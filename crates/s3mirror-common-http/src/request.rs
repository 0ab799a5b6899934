//! HTTP request types and builders.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};

/// Common HTTP headers.
pub mod headers {
    pub const CONTENT_TYPE_JSON: &str = "application/json";
    /// Content hash attached to enriched audit records.
    pub const CONTENT_IPFS_HASH: &str = "CONTENT-IPFS-HASH";
    /// Content kind (`Bucket` or `Object`) attached to enriched audit records.
    pub const IPFS_CONTENT_TYPE: &str = "IPFS-CONTENT-TYPE";
}

/// A request builder with common patterns.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    headers: HeaderMap,
    base_url: Option<String>,
}

impl RequestBuilder {
    /// Create a new request builder.
    pub fn new() -> Self {
        Self {
            headers: HeaderMap::new(),
            base_url: None,
        }
    }

    /// Set the base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Add a header. Names or values that are not valid HTTP are skipped.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        match (
            HeaderName::try_from(name.as_ref()),
            HeaderValue::try_from(value.as_ref()),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            _ => tracing::warn!(header = name.as_ref(), "skipping invalid header"),
        }
        self
    }

    /// Set the raw `Authorization` header, sent exactly as given.
    pub fn authorization(mut self, token: impl AsRef<str>) -> Self {
        if let Ok(value) = HeaderValue::try_from(token.as_ref()) {
            self.headers.insert(AUTHORIZATION, value);
        }
        self
    }

    /// Set the `User-Agent` header.
    pub fn user_agent(mut self, agent: impl AsRef<str>) -> Self {
        if let Ok(value) = HeaderValue::try_from(agent.as_ref()) {
            self.headers.insert(USER_AGENT, value);
        }
        self
    }

    /// Set content type to JSON.
    pub fn json_content(mut self) -> Self {
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static(headers::CONTENT_TYPE_JSON));
        self
    }

    /// Get the built headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Consume the builder, returning its headers.
    pub fn into_headers(self) -> HeaderMap {
        self.headers
    }

    /// Build the URL.
    pub fn url(&self, path: &str) -> String {
        match &self.base_url {
            Some(base) => format!("{}{}", base.trim_end_matches('/'), path),
            None => path.to_string(),
        }
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}
