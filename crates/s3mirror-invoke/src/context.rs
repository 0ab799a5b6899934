//! Per-request values handed to the mirroring path by the storage handler.

use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

/// Values the storage handler attaches to an inbound request.
///
/// The context also carries an optional deadline that every external call
/// made on its behalf inherits.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    values: HashMap<String, Value>,
    timeout: Option<Duration>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a value.
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Attach the inbound `Authorization` header value.
    pub fn with_authorization(self, token: impl Into<String>) -> Self {
        self.with_value(crate::credentials::AUTH_KEY, token.into())
    }

    /// Bound every external call made for this request.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}
