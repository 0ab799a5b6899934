//! Configuration types.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default capacity of the audit shipping queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 10_000;

/// Largest accepted audit queue capacity.
pub const MAX_QUEUE_CAPACITY: usize = 1_000_000;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct S3MirrorConfig {
    /// Mirroring function invocation.
    pub mirror: MirrorConfig,
    /// Audit log sink.
    pub audit: AuditTargetConfig,
    /// Content metadata lookup.
    pub enrichment: EnrichmentConfig,
    /// Gateway warm-up after writes.
    pub announce: AnnounceConfig,
}

/// External function invocation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MirrorConfig {
    /// Name of the function that records bucket/object changes.
    pub function_name: String,
    /// Base URL of the function invocation API.
    pub endpoint: String,
    /// Timeout applied when the caller's context carries none (ms).
    pub timeout_ms: u64,
}

impl MirrorConfig {
    /// Default per-call timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            function_name: String::new(),
            endpoint: "http://localhost:9001".to_string(),
            timeout_ms: 30_000,
        }
    }
}

/// Audit log sink configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditTargetConfig {
    /// Whether audit shipping is enabled.
    pub enabled: bool,
    /// HTTP(s) endpoint receiving audit records.
    pub endpoint: String,
    /// Static `Authorization` value sent with every record.
    pub auth_token: Option<String>,
    /// `User-Agent` sent with every record.
    pub user_agent: String,
    /// Kind of log this target receives, uppercased.
    pub log_kind: String,
    /// Queue capacity. Fixed once the shipper starts.
    pub queue_capacity: usize,
    /// Per-POST timeout (ms).
    pub timeout_ms: u64,
}

impl AuditTargetConfig {
    /// Set the sink endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the static authorization token.
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Set the user agent.
    pub fn with_user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Set the log kind. Stored uppercased.
    pub fn with_log_kind(mut self, kind: impl AsRef<str>) -> Self {
        self.log_kind = kind.as_ref().to_uppercase();
        self
    }

    /// Set the per-POST timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Set the queue capacity.
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Per-POST timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for AuditTargetConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "http://localhost:8080/audit".to_string(),
            auth_token: None,
            user_agent: format!("s3mirror/{}", env!("CARGO_PKG_VERSION")),
            log_kind: "ALL".to_string(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            timeout_ms: 10_000,
        }
    }
}

/// Content metadata lookup configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    /// Info endpoint queried with `bucket` / `object` parameters.
    pub info_endpoint: String,
    /// Per-lookup timeout (ms).
    pub timeout_ms: u64,
}

impl EnrichmentConfig {
    /// Per-lookup timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            info_endpoint: "http://localhost:8889/info".to_string(),
            timeout_ms: 5_000,
        }
    }
}

/// Gateway warm-up configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnounceConfig {
    /// Whether new hashes are announced at all.
    pub enabled: bool,
    /// Gateway base URLs; `/ipfs/<hash>` is appended.
    pub gateways: Vec<String>,
    /// Per-request timeout (ms).
    pub timeout_ms: u64,
}

impl AnnounceConfig {
    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for AnnounceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            gateways: vec![
                "https://gateway.temporal.cloud".to_string(),
                "https://ipfs.fleek.co".to_string(),
                "https://ipfs.io".to_string(),
            ],
            timeout_ms: 10_000,
        }
    }
}
