//! Warming public IPFS gateways after a write.

use crate::hash::convert_to_hash_v0;
use futures_util::future::join_all;
use s3mirror_common_config::AnnounceConfig;
use s3mirror_common_http::HttpClient;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Requests freshly written content from a set of gateways so they fetch
/// and cache it.
#[derive(Debug, Clone)]
pub struct GatewayAnnouncer {
    enabled: bool,
    client: Arc<HttpClient>,
    gateways: Vec<String>,
    timeout: Duration,
}

impl GatewayAnnouncer {
    pub fn new(client: Arc<HttpClient>, config: &AnnounceConfig) -> Self {
        Self {
            enabled: config.enabled,
            client,
            gateways: config.gateways.clone(),
            timeout: config.timeout(),
        }
    }

    /// URL requested on one gateway for a hash.
    pub fn gateway_url(gateway: &str, hash: &str) -> String {
        format!("{}/ipfs/{}", gateway.trim_end_matches('/'), hash)
    }

    /// GET `<gateway>/ipfs/<hash>` on every gateway concurrently, with the
    /// hash in its v0 form.
    ///
    /// Best effort: failures are logged and otherwise ignored. Does nothing
    /// when announcing is disabled or `hash` is not a CID.
    pub async fn announce(&self, hash: &str) {
        if !self.enabled {
            return;
        }
        let Some(hash) = convert_to_hash_v0(hash) else {
            return;
        };
        let requests = self.gateways.iter().map(|gateway| {
            let url = Self::gateway_url(gateway, &hash);
            async move {
                match self.client.get(&url, &[], Some(self.timeout)).await {
                    Ok(response) if response.status().is_success() => {
                        debug!(%url, "gateway has content");
                    }
                    Ok(response) => {
                        warn!(%url, status = response.status().as_u16(), "gateway did not serve content");
                    }
                    Err(e) => {
                        warn!(%url, error = %e, "gateway request failed");
                    }
                }
            }
        });
        join_all(requests).await;
    }
}
