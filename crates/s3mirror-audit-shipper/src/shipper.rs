//! The background worker that delivers audit entries to the sink.

use crate::enrichment::MetadataLookup;
use crate::error::ShipError;
use s3mirror_audit_capture::QueueConsumer;
use s3mirror_audit_types::{AuditEntry, ShippedRecord};
use s3mirror_common_config::AuditTargetConfig;
use s3mirror_common_http::{headers, HttpClient, RequestBuilder};
use s3mirror_common_log::spans::{instrument_future, record_error, shipment_span};
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn, Span};

/// Delivery counters, returned when the worker stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShipperStats {
    /// Entries accepted by the sink.
    pub shipped: u64,
    /// Of those, entries sent with content metadata.
    pub enriched: u64,
    /// Entries that could not be delivered.
    pub failed: u64,
}

/// Ships audit entries, one at a time, in queue order.
pub struct AuditShipper {
    config: AuditTargetConfig,
    client: Arc<HttpClient>,
    lookup: Arc<dyn MetadataLookup>,
}

impl AuditShipper {
    pub fn new(
        config: AuditTargetConfig,
        client: Arc<HttpClient>,
        lookup: Arc<dyn MetadataLookup>,
    ) -> Self {
        Self {
            config,
            client,
            lookup,
        }
    }

    /// Start the worker on the current Tokio runtime.
    ///
    /// The worker runs until [`ShipperHandle::shutdown`] is called or every
    /// producer is gone. Dropping the handle detaches the worker.
    pub fn spawn(self, consumer: QueueConsumer) -> ShipperHandle {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(self.run(consumer, shutdown_rx));
        ShipperHandle {
            shutdown: Some(shutdown_tx),
            task,
        }
    }

    async fn run(
        self,
        mut consumer: QueueConsumer,
        mut shutdown: oneshot::Receiver<()>,
    ) -> ShipperStats {
        let mut stats = ShipperStats::default();
        let mut listening = true;
        info!(
            endpoint = %self.config.endpoint,
            kind = %self.config.log_kind,
            "audit shipper started"
        );

        loop {
            tokio::select! {
                biased;
                signal = &mut shutdown, if listening => {
                    if signal.is_ok() {
                        consumer.close();
                        break;
                    }
                    listening = false;
                }
                next = consumer.dequeue() => match next {
                    Some(entry) => self.deliver(&entry, &mut stats).await,
                    None => {
                        info!(?stats, "audit queue closed, shipper stopping");
                        return stats;
                    }
                },
            }
        }

        while let Some(entry) = consumer.dequeue().await {
            self.deliver(&entry, &mut stats).await;
        }
        info!(?stats, "audit shipper drained and stopped");
        stats
    }

    async fn deliver(&self, entry: &AuditEntry, stats: &mut ShipperStats) {
        match self.ship(entry).await {
            Ok(enriched) => {
                stats.shipped += 1;
                if enriched {
                    stats.enriched += 1;
                }
            }
            Err(e) => {
                stats.failed += 1;
                warn!(
                    op = entry.operation_name(),
                    bucket = entry.bucket(),
                    error = %e,
                    "audit entry not delivered"
                );
            }
        }
    }

    /// Ship one entry. Returns whether it went out with content metadata.
    ///
    /// A failed lookup does not stop delivery; the raw entry is sent instead.
    /// Nothing is retried.
    pub async fn ship(&self, entry: &AuditEntry) -> Result<bool, ShipError> {
        let span = shipment_span(entry.operation_name(), entry.bucket());
        instrument_future(self.ship_inner(entry), span).await
    }

    async fn ship_inner(&self, entry: &AuditEntry) -> Result<bool, ShipError> {
        let raw = serde_json::to_vec(entry).map_err(ShipError::Serialize)?;

        let mut request = RequestBuilder::new()
            .json_content()
            .user_agent(&self.config.user_agent);
        if let Some(token) = &self.config.auth_token {
            request = request.authorization(token);
        }

        let (body, enriched) = match self.lookup.lookup(entry.bucket(), entry.object()).await {
            Ok(enrichment) => {
                request = request
                    .header(headers::CONTENT_IPFS_HASH, &enrichment.hash)
                    .header(headers::IPFS_CONTENT_TYPE, enrichment.kind.to_string());
                let record = ShippedRecord::new(entry, &enrichment);
                let body = serde_json::to_vec(&record).map_err(ShipError::Serialize)?;
                info!(
                    target: "s3mirror::crud",
                    entry = %String::from_utf8_lossy(&raw),
                    hash = %enrichment.hash,
                    content_kind = %enrichment.kind,
                    "FLEEK CRUD"
                );
                (body, true)
            }
            Err(e) => {
                warn!(error = %e, "content lookup failed, shipping entry without metadata");
                (raw, false)
            }
        };
        Span::current().record("enriched", enriched);

        let response = self
            .client
            .post(
                &self.config.endpoint,
                request.into_headers(),
                body,
                Some(self.config.timeout()),
            )
            .await
            .map_err(|e| {
                record_error(&e);
                self.client.close_idle_connections();
                ShipError::Transport(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ShipError::Rejected(status.as_u16()));
        }
        debug!(status = status.as_u16(), enriched, "audit entry shipped");
        Ok(enriched)
    }
}

impl std::fmt::Debug for AuditShipper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditShipper")
            .field("endpoint", &self.config.endpoint)
            .finish_non_exhaustive()
    }
}

/// Owner's handle on the running worker.
#[derive(Debug)]
pub struct ShipperHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<ShipperStats>,
}

impl ShipperHandle {
    /// Stop accepting entries, deliver the ones already queued, and wait for
    /// the worker to finish.
    pub async fn shutdown(mut self) -> ShipperStats {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        match self.task.await {
            Ok(stats) => stats,
            Err(e) => {
                warn!(error = %e, "audit shipper task ended abnormally");
                ShipperStats::default()
            }
        }
    }

    /// Whether the worker has already stopped.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
