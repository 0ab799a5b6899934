//! Wiring of capture, queue, enrichment, and shipper.

use crate::enrichment::{EnrichmentClient, MetadataLookup};
use crate::error::PipelineError;
use crate::shipper::{AuditShipper, ShipperHandle, ShipperStats};
use s3mirror_audit_capture::{AuditCapture, CaptureConfig, EventFilter};
use s3mirror_common_config::S3MirrorConfig;
use s3mirror_common_http::{HttpClient, HttpConfig};
use std::sync::Arc;

/// The running audit pipeline: a capture handle for producers and the
/// shipping worker behind it.
///
/// Created once at startup. Call [`AuditPipeline::shutdown`] before exit to
/// deliver what is still queued.
#[derive(Debug)]
pub struct AuditPipeline {
    capture: AuditCapture,
    handle: ShipperHandle,
}

impl AuditPipeline {
    /// Build the HTTP clients from configuration and start shipping.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(config: &S3MirrorConfig) -> Result<Self, PipelineError> {
        if !config.audit.enabled {
            return Err(PipelineError::Disabled);
        }

        let sink = HttpClient::with_config(HttpConfig {
            request_timeout: config.audit.timeout(),
            user_agent: config.audit.user_agent.clone(),
            ..HttpConfig::default()
        })?;
        let info = HttpClient::with_config(HttpConfig {
            request_timeout: config.enrichment.timeout(),
            ..HttpConfig::default()
        })?;
        let lookup = EnrichmentClient::new(Arc::new(info), &config.enrichment);

        Self::start_with(config, Arc::new(sink), Arc::new(lookup))
    }

    /// Start shipping with caller-supplied collaborators.
    pub fn start_with(
        config: &S3MirrorConfig,
        client: Arc<HttpClient>,
        lookup: Arc<dyn MetadataLookup>,
    ) -> Result<Self, PipelineError> {
        let (capture, consumer) = AuditCapture::new(CaptureConfig {
            buffer_size: config.audit.queue_capacity,
            filter: EventFilter::new(),
        })?;
        let handle = AuditShipper::new(config.audit.clone(), client, lookup).spawn(consumer);
        Ok(Self { capture, handle })
    }

    /// Producer handle. Clone it into every storage handler.
    pub fn capture(&self) -> &AuditCapture {
        &self.capture
    }

    /// Stop accepting entries, drain the queue, and stop the worker.
    pub async fn shutdown(self) -> ShipperStats {
        self.handle.shutdown().await
    }
}
