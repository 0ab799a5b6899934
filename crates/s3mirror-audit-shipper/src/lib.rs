//! Audit shipping for s3mirror.
//!
//! A single background worker drains the capture queue in FIFO order. For
//! each entry it looks up the content hash of the bucket or object, then
//! POSTs the entry to the configured sink, enriched when the lookup worked
//! and raw when it did not. Shipping is best effort: failures are logged and
//! the entry is dropped.
//!
//! ```no_run
//! # async fn example() -> Result<(), s3mirror_audit_shipper::PipelineError> {
//! use s3mirror_audit_shipper::AuditPipeline;
//! use s3mirror_common_config::S3MirrorConfig;
//!
//! let pipeline = AuditPipeline::start(&S3MirrorConfig::default())?;
//! let capture = pipeline.capture().clone();
//! // hand `capture` to storage handlers...
//! # drop(capture);
//! let stats = pipeline.shutdown().await;
//! println!("shipped {}", stats.shipped);
//! # Ok(())
//! # }
//! ```

mod enrichment;
mod error;
mod pipeline;
mod shipper;

pub use enrichment::{EnrichmentClient, LookupError, MetadataLookup};
pub use error::{PipelineError, ShipError};
pub use pipeline::AuditPipeline;
pub use shipper::{AuditShipper, ShipperHandle, ShipperStats};
