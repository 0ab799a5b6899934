//! Audit entry capture for s3mirror.
//!
//! Storage handlers hand completed-request audit entries to an
//! [`AuditCapture`]. Entries that describe a successful mutating operation
//! are placed on a bounded in-memory queue; the shipper drains it from a
//! single [`QueueConsumer`]. Submission never blocks: when the queue is full
//! the entry is dropped and the caller is told so.

mod capture;
mod filter;
mod queue;

pub use capture::{AuditCapture, CaptureConfig};
pub use filter::{EventFilter, Rejection};
pub use queue::{AuditEventQueue, QueueConsumer, QueueError, MAX_CAPACITY};

pub use s3mirror_audit_types::{AuditEntry, OperationName};
