//! Audit capture facade used by storage handlers.

use crate::filter::EventFilter;
use crate::queue::{AuditEventQueue, QueueConsumer, QueueError};
use s3mirror_audit_types::AuditEntry;
use tracing::{debug, error, warn};

/// Configuration for audit capture.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Maximum entries buffered for the shipper.
    pub buffer_size: usize,
    /// Which entries are worth shipping.
    pub filter: EventFilter,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            buffer_size: 10_000,
            filter: EventFilter::new(),
        }
    }
}

/// Handle for submitting audit entries.
///
/// Filters first, then enqueues without waiting. Cheap to clone.
#[derive(Debug, Clone)]
pub struct AuditCapture {
    filter: EventFilter,
    queue: AuditEventQueue,
}

impl AuditCapture {
    /// Create a capture handle and the consumer the shipper drains.
    pub fn new(config: CaptureConfig) -> Result<(Self, QueueConsumer), QueueError> {
        let (queue, consumer) = AuditEventQueue::with_capacity(config.buffer_size)?;
        let capture = Self {
            filter: config.filter,
            queue,
        };
        Ok((capture, consumer))
    }

    /// Submit an entry.
    ///
    /// Returns `Ok(false)` when the filter drops it and `Ok(true)` once queued.
    pub fn submit(&self, entry: AuditEntry) -> Result<bool, QueueError> {
        if !self.filter.is_eligible(&entry) {
            return Ok(false);
        }
        self.queue.try_enqueue(entry)?;
        Ok(true)
    }

    /// Submit an entry, logging and discarding any queue error.
    pub fn record(&self, entry: AuditEntry) {
        let op = entry.operation_name().to_string();
        match self.submit(entry) {
            Ok(true) => debug!(%op, "audit entry queued"),
            Ok(false) => {}
            Err(e @ QueueError::Full { .. }) => warn!(%op, error = %e, "audit entry dropped"),
            Err(e) => error!(%op, error = %e, "audit entry dropped"),
        }
    }

    /// The underlying producer, for callers that filter themselves.
    pub fn queue(&self) -> &AuditEventQueue {
        &self.queue
    }

    /// Whether the shipper is still accepting entries.
    pub fn is_healthy(&self) -> bool {
        !self.queue.is_closed()
    }

    /// Approximate fraction of the buffer in use, from 0.0 to 1.0.
    pub fn buffer_usage(&self) -> f64 {
        self.queue.len() as f64 / self.queue.capacity() as f64
    }
}
