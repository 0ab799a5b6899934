//! Bounded FIFO queue between audit producers and the shipper.

use s3mirror_audit_types::AuditEntry;
use tokio::sync::mpsc;

/// Largest capacity a queue may be created with.
pub const MAX_CAPACITY: usize = 1_000_000;

/// Queue errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    #[error("audit queue full (capacity {capacity}), entry dropped")]
    Full { capacity: usize },

    #[error("audit queue closed, entry dropped")]
    Closed,

    #[error("audit queue capacity must be greater than zero")]
    ZeroCapacity,

    #[error("audit queue capacity {requested} exceeds the maximum of {max}")]
    CapacityTooLarge { requested: usize, max: usize },
}

/// Producer side of the audit queue.
///
/// Cheap to clone; every storage handler may hold one. Enqueueing never waits.
#[derive(Debug, Clone)]
pub struct AuditEventQueue {
    sender: mpsc::Sender<AuditEntry>,
}

/// Consumer side of the audit queue. There is exactly one.
#[derive(Debug)]
pub struct QueueConsumer {
    receiver: mpsc::Receiver<AuditEntry>,
}

impl AuditEventQueue {
    /// Create a queue with a fixed capacity.
    pub fn with_capacity(capacity: usize) -> Result<(Self, QueueConsumer), QueueError> {
        if capacity == 0 {
            return Err(QueueError::ZeroCapacity);
        }
        if capacity > MAX_CAPACITY {
            return Err(QueueError::CapacityTooLarge {
                requested: capacity,
                max: MAX_CAPACITY,
            });
        }
        let (sender, receiver) = mpsc::channel(capacity);
        Ok((Self { sender }, QueueConsumer { receiver }))
    }

    /// Enqueue without waiting. On failure the entry is discarded.
    pub fn try_enqueue(&self, entry: AuditEntry) -> Result<(), QueueError> {
        self.sender.try_send(entry).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => QueueError::Full {
                capacity: self.capacity(),
            },
            mpsc::error::TrySendError::Closed(_) => QueueError::Closed,
        })
    }

    /// Fixed capacity of the queue.
    pub fn capacity(&self) -> usize {
        self.sender.max_capacity()
    }

    /// Approximate number of queued entries.
    pub fn len(&self) -> usize {
        self.sender.max_capacity() - self.sender.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the consumer is gone or has closed the queue.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl QueueConsumer {
    /// Wait for the next entry.
    ///
    /// Returns `None` once the queue is closed (or every producer dropped)
    /// and all entries enqueued before that have been handed out.
    pub async fn dequeue(&mut self) -> Option<AuditEntry> {
        self.receiver.recv().await
    }

    /// Take the next entry if one is ready.
    pub fn try_dequeue(&mut self) -> Option<AuditEntry> {
        self.receiver.try_recv().ok()
    }

    /// Reject further enqueues. Entries already queued are still delivered.
    pub fn close(&mut self) {
        self.receiver.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use s3mirror_audit_types::AuditEntry;
    use std::time::Duration;

    const CAPACITY: usize = 10_000;

    fn entry(i: usize) -> AuditEntry {
        AuditEntry::builder("PutObject", "b1")
            .object(format!("o{}", i))
            .status_code(200)
            .build()
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert_eq!(
            AuditEventQueue::with_capacity(0).unwrap_err(),
            QueueError::ZeroCapacity
        );
    }

    #[test]
    fn oversized_capacity_is_rejected() {
        assert_eq!(
            AuditEventQueue::with_capacity(usize::MAX).unwrap_err(),
            QueueError::CapacityTooLarge {
                requested: usize::MAX,
                max: MAX_CAPACITY
            }
        );
        assert!(AuditEventQueue::with_capacity(MAX_CAPACITY).is_ok());
    }

    #[test]
    fn overflow_is_rejected_without_touching_contents() {
        let (queue, mut consumer) = AuditEventQueue::with_capacity(CAPACITY).unwrap();

        for i in 0..CAPACITY {
            queue.try_enqueue(entry(i)).unwrap();
        }
        assert_eq!(queue.len(), CAPACITY);

        let overflow = queue.try_enqueue(entry(CAPACITY));
        assert_eq!(overflow, Err(QueueError::Full { capacity: CAPACITY }));

        for i in 0..CAPACITY {
            let got = consumer.try_dequeue().unwrap();
            assert_eq!(got.object(), Some(format!("o{}", i).as_str()));
        }
        assert!(consumer.try_dequeue().is_none());
    }

    #[test]
    fn space_frees_up_after_dequeue() {
        let (queue, mut consumer) = AuditEventQueue::with_capacity(2).unwrap();
        queue.try_enqueue(entry(0)).unwrap();
        queue.try_enqueue(entry(1)).unwrap();
        assert!(queue.try_enqueue(entry(2)).is_err());

        consumer.try_dequeue().unwrap();
        queue.try_enqueue(entry(3)).unwrap();

        let order: Vec<_> = std::iter::from_fn(|| consumer.try_dequeue())
            .map(|e| e.api.object)
            .collect();
        assert_eq!(order, vec!["o1", "o3"]);
    }

    #[tokio::test]
    async fn dequeue_waits_for_a_producer() {
        let (queue, mut consumer) = AuditEventQueue::with_capacity(4).unwrap();

        let producer = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            queue.try_enqueue(entry(7)).unwrap();
        });

        let got = consumer.dequeue().await.unwrap();
        assert_eq!(got.object(), Some("o7"));
        producer.await.unwrap();
    }

    #[tokio::test]
    async fn close_drains_then_ends() {
        let (queue, mut consumer) = AuditEventQueue::with_capacity(4).unwrap();
        queue.try_enqueue(entry(0)).unwrap();
        queue.try_enqueue(entry(1)).unwrap();

        consumer.close();
        assert_eq!(queue.try_enqueue(entry(2)), Err(QueueError::Closed));
        assert!(queue.is_closed());

        assert_eq!(consumer.dequeue().await.unwrap().object(), Some("o0"));
        assert_eq!(consumer.dequeue().await.unwrap().object(), Some("o1"));
        assert!(consumer.dequeue().await.is_none());
    }

    #[tokio::test]
    async fn concurrent_producers_never_block() {
        let (queue, mut consumer) = AuditEventQueue::with_capacity(64).unwrap();

        let mut handles = Vec::new();
        for p in 0..8 {
            let queue = queue.clone();
            handles.push(tokio::spawn(async move {
                let mut accepted = 0usize;
                for i in 0..32 {
                    if queue.try_enqueue(entry(p * 100 + i)).is_ok() {
                        accepted += 1;
                    }
                }
                accepted
            }));
        }

        let mut accepted = 0;
        for handle in handles {
            accepted += handle.await.unwrap();
        }
        assert_eq!(accepted, 64);

        let mut drained = 0;
        while consumer.try_dequeue().is_some() {
            drained += 1;
        }
        assert_eq!(drained, 64);
    }
}
