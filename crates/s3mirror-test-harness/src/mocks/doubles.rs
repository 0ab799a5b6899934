//! Recording doubles for the capability traits.

use async_trait::async_trait;
use parking_lot::Mutex;
use s3mirror_audit_shipper::{LookupError, MetadataLookup};
use s3mirror_audit_types::{ContentKind, EnrichmentResult};
use s3mirror_invoke::{FunctionInvoker, InvokeError, InvokeOutput};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

/// One call seen by [`RecordingInvoker`].
#[derive(Debug, Clone)]
pub struct InvocationRecord {
    pub function_name: String,
    pub payload: Value,
    pub timeout: Duration,
}

/// Scripted reply for [`RecordingInvoker`].
#[derive(Debug, Clone)]
pub enum Reply {
    Status(u16),
    Timeout,
    Transport(String),
}

/// Function invoker that records calls and replies from a script.
///
/// Replies are consumed in order; once the script runs out the fallback
/// reply is used.
#[derive(Debug)]
pub struct RecordingInvoker {
    calls: Mutex<Vec<InvocationRecord>>,
    script: Mutex<VecDeque<Reply>>,
    fallback: Reply,
}

impl RecordingInvoker {
    /// Always succeeds.
    pub fn ok() -> Self {
        Self::always(Reply::Status(200))
    }

    /// Always gives the same reply.
    pub fn always(reply: Reply) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            script: Mutex::new(VecDeque::new()),
            fallback: reply,
        }
    }

    /// Replies in order, then succeeds.
    pub fn scripted(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            script: Mutex::new(replies.into_iter().collect()),
            fallback: Reply::Status(200),
        }
    }

    pub fn calls(&self) -> Vec<InvocationRecord> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl FunctionInvoker for RecordingInvoker {
    async fn invoke(
        &self,
        function_name: &str,
        payload: Vec<u8>,
        timeout: Duration,
    ) -> Result<InvokeOutput, InvokeError> {
        self.calls.lock().push(InvocationRecord {
            function_name: function_name.to_string(),
            payload: serde_json::from_slice(&payload).unwrap_or(Value::Null),
            timeout,
        });

        let reply = self
            .script
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        match reply {
            Reply::Status(status_code) => Ok(InvokeOutput {
                status_code,
                payload: json!({ "statusCode": status_code }).to_string().into_bytes(),
            }),
            Reply::Timeout => Err(InvokeError::Timeout),
            Reply::Transport(msg) => Err(InvokeError::Transport(msg)),
        }
    }
}

/// Metadata lookup answering from a fixed table and recording queries.
///
/// Unknown keys fail with [`LookupError::Status`] 404.
#[derive(Debug, Default)]
pub struct StaticLookup {
    table: HashMap<(String, Option<String>), EnrichmentResult>,
    queries: Mutex<Vec<(String, Option<String>)>>,
    delay: Option<Duration>,
}

impl StaticLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Known object hash.
    pub fn with_object(mut self, bucket: &str, object: &str, hash: &str) -> Self {
        self.table.insert(
            (bucket.to_string(), Some(object.to_string())),
            EnrichmentResult {
                hash: hash.to_string(),
                kind: ContentKind::Object,
            },
        );
        self
    }

    /// Known bucket hash.
    pub fn with_bucket(mut self, bucket: &str, hash: &str) -> Self {
        self.table.insert(
            (bucket.to_string(), None),
            EnrichmentResult {
                hash: hash.to_string(),
                kind: ContentKind::Bucket,
            },
        );
        self
    }

    /// Wait this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn queries(&self) -> Vec<(String, Option<String>)> {
        self.queries.lock().clone()
    }
}

#[async_trait]
impl MetadataLookup for StaticLookup {
    async fn lookup(
        &self,
        bucket: &str,
        object: Option<&str>,
    ) -> Result<EnrichmentResult, LookupError> {
        let key = (bucket.to_string(), object.map(str::to_string));
        self.queries.lock().push(key.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.table.get(&key).cloned().ok_or(LookupError::Status(404))
    }
}
