//! Mirroring of storage operations.

use crate::context::RequestContext;
use crate::credentials::extract_auth_token;
use crate::error::{MirrorError, MirrorOutcome};
use crate::function::FunctionInvoker;
use crate::model::{FunctionResponse, MirrorRequest, StorageOperation};
use s3mirror_common_config::{validate_mirror, ConfigError, MirrorConfig};
use s3mirror_common_log::spans::{instrument_future, mirror_span, record_error};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, Span};

/// Status the mirroring function reports on success.
const SUCCESS_STATUS: u16 = 200;

/// Sends one mirroring request per mutating storage operation.
///
/// Calls run on the caller's task. The invoker holds no mutable state, so one
/// instance can serve every concurrent storage handler.
#[derive(Clone)]
pub struct MirrorInvoker {
    function: Arc<dyn FunctionInvoker>,
    function_name: String,
    default_timeout: Duration,
}

impl MirrorInvoker {
    /// Fails when the configured function name is empty or malformed.
    pub fn new(
        function: Arc<dyn FunctionInvoker>,
        config: &MirrorConfig,
    ) -> Result<Self, ConfigError> {
        validate_mirror(config)?;
        Ok(Self {
            function,
            function_name: config.function_name.clone(),
            default_timeout: config.timeout(),
        })
    }

    /// Name of the function every request is sent to.
    pub fn function_name(&self) -> &str {
        &self.function_name
    }

    /// Mirror a bucket creation.
    pub async fn mirror_put_bucket(
        &self,
        ctx: &RequestContext,
        bucket: &str,
        hash: &str,
    ) -> MirrorOutcome {
        self.mirror(ctx, &StorageOperation::put_bucket(bucket), hash)
            .await
    }

    /// Mirror an object write.
    pub async fn mirror_put_object(
        &self,
        ctx: &RequestContext,
        bucket: &str,
        hash: &str,
        object: &str,
    ) -> MirrorOutcome {
        self.mirror(ctx, &StorageOperation::put_object(bucket, object), hash)
            .await
    }

    /// Mirror any storage operation. Makes at most one invocation; never retries.
    pub async fn mirror(
        &self,
        ctx: &RequestContext,
        operation: &StorageOperation,
        hash: &str,
    ) -> MirrorOutcome {
        let span = mirror_span(&operation.name.to_string(), &operation.bucket);
        instrument_future(self.invoke_mirror(ctx, operation, hash), span).await
    }

    async fn invoke_mirror(
        &self,
        ctx: &RequestContext,
        operation: &StorageOperation,
        hash: &str,
    ) -> MirrorOutcome {
        let token = extract_auth_token(ctx)?;

        let request = MirrorRequest::new(operation, token, hash);
        let payload = request.to_payload().map_err(|e| {
            error!(error = %e, "failed to serialize mirror request");
            MirrorError::MarshalFailure(e)
        })?;
        debug!(
            function = %self.function_name,
            object = operation.object.as_deref().unwrap_or(""),
            payload = %String::from_utf8_lossy(&payload),
            "invoking mirror function"
        );

        let timeout = ctx.timeout().unwrap_or(self.default_timeout);
        let output = self
            .function
            .invoke(&self.function_name, payload, timeout)
            .await
            .map_err(|e| {
                error!(function = %self.function_name, error = %e, "mirror function invocation failed");
                record_error(&e);
                MirrorError::InvocationFailure(e)
            })?;

        Span::current().record("status", output.status_code);
        if output.status_code != SUCCESS_STATUS {
            error!(status = output.status_code, "mirror function invocation rejected");
            return Err(MirrorError::NonSuccessStatus(output.status_code));
        }

        // The invoke call can succeed while the function itself reports a failure.
        match serde_json::from_slice::<FunctionResponse>(&output.payload) {
            Ok(body) if body.status_code != SUCCESS_STATUS => {
                error!(function_status = body.status_code, "mirror function reported failure");
                return Err(MirrorError::NonSuccessStatus(body.status_code));
            }
            Ok(body) => debug!(function_status = body.status_code, "mirror function result"),
            Err(_) => debug!(
                result = %String::from_utf8_lossy(&output.payload),
                "mirror function result not a status reply"
            ),
        }

        info!(hash, "operation mirrored");
        Ok(())
    }
}

impl std::fmt::Debug for MirrorInvoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MirrorInvoker")
            .field("function_name", &self.function_name)
            .field("default_timeout", &self.default_timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InvokeError;
    use crate::function::InvokeOutput;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use s3mirror_audit_types::OperationName;
    use serde_json::Value;

    /// Records every call and answers from a fixed script.
    struct ScriptedFunction {
        calls: Mutex<Vec<(String, Value, Duration)>>,
        reply: fn() -> Result<InvokeOutput, InvokeError>,
    }

    impl ScriptedFunction {
        fn new(reply: fn() -> Result<InvokeOutput, InvokeError>) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                reply,
            })
        }

        fn calls(&self) -> Vec<(String, Value, Duration)> {
            self.calls.lock().clone()
        }
    }

    #[async_trait]
    impl FunctionInvoker for ScriptedFunction {
        async fn invoke(
            &self,
            function_name: &str,
            payload: Vec<u8>,
            timeout: Duration,
        ) -> Result<InvokeOutput, InvokeError> {
            let body = serde_json::from_slice(&payload).unwrap();
            self.calls
                .lock()
                .push((function_name.to_string(), body, timeout));
            (self.reply)()
        }
    }

    fn status(code: u16) -> Result<InvokeOutput, InvokeError> {
        Ok(InvokeOutput {
            status_code: code,
            payload: format!(r#"{{"statusCode":{}}}"#, code).into_bytes(),
        })
    }

    fn config() -> MirrorConfig {
        MirrorConfig {
            function_name: "crud-handler".to_string(),
            ..MirrorConfig::default()
        }
    }

    fn invoker(function: Arc<ScriptedFunction>) -> MirrorInvoker {
        MirrorInvoker::new(function, &config()).unwrap()
    }

    fn authed() -> RequestContext {
        RequestContext::new().with_authorization("token-1")
    }

    #[test]
    fn empty_function_name_is_rejected() {
        let function = ScriptedFunction::new(|| status(200));
        let result = MirrorInvoker::new(function, &MirrorConfig::default());
        assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
    }

    #[tokio::test]
    async fn put_bucket_without_auth_makes_no_call() {
        let function = ScriptedFunction::new(|| status(200));
        let result = invoker(function.clone())
            .mirror_put_bucket(&RequestContext::new(), "mybucket", "Qm123")
            .await;

        assert!(matches!(result, Err(MirrorError::AuthMissing)));
        assert!(function.calls().is_empty());
    }

    #[tokio::test]
    async fn empty_token_makes_no_call() {
        let function = ScriptedFunction::new(|| status(200));
        let ctx = RequestContext::new().with_authorization("");
        let result = invoker(function.clone())
            .mirror_put_object(&ctx, "b1", "Qm123", "o1")
            .await;

        assert!(matches!(result, Err(MirrorError::AuthMissing)));
        assert!(function.calls().is_empty());
    }

    #[tokio::test]
    async fn put_object_sends_one_request() {
        let function = ScriptedFunction::new(|| status(200));
        invoker(function.clone())
            .mirror_put_object(&authed(), "b1", "Qm123", "o1")
            .await
            .unwrap();

        let calls = function.calls();
        assert_eq!(calls.len(), 1);
        let (name, body, timeout) = &calls[0];
        assert_eq!(name, "crud-handler");
        assert_eq!(*timeout, Duration::from_secs(30));
        assert_eq!(body["entry"]["api"]["bucket"], "b1");
        assert_eq!(body["entry"]["api"]["name"], "PutObject");
        assert_eq!(body["entry"]["api"]["object"], "o1");
        assert_eq!(body["entry"]["requestHeader"]["Authorization"], "token-1");
        assert_eq!(body["entry"]["responseHeader"]["X-FLEEK-IPFS-HASH"], "Qm123");
        assert_eq!(body["hash"], "Qm123");
    }

    #[tokio::test]
    async fn non_success_status_is_not_retried() {
        let function = ScriptedFunction::new(|| status(500));
        let result = invoker(function.clone())
            .mirror_put_object(&authed(), "b1", "Qm123", "o1")
            .await;

        assert!(matches!(result, Err(MirrorError::NonSuccessStatus(500))));
        assert_eq!(function.calls().len(), 1);
    }

    #[tokio::test]
    async fn other_success_codes_are_failures() {
        let function = ScriptedFunction::new(|| status(202));
        let result = invoker(function)
            .mirror_put_bucket(&authed(), "b1", "Qm123")
            .await;
        assert!(matches!(result, Err(MirrorError::NonSuccessStatus(202))));
    }

    #[tokio::test]
    async fn transport_failure_is_invocation_failure() {
        let function = ScriptedFunction::new(|| Err(InvokeError::Timeout));
        let result = invoker(function.clone())
            .mirror_put_bucket(&authed(), "b1", "Qm123")
            .await;

        assert!(matches!(
            result,
            Err(MirrorError::InvocationFailure(InvokeError::Timeout))
        ));
        assert_eq!(function.calls().len(), 1);
    }

    #[tokio::test]
    async fn context_timeout_overrides_config() {
        let function = ScriptedFunction::new(|| status(200));
        let ctx = authed().with_timeout(Duration::from_millis(750));
        invoker(function.clone())
            .mirror_put_bucket(&ctx, "b1", "Qm123")
            .await
            .unwrap();

        assert_eq!(function.calls()[0].2, Duration::from_millis(750));
    }

    #[tokio::test]
    async fn generic_operation_is_mirrored() {
        let function = ScriptedFunction::new(|| status(200));
        let op = StorageOperation::new(OperationName::DeleteObject, "b1", Some("o1".to_string()));
        invoker(function.clone())
            .mirror(&authed(), &op, "Qm456")
            .await
            .unwrap();

        assert_eq!(function.calls()[0].1["entry"]["api"]["name"], "DeleteObject");
    }

    #[tokio::test]
    async fn function_status_in_reply_is_checked() {
        let function = ScriptedFunction::new(|| {
            Ok(InvokeOutput {
                status_code: 200,
                payload: br#"{"statusCode":500,"headers":{"Content-Type":"application/json"}}"#
                    .to_vec(),
            })
        });
        let result = invoker(function.clone())
            .mirror_put_object(&authed(), "b1", "Qm123", "o1")
            .await;

        assert!(matches!(result, Err(MirrorError::NonSuccessStatus(500))));
        assert_eq!(function.calls().len(), 1);
    }

    #[tokio::test]
    async fn failed_invoke_status_wins_over_reply() {
        let function = ScriptedFunction::new(|| {
            Ok(InvokeOutput {
                status_code: 502,
                payload: br#"{"statusCode":200}"#.to_vec(),
            })
        });
        let result = invoker(function)
            .mirror_put_bucket(&authed(), "b1", "Qm123")
            .await;
        assert!(matches!(result, Err(MirrorError::NonSuccessStatus(502))));
    }

    #[tokio::test]
    async fn reply_without_status_falls_back_to_invoke_status() {
        let function = ScriptedFunction::new(|| {
            Ok(InvokeOutput {
                status_code: 200,
                payload: b"null".to_vec(),
            })
        });
        invoker(function)
            .mirror_put_bucket(&authed(), "b1", "Qm123")
            .await
            .unwrap();
    }
}
