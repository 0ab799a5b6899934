//! Authorization token extraction.

use crate::context::RequestContext;
use crate::error::MirrorError;
use serde_json::Value;
use tracing::warn;

/// Context key holding the inbound `Authorization` header value.
pub const AUTH_KEY: &str = "Authorization";

/// Pull the caller's authorization token out of the request context.
///
/// The token is forwarded verbatim. A missing key, a non-string value, or an
/// empty string all fail with [`MirrorError::AuthMissing`].
pub fn extract_auth_token(ctx: &RequestContext) -> Result<String, MirrorError> {
    match ctx.get(AUTH_KEY) {
        Some(Value::String(token)) if !token.is_empty() => Ok(token.clone()),
        Some(Value::String(_)) => {
            warn!(key = AUTH_KEY, "authorization token is empty");
            Err(MirrorError::AuthMissing)
        }
        Some(other) => {
            warn!(key = AUTH_KEY, kind = value_kind(other), "authorization token is not a string");
            Err(MirrorError::AuthMissing)
        }
        None => {
            warn!(key = AUTH_KEY, "no authorization token in request context");
            Err(MirrorError::AuthMissing)
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    #[test]
    fn returns_token_verbatim() {
        let ctx = RequestContext::new().with_authorization("AWS4-HMAC-SHA256 Credential=abc");
        assert_eq!(
            extract_auth_token(&ctx).unwrap(),
            "AWS4-HMAC-SHA256 Credential=abc"
        );
    }

    #[test]
    fn missing_key() {
        let ctx = RequestContext::new().with_value("X-Request-Id", "r1");
        assert!(matches!(extract_auth_token(&ctx), Err(MirrorError::AuthMissing)));
    }

    #[test_case(json!("") ; "empty string")]
    #[test_case(json!(null) ; "null")]
    #[test_case(json!(42) ; "number")]
    #[test_case(json!(["token"]) ; "array")]
    #[test_case(json!({"token": "t"}) ; "object")]
    fn unusable_values(value: Value) {
        let ctx = RequestContext::new().with_value(AUTH_KEY, value);
        assert!(matches!(extract_auth_token(&ctx), Err(MirrorError::AuthMissing)));
    }

    #[test]
    fn key_is_case_sensitive() {
        let ctx = RequestContext::new().with_value("authorization", "token");
        assert!(extract_auth_token(&ctx).is_err());
    }
}
