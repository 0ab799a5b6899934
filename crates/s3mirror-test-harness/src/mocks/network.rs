//! HTTP mocking utilities using wiremock.

use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

/// Path the Lambda-style invoke API uses for a function.
pub fn invocation_path(function_name: &str) -> String {
    format!("/2015-03-31/functions/{}/invocations", function_name)
}

/// HTTP mock server wrapper with convenience methods.
pub struct TestHttpServer {
    server: MockServer,
}

impl TestHttpServer {
    /// Start a new mock server.
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Get the server URL.
    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// Get URL for a specific path.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.server.uri(), path)
    }

    /// Access the underlying MockServer.
    pub fn inner(&self) -> &MockServer {
        &self.server
    }

    /// Mirror function that answers every invocation with `status`.
    pub async fn function(&self, function_name: &str, status: u16) {
        Mock::given(method("POST"))
            .and(path(invocation_path(function_name)))
            .respond_with(
                ResponseTemplate::new(status).set_body_json(json!({
                    "statusCode": status,
                    "headers": { "Content-Type": "application/json" }
                })),
            )
            .mount(&self.server)
            .await;
    }

    /// Mirror function whose invoke call succeeds at the HTTP level but whose
    /// reply body carries `function_status`.
    pub async fn function_reporting(&self, function_name: &str, function_status: u16) {
        Mock::given(method("POST"))
            .and(path(invocation_path(function_name)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "statusCode": function_status,
                "headers": { "Content-Type": "application/json" }
            })))
            .mount(&self.server)
            .await;
    }

    /// Info endpoint entry for one bucket, or one object when `object` is set.
    pub async fn info(&self, endpoint: &str, bucket: &str, object: Option<&str>, hash: &str) {
        let mut mock = Mock::given(method("GET"))
            .and(path(endpoint))
            .and(query_param("bucket", bucket));
        if let Some(object) = object {
            mock = mock.and(query_param("object", object));
        }
        mock.respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "bucket": bucket,
            "object": object.unwrap_or(""),
            "hash": hash,
        })))
        .with_priority(1)
        .mount(&self.server)
        .await;
    }

    /// Sink accepting every POST to `endpoint`.
    pub async fn sink(&self, endpoint: &str) {
        Mock::given(method("POST"))
            .and(path(endpoint))
            .respond_with(ResponseTemplate::new(200))
            .mount(&self.server)
            .await;
    }

    /// Register an endpoint with simulated latency.
    pub async fn with_latency<T: Serialize>(&self, endpoint: &str, response: &T, latency: Duration) {
        Mock::given(path(endpoint))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(response)
                    .set_delay(latency),
            )
            .mount(&self.server)
            .await;
    }

    /// Register a sequence of responses, each served once in mount order.
    pub async fn sequence(&self, endpoint: &str, responses: Vec<ResponseTemplate>) {
        for response in responses {
            Mock::given(path(endpoint))
                .respond_with(response)
                .up_to_n_times(1)
                .mount(&self.server)
                .await;
        }
    }

    /// Verify that a request was received.
    pub async fn verify_received(&self, endpoint: &str, times: u64) {
        let count = self.received_at(endpoint).await.len() as u64;
        assert_eq!(
            count, times,
            "Expected {} requests to {}, got {}",
            times, endpoint, count
        );
    }

    /// Get all received requests.
    pub async fn received_requests(&self) -> Vec<Request> {
        self.server.received_requests().await.unwrap_or_default()
    }

    /// Requests received on one path, in arrival order.
    pub async fn received_at(&self, endpoint: &str) -> Vec<Request> {
        self.received_requests()
            .await
            .into_iter()
            .filter(|r| r.url.path() == endpoint)
            .collect()
    }

    /// JSON bodies received on one path, in arrival order.
    pub async fn received_json(&self, endpoint: &str) -> Vec<Value> {
        self.received_at(endpoint)
            .await
            .iter()
            .map(|r| serde_json::from_slice(&r.body).unwrap_or(Value::Null))
            .collect()
    }

    /// Wait until `count` requests have reached `endpoint`, up to `timeout`.
    pub async fn wait_for(&self, endpoint: &str, count: usize, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if self.received_at(endpoint).await.len() >= count {
                return true;
            }
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

/// Common response templates.
pub mod responses {
    use super::*;

    pub fn ok() -> ResponseTemplate {
        ResponseTemplate::new(200)
    }

    pub fn server_error() -> ResponseTemplate {
        ResponseTemplate::new(500).set_body_json(json!({ "error": "Internal server error" }))
    }
}
