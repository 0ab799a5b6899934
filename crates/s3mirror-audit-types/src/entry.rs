//! Audit entry produced by the storage gateway for each completed request.

use crate::OperationName;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Format version stamped on new entries.
pub const AUDIT_ENTRY_VERSION: &str = "1";

/// A single audit entry, in the gateway's audit log wire format.
///
/// Entries are immutable once built; the shipper only ever reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub version: String,
    #[serde(rename = "deploymentid", default, skip_serializing_if = "String::is_empty")]
    pub deployment_id: String,
    pub time: DateTime<Utc>,
    pub trigger: String,
    pub api: ApiDetails,
    #[serde(rename = "remotehost", default, skip_serializing_if = "String::is_empty")]
    pub remote_host: String,
    #[serde(rename = "requestID", default, skip_serializing_if = "String::is_empty")]
    pub request_id: String,
    #[serde(rename = "userAgent", default, skip_serializing_if = "String::is_empty")]
    pub user_agent: String,
    #[serde(rename = "requestHeader", default, skip_serializing_if = "HashMap::is_empty")]
    pub request_header: HashMap<String, String>,
    #[serde(rename = "responseHeader", default, skip_serializing_if = "HashMap::is_empty")]
    pub response_header: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub tags: HashMap<String, serde_json::Value>,
}

/// The API call an entry describes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiDetails {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub bucket: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub object: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub status: String,
    /// HTTP status of the storage response. Zero when unknown.
    #[serde(rename = "statusCode", default, skip_serializing_if = "is_zero")]
    pub status_code: u16,
    #[serde(rename = "timeToFirstByte", default, skip_serializing_if = "String::is_empty")]
    pub time_to_first_byte: String,
    #[serde(rename = "timeToResponse", default, skip_serializing_if = "String::is_empty")]
    pub time_to_response: String,
}

fn is_zero(code: &u16) -> bool {
    *code == 0
}

impl AuditEntry {
    /// Create a new entry builder.
    pub fn builder(name: impl Into<String>, bucket: impl Into<String>) -> AuditEntryBuilder {
        AuditEntryBuilder::new(name, bucket)
    }

    /// Operation name as reported by the gateway.
    pub fn operation_name(&self) -> &str {
        &self.api.name
    }

    /// The operation, when it is one of the mirrored ones.
    pub fn operation(&self) -> Option<OperationName> {
        OperationName::from_api_name(&self.api.name)
    }

    pub fn bucket(&self) -> &str {
        &self.api.bucket
    }

    /// Object key, absent for bucket-level calls.
    pub fn object(&self) -> Option<&str> {
        if self.api.object.is_empty() {
            None
        } else {
            Some(&self.api.object)
        }
    }

    pub fn status_code(&self) -> u16 {
        self.api.status_code
    }
}

/// Builder for constructing audit entries.
#[derive(Debug)]
pub struct AuditEntryBuilder {
    api: ApiDetails,
    deployment_id: String,
    trigger: String,
    remote_host: String,
    request_id: String,
    user_agent: String,
    request_header: HashMap<String, String>,
    response_header: HashMap<String, String>,
    tags: HashMap<String, serde_json::Value>,
}

impl AuditEntryBuilder {
    /// Create a new builder.
    pub fn new(name: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self {
            api: ApiDetails {
                name: name.into(),
                bucket: bucket.into(),
                ..ApiDetails::default()
            },
            deployment_id: String::new(),
            trigger: "incoming".to_string(),
            remote_host: String::new(),
            request_id: String::new(),
            user_agent: String::new(),
            request_header: HashMap::new(),
            response_header: HashMap::new(),
            tags: HashMap::new(),
        }
    }

    /// Set the object key.
    pub fn object(mut self, object: impl Into<String>) -> Self {
        self.api.object = object.into();
        self
    }

    /// Set the response status code.
    pub fn status_code(mut self, code: u16) -> Self {
        self.api.status_code = code;
        self
    }

    /// Set the textual status, e.g. `OK`.
    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.api.status = status.into();
        self
    }

    /// Set response timings as gateway-formatted durations.
    pub fn timings(mut self, first_byte: impl Into<String>, response: impl Into<String>) -> Self {
        self.api.time_to_first_byte = first_byte.into();
        self.api.time_to_response = response.into();
        self
    }

    pub fn deployment_id(mut self, id: impl Into<String>) -> Self {
        self.deployment_id = id.into();
        self
    }

    pub fn trigger(mut self, trigger: impl Into<String>) -> Self {
        self.trigger = trigger.into();
        self
    }

    pub fn remote_host(mut self, host: impl Into<String>) -> Self {
        self.remote_host = host.into();
        self
    }

    pub fn request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = id.into();
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = ua.into();
        self
    }

    /// Add a request header.
    pub fn request_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.request_header.insert(name.into(), value.into());
        self
    }

    /// Add a response header.
    pub fn response_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.response_header.insert(name.into(), value.into());
        self
    }

    /// Add a tag. Values that cannot be represented as JSON are skipped.
    pub fn tag(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(json) = serde_json::to_value(value) {
            self.tags.insert(key.into(), json);
        }
        self
    }

    /// Build the entry, stamped with the current time.
    pub fn build(self) -> AuditEntry {
        AuditEntry {
            version: AUDIT_ENTRY_VERSION.to_string(),
            deployment_id: self.deployment_id,
            time: Utc::now(),
            trigger: self.trigger,
            api: self.api,
            remote_host: self.remote_host,
            request_id: self.request_id,
            user_agent: self.user_agent,
            request_header: self.request_header,
            response_header: self.response_header,
            tags: self.tags,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_accessors() {
        let entry = AuditEntry::builder("PutObject", "b1")
            .object("o1")
            .status_code(200)
            .build();

        assert_eq!(entry.operation_name(), "PutObject");
        assert_eq!(entry.operation(), Some(OperationName::PutObject));
        assert_eq!(entry.bucket(), "b1");
        assert_eq!(entry.object(), Some("o1"));
        assert_eq!(entry.status_code(), 200);
        assert_eq!(entry.version, AUDIT_ENTRY_VERSION);
    }

    #[test]
    fn test_bucket_entry_has_no_object() {
        let entry = AuditEntry::builder("PutBucket", "b1").status_code(200).build();
        assert_eq!(entry.object(), None);
    }

    #[test]
    fn test_wire_field_names() {
        let entry = AuditEntry::builder("PutObject", "b1")
            .object("o1")
            .status_code(200)
            .status("OK")
            .request_id("16B0C9E3A1F2")
            .remote_host("10.0.0.7")
            .user_agent("aws-cli/2.0")
            .request_header("Authorization", "AWS4-HMAC-SHA256 ...")
            .tag("objectErasure", false)
            .build();

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["api"]["name"], "PutObject");
        assert_eq!(json["api"]["bucket"], "b1");
        assert_eq!(json["api"]["object"], "o1");
        assert_eq!(json["api"]["statusCode"], 200);
        assert_eq!(json["requestID"], "16B0C9E3A1F2");
        assert_eq!(json["remotehost"], "10.0.0.7");
        assert_eq!(json["userAgent"], "aws-cli/2.0");
        assert_eq!(json["requestHeader"]["Authorization"], "AWS4-HMAC-SHA256 ...");
        assert_eq!(json["tags"]["objectErasure"], false);
        assert!(json.get("deploymentid").is_none());
        assert!(json.get("responseHeader").is_none());
    }

    #[test]
    fn test_parses_gateway_entry_without_status() {
        let raw = r#"{
            "version": "1",
            "time": "2020-05-05T10:00:00Z",
            "trigger": "incoming",
            "api": { "name": "PutBucket", "bucket": "photos" }
        }"#;
        let entry: AuditEntry = serde_json::from_str(raw).unwrap();
        assert_eq!(entry.status_code(), 0);
        assert_eq!(entry.bucket(), "photos");
        assert_eq!(entry.object(), None);
    }
}
