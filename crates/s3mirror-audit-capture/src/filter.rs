//! Eligibility rules for shipping audit entries.

use s3mirror_audit_types::{AuditEntry, OperationName};
use std::collections::HashSet;
use std::fmt;
use tracing::debug;

/// Why an entry was not shipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The entry carries no status code, so success cannot be determined.
    MissingStatus,
    /// The storage call failed.
    FailedStatus(u16),
    /// The operation is not a mirrored one.
    UnsupportedOperation(String),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingStatus => write!(f, "unable to read status code"),
            Self::FailedStatus(code) => write!(f, "status code {} is not a success", code),
            Self::UnsupportedOperation(name) => write!(f, "operation {:?} is not shipped", name),
        }
    }
}

/// Decides which audit entries reach the shipping queue.
#[derive(Debug, Clone)]
pub struct EventFilter {
    allowed: HashSet<OperationName>,
}

impl EventFilter {
    /// Filter accepting every mirrored operation.
    pub fn new() -> Self {
        Self {
            allowed: OperationName::all().collect(),
        }
    }

    /// Filter restricted to a subset of operations.
    pub fn only(operations: impl IntoIterator<Item = OperationName>) -> Self {
        Self {
            allowed: operations.into_iter().collect(),
        }
    }

    /// Classify an entry.
    pub fn check(&self, entry: &AuditEntry) -> Result<(), Rejection> {
        match entry.status_code() {
            0 => return Err(Rejection::MissingStatus),
            code if code > 299 => return Err(Rejection::FailedStatus(code)),
            _ => {}
        }

        match entry.operation() {
            Some(op) if self.allowed.contains(&op) => Ok(()),
            _ => Err(Rejection::UnsupportedOperation(
                entry.operation_name().to_string(),
            )),
        }
    }

    /// Whether the entry should be shipped. Logs the reason when it is not.
    pub fn is_eligible(&self, entry: &AuditEntry) -> bool {
        match self.check(entry) {
            Ok(()) => true,
            Err(reason) => {
                debug!(
                    op = entry.operation_name(),
                    bucket = entry.bucket(),
                    %reason,
                    "audit entry not eligible for shipping"
                );
                false
            }
        }
    }
}

impl Default for EventFilter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_case::test_case;

    fn entry(name: &str, status: u16) -> AuditEntry {
        AuditEntry::builder(name, "b1")
            .object("o1")
            .status_code(status)
            .build()
    }

    #[test_case("PutObject", 200 ; "put object ok")]
    #[test_case("PutBucket", 200 ; "put bucket ok")]
    #[test_case("DeleteMultipleObjects", 204 ; "multi delete no content")]
    #[test_case("CompleteMultipartUpload", 299 ; "upper bound of success")]
    #[test_case("CopyObjectPart", 100 ; "informational status")]
    fn accepts(name: &str, status: u16) {
        assert!(EventFilter::new().is_eligible(&entry(name, status)));
    }

    #[test]
    fn rejects_missing_status() {
        assert_eq!(
            EventFilter::new().check(&entry("PutObject", 0)),
            Err(Rejection::MissingStatus)
        );
    }

    #[test_case(300 ; "redirect")]
    #[test_case(404 ; "not found")]
    #[test_case(503 ; "unavailable")]
    fn rejects_failed_status(status: u16) {
        assert_eq!(
            EventFilter::new().check(&entry("PutObject", status)),
            Err(Rejection::FailedStatus(status))
        );
    }

    #[test_case("GetObject" ; "read")]
    #[test_case("ListBuckets" ; "listing")]
    #[test_case("putobject" ; "wrong case")]
    #[test_case("" ; "empty")]
    fn rejects_unsupported_operation(name: &str) {
        assert_eq!(
            EventFilter::new().check(&entry(name, 200)),
            Err(Rejection::UnsupportedOperation(name.to_string()))
        );
    }

    #[test]
    fn status_is_checked_before_operation() {
        assert_eq!(
            EventFilter::new().check(&entry("GetObject", 500)),
            Err(Rejection::FailedStatus(500))
        );
    }

    #[test]
    fn restricted_filter() {
        let filter = EventFilter::only([OperationName::PutBucket]);
        assert!(filter.is_eligible(&entry("PutBucket", 200)));
        assert!(!filter.is_eligible(&entry("PutObject", 200)));
    }

    proptest! {
        #[test]
        fn any_failure_status_is_rejected(status in 300u16..=999) {
            prop_assert!(!EventFilter::new().is_eligible(&entry("PutObject", status)));
        }

        #[test]
        fn non_allow_listed_names_are_rejected(name in "[A-Za-z]{1,24}") {
            prop_assume!(OperationName::from_api_name(&name).is_none());
            prop_assert!(!EventFilter::new().is_eligible(&entry(&name, 200)));
        }
    }
}
