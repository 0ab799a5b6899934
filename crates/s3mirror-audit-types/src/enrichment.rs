//! Content metadata attached to shipped audit entries.

use crate::AuditEntry;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Whether a content hash addresses a bucket or an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, EnumString)]
pub enum ContentKind {
    Bucket,
    Object,
}

/// Result of a content metadata lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentResult {
    pub hash: String,
    pub kind: ContentKind,
}

/// Enriched payload shipped to the audit sink.
#[derive(Debug, Clone, Serialize)]
pub struct ShippedRecord<'a> {
    pub entry: &'a AuditEntry,
    pub hash: &'a str,
    #[serde(rename = "contentKind")]
    pub content_kind: ContentKind,
}

impl<'a> ShippedRecord<'a> {
    pub fn new(entry: &'a AuditEntry, enrichment: &'a EnrichmentResult) -> Self {
        Self {
            entry,
            hash: &enrichment.hash,
            content_kind: enrichment.kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shipped_record_shape() {
        let entry = AuditEntry::builder("PutObject", "b1")
            .object("o1")
            .status_code(200)
            .build();
        let enrichment = EnrichmentResult {
            hash: "Qm123".to_string(),
            kind: ContentKind::Object,
        };

        let json = serde_json::to_value(ShippedRecord::new(&entry, &enrichment)).unwrap();
        assert_eq!(json["entry"]["api"]["bucket"], "b1");
        assert_eq!(json["entry"]["api"]["object"], "o1");
        assert_eq!(json["hash"], "Qm123");
        assert_eq!(json["contentKind"], "Object");
    }

    #[test]
    fn test_content_kind_display() {
        assert_eq!(ContentKind::Bucket.to_string(), "Bucket");
        assert_eq!("Object".parse::<ContentKind>().unwrap(), ContentKind::Object);
    }
}
