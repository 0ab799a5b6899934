//! Audit entry fixtures.

use s3mirror_audit_types::AuditEntry;

/// A successful object write.
pub fn put_object(bucket: &str, object: &str) -> AuditEntry {
    entry("PutObject", bucket, Some(object), 200)
}

/// A successful bucket creation.
pub fn put_bucket(bucket: &str) -> AuditEntry {
    entry("PutBucket", bucket, None, 200)
}

/// Any entry.
pub fn entry(name: &str, bucket: &str, object: Option<&str>, status: u16) -> AuditEntry {
    let mut builder = AuditEntry::builder(name, bucket)
        .status_code(status)
        .request_id("16B0C9E3A1F2D000")
        .remote_host("10.0.0.7")
        .user_agent("aws-cli/2.0.0");
    if let Some(object) = object {
        builder = builder.object(object);
    }
    builder.build()
}

/// `count` object writes to `b1`, named `o0`, `o1`, ...
pub fn object_writes(count: usize) -> Vec<AuditEntry> {
    (0..count)
        .map(|i| put_object("b1", &format!("o{}", i)))
        .collect()
}
