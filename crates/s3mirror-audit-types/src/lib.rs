//! Audit entry and storage operation types for s3mirror.

mod enrichment;
mod entry;
mod operation;

pub use enrichment::{ContentKind, EnrichmentResult, ShippedRecord};
pub use entry::{ApiDetails, AuditEntry, AuditEntryBuilder, AUDIT_ENTRY_VERSION};
pub use operation::OperationName;
