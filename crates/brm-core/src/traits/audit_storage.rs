use crate::errors::BrmResult;
use crate::models::AuditEntry;

/// Append-only audit trail for definition changes.
pub trait IAuditStorage: Send + Sync {
    fn record_audit(&self, entry: &AuditEntry) -> BrmResult<()>;
    fn audit_entries_for(&self, table_name: &str, record_id: &str) -> BrmResult<Vec<AuditEntry>>;
}
