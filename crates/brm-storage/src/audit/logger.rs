//! Log every definition mutation with before/after snapshots.

use rusqlite::Connection;

use brm_core::errors::BrmResult;
use brm_core::models::{AuditAction, AuditEntry, Rule, RuleId};

use crate::queries::audit_ops;

/// Table name recorded for rule definition changes.
pub const RULES_TABLE: &str = "rules";

/// Append-only audit logger. Wraps the audit_ops query functions
/// with a convenient API.
pub struct AuditLogger;

impl AuditLogger {
    /// Append a prepared entry.
    pub fn log(conn: &Connection, entry: &AuditEntry) -> BrmResult<()> {
        audit_ops::insert_audit_entry(conn, entry)?;
        tracing::debug!(
            action = entry.action.as_str(),
            table = %entry.table_name,
            record = ?entry.record_id,
            actor = %entry.actor,
            "audit entry recorded"
        );
        Ok(())
    }

    /// Build an entry for a rule change. Snapshots are the serialized rule.
    pub fn rule_entry(
        action: AuditAction,
        rule_id: RuleId,
        actor: &str,
        old: Option<&Rule>,
        new: Option<&Rule>,
    ) -> BrmResult<AuditEntry> {
        Ok(AuditEntry {
            action,
            table_name: RULES_TABLE.to_string(),
            record_id: Some(rule_id.to_string()),
            actor: actor.to_string(),
            old_data: old.map(serde_json::to_value).transpose()?,
            new_data: new.map(serde_json::to_value).transpose()?,
            timestamp: chrono::Utc::now(),
        })
    }

    /// Log a rule change.
    pub fn log_rule_change(
        conn: &Connection,
        action: AuditAction,
        rule_id: RuleId,
        actor: &str,
        old: Option<&Rule>,
        new: Option<&Rule>,
    ) -> BrmResult<()> {
        let entry = Self::rule_entry(action, rule_id, actor, old, new)?;
        Self::log(conn, &entry)
    }
}
