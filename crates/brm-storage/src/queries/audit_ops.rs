//! Raw SQL for the append-only audit_log table.

use rusqlite::{params, Connection, Row};

use brm_core::errors::{BrmResult, StorageError};
use brm_core::models::{AuditAction, AuditEntry};

use crate::{format_timestamp, parse_timestamp, to_storage_err};

pub fn insert_audit_entry(conn: &Connection, entry: &AuditEntry) -> BrmResult<()> {
    let old_json = entry
        .old_data
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;
    let new_json = entry
        .new_data
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;

    conn.execute(
        "INSERT INTO audit_log (action, table_name, record_id, actor, old_data, new_data, timestamp)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            entry.action.as_str(),
            entry.table_name,
            entry.record_id,
            entry.actor,
            old_json,
            new_json,
            format_timestamp(entry.timestamp),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Entries for one record, oldest first.
pub fn query_by_record(
    conn: &Connection,
    table_name: &str,
    record_id: &str,
) -> BrmResult<Vec<AuditEntry>> {
    let mut stmt = conn
        .prepare(
            "SELECT action, table_name, record_id, actor, old_data, new_data, timestamp
             FROM audit_log WHERE table_name = ?1 AND record_id = ?2
             ORDER BY id",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![table_name, record_id], |row| Ok(row_to_entry(row)))
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut entries = Vec::new();
    for row in rows {
        entries.push(row.map_err(|e| to_storage_err(e.to_string()))??);
    }
    Ok(entries)
}

fn row_to_entry(row: &Row<'_>) -> BrmResult<AuditEntry> {
    let get_err = |e: rusqlite::Error| to_storage_err(e.to_string());
    let action: String = row.get(0).map_err(get_err)?;
    let old_data: Option<String> = row.get(4).map_err(get_err)?;
    let new_data: Option<String> = row.get(5).map_err(get_err)?;
    let timestamp: String = row.get(6).map_err(get_err)?;

    Ok(AuditEntry {
        action: AuditAction::from_str_name(&action).ok_or_else(|| StorageError::DecodeFailed {
            table: "audit_log".to_string(),
            reason: format!("unknown action '{action}'"),
        })?,
        table_name: row.get(1).map_err(get_err)?,
        record_id: row.get(2).map_err(get_err)?,
        actor: row.get(3).map_err(get_err)?,
        old_data: old_data.as_deref().map(serde_json::from_str).transpose()?,
        new_data: new_data.as_deref().map(serde_json::from_str).transpose()?,
        timestamp: parse_timestamp(&timestamp)?,
    })
}
