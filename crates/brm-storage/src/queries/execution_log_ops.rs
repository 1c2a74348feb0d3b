//! Append-only execution logs.

use rusqlite::{params, Connection, Row};

use brm_core::errors::BrmResult;
use brm_core::models::{ExecutionLogEntry, RuleId};

use crate::{format_timestamp, parse_timestamp, to_storage_err};

pub fn append_execution_log(conn: &Connection, entry: &ExecutionLogEntry) -> BrmResult<()> {
    conn.execute(
        "INSERT INTO execution_logs
            (rule_id, run_id, pass_flag, message, record_count, dry_run, elapsed_ms, timestamp)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            entry.rule_id.value(),
            entry.run_id,
            entry.pass,
            entry.message,
            entry.record_count as i64,
            entry.dry_run,
            entry.elapsed_ms as i64,
            format_timestamp(entry.timestamp),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn logs_for_rule(conn: &Connection, rule_id: RuleId) -> BrmResult<Vec<ExecutionLogEntry>> {
    query_logs(
        conn,
        "SELECT rule_id, run_id, pass_flag, message, record_count, dry_run, elapsed_ms, timestamp
         FROM execution_logs WHERE rule_id = ?1 ORDER BY id",
        params![rule_id.value()],
    )
}

/// Entries of one run in execution order.
pub fn logs_for_run(conn: &Connection, run_id: &str) -> BrmResult<Vec<ExecutionLogEntry>> {
    query_logs(
        conn,
        "SELECT rule_id, run_id, pass_flag, message, record_count, dry_run, elapsed_ms, timestamp
         FROM execution_logs WHERE run_id = ?1 ORDER BY id",
        params![run_id],
    )
}

fn query_logs<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> BrmResult<Vec<ExecutionLogEntry>> {
    let mut stmt = conn
        .prepare(sql)
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params, |row| Ok(row_to_entry(row)))
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut entries = Vec::new();
    for row in rows {
        entries.push(row.map_err(|e| to_storage_err(e.to_string()))??);
    }
    Ok(entries)
}

fn row_to_entry(row: &Row<'_>) -> BrmResult<ExecutionLogEntry> {
    let get_err = |e: rusqlite::Error| to_storage_err(e.to_string());
    let timestamp: String = row.get(7).map_err(get_err)?;
    Ok(ExecutionLogEntry {
        rule_id: RuleId(row.get(0).map_err(get_err)?),
        run_id: row.get(1).map_err(get_err)?,
        pass: row.get(2).map_err(get_err)?,
        message: row.get(3).map_err(get_err)?,
        record_count: row.get::<_, i64>(4).map_err(get_err)?.max(0) as u64,
        dry_run: row.get(5).map_err(get_err)?,
        elapsed_ms: row.get::<_, i64>(6).map_err(get_err)?.max(0) as u64,
        timestamp: parse_timestamp(&timestamp)?,
    })
}
