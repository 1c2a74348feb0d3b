//! Approval pipeline rows and group membership.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};

use brm_core::errors::BrmResult;
use brm_core::models::{ApprovalStage, RuleId};

use crate::{format_timestamp, parse_timestamp, to_storage_err};

/// Drop every approval row for the rule, then insert `stages`. All-or-nothing.
pub fn replace_pipeline(
    conn: &Connection,
    rule_id: RuleId,
    stages: &[ApprovalStage],
) -> BrmResult<()> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| to_storage_err(format!("replace_pipeline begin: {e}")))?;

    match replace_pipeline_inner(&tx, rule_id, stages) {
        Ok(()) => {
            tx.commit()
                .map_err(|e| to_storage_err(format!("replace_pipeline commit: {e}")))?;
            Ok(())
        }
        Err(e) => {
            let _ = tx.rollback();
            Err(e)
        }
    }
}

fn replace_pipeline_inner(
    conn: &Connection,
    rule_id: RuleId,
    stages: &[ApprovalStage],
) -> BrmResult<()> {
    conn.execute(
        "DELETE FROM approvals WHERE rule_id = ?1",
        params![rule_id.value()],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    let mut stmt = conn
        .prepare(
            "INSERT OR IGNORE INTO approvals
                (rule_id, group_name, username, stage, approved_flag, approved_timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    for s in stages {
        stmt.execute(params![
            rule_id.value(),
            s.group_name,
            s.username,
            s.stage,
            s.approved,
            s.approved_at.map(format_timestamp),
        ])
        .map_err(|e| to_storage_err(e.to_string()))?;
    }
    Ok(())
}

pub fn approvals_for_rule(conn: &Connection, rule_id: RuleId) -> BrmResult<Vec<ApprovalStage>> {
    let mut stmt = conn
        .prepare(
            "SELECT rule_id, group_name, username, stage, approved_flag, approved_timestamp
             FROM approvals WHERE rule_id = ?1
             ORDER BY stage, username",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![rule_id.value()], |row| Ok(row_to_stage(row)))
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut stages = Vec::new();
    for row in rows {
        stages.push(row.map_err(|e| to_storage_err(e.to_string()))??);
    }
    Ok(stages)
}

/// Mark one pending row approved. Returns false when nothing matched.
pub fn mark_approved(
    conn: &Connection,
    rule_id: RuleId,
    stage: u32,
    username: &str,
    at: DateTime<Utc>,
) -> BrmResult<bool> {
    let rows = conn
        .execute(
            "UPDATE approvals SET approved_flag = 1, approved_timestamp = ?4
             WHERE rule_id = ?1 AND stage = ?2 AND username = ?3 AND approved_flag = 0",
            params![rule_id.value(), stage, username, format_timestamp(at)],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(rows > 0)
}

pub fn approvers_for_group(conn: &Connection, group: &str) -> BrmResult<Vec<String>> {
    let mut stmt = conn
        .prepare("SELECT username FROM group_approvers WHERE group_name = ?1 ORDER BY username")
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![group], |row| row.get::<_, String>(0))
        .map_err(|e| to_storage_err(e.to_string()))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))
}

pub fn add_group_approver(conn: &Connection, group: &str, username: &str) -> BrmResult<()> {
    conn.execute(
        "INSERT OR IGNORE INTO group_approvers (group_name, username) VALUES (?1, ?2)",
        params![group, username],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

fn row_to_stage(row: &Row<'_>) -> BrmResult<ApprovalStage> {
    let get_err = |e: rusqlite::Error| to_storage_err(e.to_string());
    let approved_at: Option<String> = row.get(5).map_err(get_err)?;
    Ok(ApprovalStage {
        rule_id: RuleId(row.get(0).map_err(get_err)?),
        group_name: row.get(1).map_err(get_err)?,
        username: row.get(2).map_err(get_err)?,
        stage: row.get(3).map_err(get_err)?,
        approved: row.get(4).map_err(get_err)?,
        approved_at: approved_at.as_deref().map(parse_timestamp).transpose()?,
    })
}
