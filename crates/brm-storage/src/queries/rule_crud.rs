//! Insert, update, get, delete, and list for rule definitions.

use rusqlite::{params, Connection, OptionalExtension, Row};

use brm_core::errors::{BrmResult, StorageError};
use brm_core::models::{
    ApprovalStatus, LifecycleState, OperationType, Rule, RuleId, RuleStatus,
};

use crate::{format_timestamp, parse_timestamp, to_storage_err};

const RULE_COLUMNS: &str = "id, parent_id, name, description, critical, is_global, owner_group,
     status, approval_status, lifecycle_state, sql_text, operation_type,
     decision_table_id, version, created_by, updated_by, created_at, updated_at";

/// Insert a rule with its own ID.
pub fn insert_rule(conn: &Connection, rule: &Rule) -> BrmResult<()> {
    conn.execute(
        &format!(
            "INSERT INTO rules ({RULE_COLUMNS}) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18
            )"
        ),
        params![
            rule.id.value(),
            rule.parent_id.map(RuleId::value),
            rule.name,
            rule.description,
            rule.critical,
            rule.is_global,
            rule.owner_group,
            rule.status.as_str(),
            rule.approval_status.as_str(),
            rule.lifecycle_state.as_str(),
            rule.sql_text,
            rule.operation_type.as_str(),
            rule.decision_table_id,
            rule.version,
            rule.created_by,
            rule.updated_by,
            format_timestamp(rule.created_at),
            format_timestamp(rule.updated_at),
        ],
    )
    .map_err(|e| to_storage_err(format!("insert rule {}: {e}", rule.id)))?;
    Ok(())
}

/// Insert a rule and let SQLite assign the rowid. `rule.id` is ignored.
pub fn insert_new_rule(conn: &Connection, rule: &Rule) -> BrmResult<RuleId> {
    conn.execute(
        "INSERT INTO rules (
            parent_id, name, description, critical, is_global, owner_group,
            status, approval_status, lifecycle_state, sql_text, operation_type,
            decision_table_id, version, created_by, updated_by, created_at, updated_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
        params![
            rule.parent_id.map(RuleId::value),
            rule.name,
            rule.description,
            rule.critical,
            rule.is_global,
            rule.owner_group,
            rule.status.as_str(),
            rule.approval_status.as_str(),
            rule.lifecycle_state.as_str(),
            rule.sql_text,
            rule.operation_type.as_str(),
            rule.decision_table_id,
            rule.version,
            rule.created_by,
            rule.updated_by,
            format_timestamp(rule.created_at),
            format_timestamp(rule.updated_at),
        ],
    )
    .map_err(|e| to_storage_err(format!("insert new rule: {e}")))?;
    Ok(RuleId(conn.last_insert_rowid()))
}

/// Get a single rule by ID.
pub fn get_rule(conn: &Connection, id: RuleId) -> BrmResult<Option<Rule>> {
    let mut stmt = conn
        .prepare(&format!("SELECT {RULE_COLUMNS} FROM rules WHERE id = ?1"))
        .map_err(|e| to_storage_err(e.to_string()))?;

    let result = stmt
        .query_row(params![id.value()], |row| Ok(row_to_rule(row)))
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;

    result.transpose()
}

/// Overwrite every mutable column of an existing rule.
pub fn update_rule(conn: &Connection, rule: &Rule) -> BrmResult<()> {
    let rows = conn
        .execute(
            "UPDATE rules SET
                parent_id = ?2, name = ?3, description = ?4, critical = ?5,
                is_global = ?6, owner_group = ?7, status = ?8, approval_status = ?9,
                lifecycle_state = ?10, sql_text = ?11, operation_type = ?12,
                decision_table_id = ?13, version = ?14, updated_by = ?15, updated_at = ?16
             WHERE id = ?1",
            params![
                rule.id.value(),
                rule.parent_id.map(RuleId::value),
                rule.name,
                rule.description,
                rule.critical,
                rule.is_global,
                rule.owner_group,
                rule.status.as_str(),
                rule.approval_status.as_str(),
                rule.lifecycle_state.as_str(),
                rule.sql_text,
                rule.operation_type.as_str(),
                rule.decision_table_id,
                rule.version,
                rule.updated_by,
                format_timestamp(rule.updated_at),
            ],
        )
        .map_err(|e| to_storage_err(format!("update rule {}: {e}", rule.id)))?;

    if rows == 0 {
        return Err(brm_core::BrmError::RuleNotFound { id: rule.id.value() });
    }
    Ok(())
}

/// Delete a rule together with its approval rows, relationship rows, and
/// dependency bookkeeping. All-or-nothing.
pub fn delete_rule(conn: &Connection, id: RuleId) -> BrmResult<()> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| to_storage_err(format!("delete_rule begin: {e}")))?;

    match delete_rule_inner(&tx, id) {
        Ok(()) => {
            tx.commit()
                .map_err(|e| to_storage_err(format!("delete_rule commit: {e}")))?;
            Ok(())
        }
        Err(e) => {
            let _ = tx.rollback();
            Err(e)
        }
    }
}

fn delete_rule_inner(conn: &Connection, id: RuleId) -> BrmResult<()> {
    let id = id.value();
    let dependents = [
        "DELETE FROM approvals WHERE rule_id = ?1",
        "DELETE FROM global_critical_links WHERE gcr_rule_id = ?1 OR target_rule_id = ?1",
        "DELETE FROM rule_conflicts WHERE rule_id_1 = ?1 OR rule_id_2 = ?1",
        "DELETE FROM composite_rules WHERE id = ?1",
        "DELETE FROM rule_table_dependencies WHERE rule_id = ?1",
    ];
    for sql in dependents {
        conn.execute(sql, params![id])
            .map_err(|e| to_storage_err(e.to_string()))?;
    }

    let rows = conn
        .execute("DELETE FROM rules WHERE id = ?1", params![id])
        .map_err(|e| to_storage_err(e.to_string()))?;
    if rows == 0 {
        return Err(brm_core::BrmError::RuleNotFound { id });
    }
    Ok(())
}

/// All rules ordered by ID.
pub fn list_rules(conn: &Connection) -> BrmResult<Vec<Rule>> {
    query_rules(
        conn,
        &format!("SELECT {RULE_COLUMNS} FROM rules ORDER BY id"),
        [],
    )
}

/// Direct children of a rule ordered by ID.
pub fn children_of(conn: &Connection, id: RuleId) -> BrmResult<Vec<Rule>> {
    query_rules(
        conn,
        &format!("SELECT {RULE_COLUMNS} FROM rules WHERE parent_id = ?1 ORDER BY id"),
        [id.value()],
    )
}

fn query_rules<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> BrmResult<Vec<Rule>> {
    let mut stmt = conn
        .prepare(sql)
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params, |row| Ok(row_to_rule(row)))
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut rules = Vec::new();
    for row in rows {
        let rule = row.map_err(|e| to_storage_err(e.to_string()))??;
        rules.push(rule);
    }
    Ok(rules)
}

/// Decode a `rules` row. Unknown enum text is a decode failure, not a default.
fn row_to_rule(row: &Row<'_>) -> BrmResult<Rule> {
    let get_err = |e: rusqlite::Error| to_storage_err(e.to_string());

    let status: String = row.get(7).map_err(get_err)?;
    let approval_status: String = row.get(8).map_err(get_err)?;
    let lifecycle_state: String = row.get(9).map_err(get_err)?;
    let operation_type: String = row.get(11).map_err(get_err)?;
    let created_at: String = row.get(16).map_err(get_err)?;
    let updated_at: String = row.get(17).map_err(get_err)?;

    Ok(Rule {
        id: RuleId(row.get(0).map_err(get_err)?),
        parent_id: row.get::<_, Option<i64>>(1).map_err(get_err)?.map(RuleId),
        name: row.get(2).map_err(get_err)?,
        description: row.get(3).map_err(get_err)?,
        critical: row.get(4).map_err(get_err)?,
        is_global: row.get(5).map_err(get_err)?,
        owner_group: row.get(6).map_err(get_err)?,
        status: decode(RuleStatus::from_str_name(&status), "status", &status)?,
        approval_status: decode(
            ApprovalStatus::from_str_name(&approval_status),
            "approval_status",
            &approval_status,
        )?,
        lifecycle_state: decode(
            LifecycleState::from_str_name(&lifecycle_state),
            "lifecycle_state",
            &lifecycle_state,
        )?,
        sql_text: row.get(10).map_err(get_err)?,
        operation_type: decode(
            OperationType::from_str_name(&operation_type),
            "operation_type",
            &operation_type,
        )?,
        decision_table_id: row.get(12).map_err(get_err)?,
        version: row.get(13).map_err(get_err)?,
        created_by: row.get(14).map_err(get_err)?,
        updated_by: row.get(15).map_err(get_err)?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

fn decode<T>(value: Option<T>, column: &str, raw: &str) -> BrmResult<T> {
    value.ok_or_else(|| {
        StorageError::DecodeFailed {
            table: "rules".to_string(),
            reason: format!("unknown {column} '{raw}'"),
        }
        .into()
    })
}
