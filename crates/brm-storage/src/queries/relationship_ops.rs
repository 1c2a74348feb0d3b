//! Global-critical links, conflicts, composite rules, and per-rule table
//! dependencies.

use rusqlite::{params, Connection};

use brm_core::errors::BrmResult;
use brm_core::models::{CompositeRule, GlobalCriticalLink, RuleConflict, RuleId, TableReference};

use crate::to_storage_err;

/// Add a global-critical link. Duplicate pairs are ignored.
pub fn add_global_critical_link(conn: &Connection, link: &GlobalCriticalLink) -> BrmResult<()> {
    conn.execute(
        "INSERT OR IGNORE INTO global_critical_links (gcr_rule_id, target_rule_id)
         VALUES (?1, ?2)",
        params![link.gcr_rule_id.value(), link.target_rule_id.value()],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn global_critical_links(conn: &Connection) -> BrmResult<Vec<GlobalCriticalLink>> {
    let mut stmt = conn
        .prepare(
            "SELECT gcr_rule_id, target_rule_id FROM global_critical_links
             ORDER BY gcr_rule_id, target_rule_id",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map([], |row| {
            Ok(GlobalCriticalLink {
                gcr_rule_id: RuleId(row.get(0)?),
                target_rule_id: RuleId(row.get(1)?),
            })
        })
        .map_err(|e| to_storage_err(e.to_string()))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))
}

/// Record a conflict pair. Re-adding a pair updates its priority.
pub fn add_conflict(conn: &Connection, conflict: &RuleConflict) -> BrmResult<()> {
    conn.execute(
        "INSERT INTO rule_conflicts (rule_id_1, rule_id_2, priority) VALUES (?1, ?2, ?3)
         ON CONFLICT(rule_id_1, rule_id_2) DO UPDATE SET priority = excluded.priority",
        params![
            conflict.rule_id_1.value(),
            conflict.rule_id_2.value(),
            conflict.priority
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn conflicts(conn: &Connection) -> BrmResult<Vec<RuleConflict>> {
    let mut stmt = conn
        .prepare(
            "SELECT rule_id_1, rule_id_2, priority FROM rule_conflicts
             ORDER BY rule_id_1, rule_id_2",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map([], |row| {
            Ok(RuleConflict {
                rule_id_1: RuleId(row.get(0)?),
                rule_id_2: RuleId(row.get(1)?),
                priority: row.get(2)?,
            })
        })
        .map_err(|e| to_storage_err(e.to_string()))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))
}

pub fn upsert_composite_rule(conn: &Connection, composite: &CompositeRule) -> BrmResult<()> {
    conn.execute(
        "INSERT INTO composite_rules (id, logic_expr) VALUES (?1, ?2)
         ON CONFLICT(id) DO UPDATE SET logic_expr = excluded.logic_expr",
        params![composite.id.value(), composite.logic_expr],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn composite_rules(conn: &Connection) -> BrmResult<Vec<CompositeRule>> {
    let mut stmt = conn
        .prepare("SELECT id, logic_expr FROM composite_rules ORDER BY id")
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map([], |row| {
            Ok(CompositeRule {
                id: RuleId(row.get(0)?),
                logic_expr: row.get(1)?,
            })
        })
        .map_err(|e| to_storage_err(e.to_string()))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))
}

/// Replace the table dependencies recorded for a rule.
pub fn replace_table_dependencies(
    conn: &Connection,
    rule_id: RuleId,
    tables: &[TableReference],
) -> BrmResult<()> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| to_storage_err(format!("replace_table_dependencies begin: {e}")))?;

    tx.execute(
        "DELETE FROM rule_table_dependencies WHERE rule_id = ?1",
        params![rule_id.value()],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    for table in tables {
        tx.execute(
            "INSERT INTO rule_table_dependencies (rule_id, schema_name, table_name, alias, is_subselect)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                rule_id.value(),
                table.schema,
                table.table,
                table.alias,
                table.is_subselect
            ],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    }

    tx.commit()
        .map_err(|e| to_storage_err(format!("replace_table_dependencies commit: {e}")))
}

pub fn table_dependencies(conn: &Connection, rule_id: RuleId) -> BrmResult<Vec<TableReference>> {
    let mut stmt = conn
        .prepare(
            "SELECT schema_name, table_name, alias, is_subselect
             FROM rule_table_dependencies WHERE rule_id = ?1 ORDER BY rowid",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![rule_id.value()], |row| {
            Ok(TableReference {
                schema: row.get(0)?,
                table: row.get(1)?,
                alias: row.get(2)?,
                is_subselect: row.get(3)?,
            })
        })
        .map_err(|e| to_storage_err(e.to_string()))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))
}
