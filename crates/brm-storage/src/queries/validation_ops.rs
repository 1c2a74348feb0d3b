//! Global data validations that gate a run.

use rusqlite::{params, Connection};

use brm_core::errors::BrmResult;
use brm_core::models::DataValidation;

use crate::to_storage_err;

pub fn add_data_validation(
    conn: &Connection,
    description: &str,
    check_sql: &str,
) -> BrmResult<i64> {
    conn.execute(
        "INSERT INTO data_validations (description, check_sql, enabled) VALUES (?1, ?2, 1)",
        params![description, check_sql],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(conn.last_insert_rowid())
}

/// Every validation, enabled or not, ordered by ID.
pub fn list_data_validations(conn: &Connection) -> BrmResult<Vec<DataValidation>> {
    let mut stmt = conn
        .prepare("SELECT id, description, check_sql, enabled FROM data_validations ORDER BY id")
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map([], |row| {
            Ok(DataValidation {
                id: row.get(0)?,
                description: row.get(1)?,
                check_sql: row.get(2)?,
                enabled: row.get(3)?,
            })
        })
        .map_err(|e| to_storage_err(e.to_string()))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))
}

pub fn set_validation_enabled(conn: &Connection, id: i64, enabled: bool) -> BrmResult<()> {
    conn.execute(
        "UPDATE data_validations SET enabled = ?2 WHERE id = ?1",
        params![id, enabled],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
