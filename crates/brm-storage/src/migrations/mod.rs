//! Schema migrations using PRAGMA user_version.

pub mod v001_rule_tables;
pub mod v002_relationship_tables;
pub mod v003_approval_tables;
pub mod v004_execution_tables;
pub mod v005_lock_tables;
pub mod v006_audit_tables;

use rusqlite::Connection;

use brm_core::errors::{BrmResult, StorageError};

/// Latest schema version.
pub const LATEST_VERSION: u32 = 6;

const MIGRATIONS: &[(&str, u32)] = &[
    (v001_rule_tables::MIGRATION_SQL, 1),
    (v002_relationship_tables::MIGRATION_SQL, 2),
    (v003_approval_tables::MIGRATION_SQL, 3),
    (v004_execution_tables::MIGRATION_SQL, 4),
    (v005_lock_tables::MIGRATION_SQL, 5),
    (v006_audit_tables::MIGRATION_SQL, 6),
];

/// Run all pending migrations. Each version applies inside its own transaction.
pub fn run_migrations(conn: &Connection) -> BrmResult<()> {
    let current = current_version(conn)?;

    for (sql, version) in MIGRATIONS {
        if current >= *version {
            continue;
        }
        let failed = |e: rusqlite::Error| StorageError::MigrationFailed {
            version: *version,
            reason: e.to_string(),
        };
        let tx = conn.unchecked_transaction().map_err(failed)?;
        tx.execute_batch(sql).map_err(failed)?;
        tx.pragma_update(None, "user_version", version)
            .map_err(failed)?;
        tx.commit().map_err(failed)?;
        tracing::info!(version = version, "applied migration");
    }

    Ok(())
}

/// Get the current schema version.
pub fn current_version(conn: &Connection) -> BrmResult<u32> {
    let version = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(|e| StorageError::SqliteError {
            message: e.to_string(),
        })?;
    Ok(version)
}
