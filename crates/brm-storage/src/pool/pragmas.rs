//! PRAGMA configuration applied to every SQLite connection.
//!
//! WAL mode, NORMAL sync, 64MB cache, busy_timeout, foreign_keys ON.

use rusqlite::Connection;

use brm_core::errors::BrmResult;

use crate::to_storage_err;

/// Apply all performance and safety pragmas to a connection.
pub fn apply_pragmas(conn: &Connection, busy_timeout_ms: u32) -> BrmResult<()> {
    conn.execute_batch(&format!(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA cache_size = -64000;
        PRAGMA busy_timeout = {busy_timeout_ms};
        PRAGMA foreign_keys = ON;
        "
    ))
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Apply read-only pragmas to a read connection.
pub fn apply_read_pragmas(conn: &Connection, busy_timeout_ms: u32) -> BrmResult<()> {
    conn.execute_batch(&format!(
        "
        PRAGMA query_only = ON;
        PRAGMA cache_size = -64000;
        PRAGMA busy_timeout = {busy_timeout_ms};
        PRAGMA temp_store = MEMORY;
        "
    ))
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Verify that WAL mode is active on a connection.
pub fn verify_wal_mode(conn: &Connection) -> BrmResult<bool> {
    let mode: String = conn
        .pragma_query_value(None, "journal_mode", |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(mode.eq_ignore_ascii_case("wal"))
}
