//! v006: append-only audit log.

pub const MIGRATION_SQL: &str = "
CREATE TABLE IF NOT EXISTS audit_log (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    action     TEXT NOT NULL,
    table_name TEXT NOT NULL,
    record_id  TEXT,
    actor      TEXT NOT NULL,
    old_data   TEXT,
    new_data   TEXT,
    timestamp  TEXT NOT NULL
) STRICT;

CREATE INDEX IF NOT EXISTS idx_audit_record ON audit_log(table_name, record_id);
";
