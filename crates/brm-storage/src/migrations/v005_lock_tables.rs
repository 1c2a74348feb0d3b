//! v005: rule edit locks and named run leases. One row per key.

pub const MIGRATION_SQL: &str = "
CREATE TABLE IF NOT EXISTS rule_locks (
    rule_id   INTEGER PRIMARY KEY,
    locked_by TEXT NOT NULL,
    locked_at TEXT NOT NULL
) STRICT;

CREATE TABLE IF NOT EXISTS run_leases (
    name        TEXT PRIMARY KEY,
    holder      TEXT NOT NULL,
    acquired_at TEXT NOT NULL
) STRICT;
";
