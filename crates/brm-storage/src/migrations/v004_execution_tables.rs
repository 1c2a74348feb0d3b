//! v004: execution log and data validations.

pub const MIGRATION_SQL: &str = "
CREATE TABLE IF NOT EXISTS execution_logs (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    rule_id      INTEGER NOT NULL,
    run_id       TEXT NOT NULL,
    pass_flag    INTEGER NOT NULL,
    message      TEXT NOT NULL,
    record_count INTEGER NOT NULL DEFAULT 0,
    dry_run      INTEGER NOT NULL DEFAULT 0,
    elapsed_ms   INTEGER NOT NULL DEFAULT 0,
    timestamp    TEXT NOT NULL
) STRICT;

CREATE INDEX IF NOT EXISTS idx_exec_logs_rule ON execution_logs(rule_id);
CREATE INDEX IF NOT EXISTS idx_exec_logs_run ON execution_logs(run_id);

CREATE TABLE IF NOT EXISTS data_validations (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    description TEXT NOT NULL,
    check_sql   TEXT NOT NULL,
    enabled     INTEGER NOT NULL DEFAULT 1
) STRICT;
";
