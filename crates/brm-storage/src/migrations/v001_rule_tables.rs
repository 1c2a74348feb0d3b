//! v001: rule definitions.

pub const MIGRATION_SQL: &str = "
CREATE TABLE IF NOT EXISTS rules (
    id                INTEGER PRIMARY KEY,
    parent_id         INTEGER,
    name              TEXT NOT NULL,
    description       TEXT NOT NULL DEFAULT '',
    critical          INTEGER NOT NULL DEFAULT 0,
    is_global         INTEGER NOT NULL DEFAULT 0,
    owner_group       TEXT,
    status            TEXT NOT NULL,
    approval_status   TEXT NOT NULL,
    lifecycle_state   TEXT NOT NULL,
    sql_text          TEXT NOT NULL DEFAULT '',
    operation_type    TEXT NOT NULL,
    decision_table_id INTEGER,
    version           INTEGER NOT NULL DEFAULT 1,
    created_by        TEXT NOT NULL,
    updated_by        TEXT,
    created_at        TEXT NOT NULL,
    updated_at        TEXT NOT NULL
) STRICT;

CREATE INDEX IF NOT EXISTS idx_rules_parent ON rules(parent_id);
CREATE INDEX IF NOT EXISTS idx_rules_status ON rules(status);
";
