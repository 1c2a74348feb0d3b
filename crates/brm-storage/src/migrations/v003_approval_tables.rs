//! v003: approval pipeline rows and group membership.

pub const MIGRATION_SQL: &str = "
CREATE TABLE IF NOT EXISTS approvals (
    rule_id            INTEGER NOT NULL,
    group_name         TEXT NOT NULL,
    username           TEXT NOT NULL,
    stage              INTEGER NOT NULL,
    approved_flag      INTEGER NOT NULL DEFAULT 0,
    approved_timestamp TEXT,
    PRIMARY KEY (rule_id, stage, username)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_approvals_pending
    ON approvals(rule_id, approved_flag, stage);

CREATE TABLE IF NOT EXISTS group_approvers (
    group_name TEXT NOT NULL,
    username   TEXT NOT NULL,
    PRIMARY KEY (group_name, username)
) STRICT;
";
