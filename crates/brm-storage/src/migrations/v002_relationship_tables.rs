//! v002: global-critical links, conflicts, composite rules, table dependencies.

pub const MIGRATION_SQL: &str = "
CREATE TABLE IF NOT EXISTS global_critical_links (
    gcr_rule_id    INTEGER NOT NULL,
    target_rule_id INTEGER NOT NULL,
    PRIMARY KEY (gcr_rule_id, target_rule_id)
) STRICT;

CREATE TABLE IF NOT EXISTS rule_conflicts (
    rule_id_1 INTEGER NOT NULL,
    rule_id_2 INTEGER NOT NULL,
    priority  INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (rule_id_1, rule_id_2)
) STRICT;

CREATE TABLE IF NOT EXISTS composite_rules (
    id         INTEGER PRIMARY KEY,
    logic_expr TEXT NOT NULL
) STRICT;

CREATE TABLE IF NOT EXISTS rule_table_dependencies (
    rule_id      INTEGER NOT NULL,
    schema_name  TEXT,
    table_name   TEXT NOT NULL,
    alias        TEXT,
    is_subselect INTEGER NOT NULL DEFAULT 0
) STRICT;

CREATE INDEX IF NOT EXISTS idx_table_deps_rule ON rule_table_dependencies(rule_id);
";
