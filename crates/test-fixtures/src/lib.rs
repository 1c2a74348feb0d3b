//! Shared builders and JSON scenarios for integration tests across the
//! workspace.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use brm_core::models::{
    ApprovalStatus, CompositeRule, GlobalCriticalLink, LifecycleState, OperationType, Rule,
    RuleConflict, RuleId, RuleStatus,
};
use brm_core::traits::{IApprovalStorage, IRuleStorage};
use brm_storage::StorageEngine;

/// Fluent builder for [`Rule`]. Defaults to an active, approved,
/// non-critical `SELECT 1` rule.
#[derive(Debug, Clone)]
pub struct RuleBuilder {
    rule: Rule,
}

impl RuleBuilder {
    pub fn new(id: i64) -> Self {
        let now = Utc::now();
        Self {
            rule: Rule {
                id: RuleId(id),
                parent_id: None,
                name: format!("rule-{id}"),
                description: String::new(),
                critical: false,
                is_global: false,
                owner_group: None,
                status: RuleStatus::Active,
                approval_status: ApprovalStatus::Approved,
                lifecycle_state: LifecycleState::Active,
                sql_text: "SELECT 1".to_string(),
                operation_type: OperationType::Select,
                decision_table_id: None,
                version: 1,
                created_by: "fixture".to_string(),
                updated_by: None,
                created_at: now,
                updated_at: now,
            },
        }
    }

    pub fn parent(mut self, parent: i64) -> Self {
        self.rule.parent_id = Some(RuleId(parent));
        self
    }

    pub fn critical(mut self) -> Self {
        self.rule.critical = true;
        self
    }

    pub fn global(mut self) -> Self {
        self.rule.is_global = true;
        self
    }

    pub fn owner(mut self, group: &str) -> Self {
        self.rule.owner_group = Some(group.to_string());
        self
    }

    /// Set the SQL and re-detect the operation type.
    pub fn sql(mut self, sql: &str) -> Self {
        self.rule.sql_text = sql.to_string();
        self.rule.operation_type = OperationType::detect(sql, self.rule.decision_table_id);
        self
    }

    /// A rule whose SQL returns a first column of 0.
    pub fn failing(self) -> Self {
        self.sql("SELECT 0")
    }

    pub fn decision_table(mut self, table_id: i64) -> Self {
        self.rule.sql_text = String::new();
        self.rule.decision_table_id = Some(table_id);
        self.rule.operation_type = OperationType::DecisionTable;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.rule.status = RuleStatus::Inactive;
        self.rule.lifecycle_state = LifecycleState::Inactive;
        self
    }

    pub fn approval(mut self, status: ApprovalStatus) -> Self {
        self.rule.approval_status = status;
        self
    }

    pub fn lifecycle(mut self, state: LifecycleState) -> Self {
        self.rule.lifecycle_state = state;
        self
    }

    pub fn build(self) -> Rule {
        self.rule
    }
}

/// Shorthand for an active `SELECT 1` rule.
pub fn rule(id: i64, parent: Option<i64>) -> Rule {
    let builder = RuleBuilder::new(id);
    match parent {
        Some(p) => builder.parent(p).build(),
        None => builder.build(),
    }
}

/// One rule row in a JSON scenario.
#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioRule {
    pub id: i64,
    #[serde(default)]
    pub parent: Option<i64>,
    #[serde(default)]
    pub critical: bool,
    #[serde(default)]
    pub is_global: bool,
    #[serde(default)]
    pub owner_group: Option<String>,
    #[serde(default = "default_sql")]
    pub sql: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_sql() -> String {
    "SELECT 1".to_string()
}

fn default_active() -> bool {
    true
}

impl ScenarioRule {
    pub fn to_rule(&self) -> Rule {
        let mut builder = RuleBuilder::new(self.id).sql(&self.sql);
        if let Some(parent) = self.parent {
            builder = builder.parent(parent);
        }
        if self.critical {
            builder = builder.critical();
        }
        if self.is_global {
            builder = builder.global();
        }
        if let Some(group) = &self.owner_group {
            builder = builder.owner(group);
        }
        if !self.active {
            builder = builder.inactive();
        }
        builder.build()
    }
}

/// A complete rule set with relationships, loaded from `scenarios/*.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub rules: Vec<ScenarioRule>,
    #[serde(default)]
    pub global_critical_links: Vec<(i64, i64)>,
    #[serde(default)]
    pub conflicts: Vec<(i64, i64)>,
    #[serde(default)]
    pub composites: Vec<ScenarioComposite>,
    #[serde(default)]
    pub group_approvers: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioComposite {
    pub id: i64,
    pub logic_expr: String,
}

impl Scenario {
    /// Write every row of the scenario into storage.
    pub fn seed(&self, engine: &StorageEngine) {
        for r in &self.rules {
            engine
                .insert_rule(&r.to_rule())
                .unwrap_or_else(|e| panic!("seed rule {} in {}: {e}", r.id, self.name));
        }
        for &(gcr, target) in &self.global_critical_links {
            engine
                .add_global_critical_link(&GlobalCriticalLink {
                    gcr_rule_id: RuleId(gcr),
                    target_rule_id: RuleId(target),
                })
                .unwrap_or_else(|e| panic!("seed link in {}: {e}", self.name));
        }
        for &(a, b) in &self.conflicts {
            engine
                .add_conflict(&RuleConflict {
                    rule_id_1: RuleId(a),
                    rule_id_2: RuleId(b),
                    priority: 0,
                })
                .unwrap_or_else(|e| panic!("seed conflict in {}: {e}", self.name));
        }
        for c in &self.composites {
            engine
                .upsert_composite_rule(&CompositeRule {
                    id: RuleId(c.id),
                    logic_expr: c.logic_expr.clone(),
                })
                .unwrap_or_else(|e| panic!("seed composite in {}: {e}", self.name));
        }
        for (group, users) in &self.group_approvers {
            for user in users {
                engine
                    .add_group_approver(group, user)
                    .unwrap_or_else(|e| panic!("seed approver in {}: {e}", self.name));
            }
        }
    }
}

/// Root directory of this crate's scenario files.
fn scenarios_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios")
}

/// Load and deserialize a JSON fixture file.
///
/// # Panics
/// Panics if the file doesn't exist or can't be deserialized.
pub fn load_fixture<T: DeserializeOwned>(relative_path: &str) -> T {
    let path = scenarios_root().join(relative_path);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", path.display(), e))
}

/// Load a named scenario, e.g. `load_scenario("chain_abc")`.
pub fn load_scenario(name: &str) -> Scenario {
    load_fixture(&format!("{name}.json"))
}

/// Fresh in-memory storage seeded with the named scenario.
pub fn seeded_engine(name: &str) -> StorageEngine {
    let engine = StorageEngine::open_in_memory()
        .unwrap_or_else(|e| panic!("open in-memory storage: {e}"));
    load_scenario(name).seed(&engine);
    engine
}
