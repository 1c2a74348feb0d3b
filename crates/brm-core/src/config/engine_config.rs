use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;

/// When a failed rule suppresses the rules reachable from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CascadePolicy {
    /// Cascade only when the failed rule is critical or global.
    #[default]
    CriticalOnly,
    /// Cascade on every failure.
    Always,
}

/// BFS execution engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub cascade_policy: CascadePolicy,
    /// Upper bound on a single rule's execution.
    pub rule_timeout_secs: u64,
    /// How long a run lease stays valid if the holder never releases it.
    pub run_lease_ttl_secs: u64,
    /// Only rules with status ACTIVE enter the registry for a run.
    pub only_active_rules: bool,
}

impl EngineConfig {
    pub fn rule_timeout(&self) -> Duration {
        Duration::from_secs(self.rule_timeout_secs)
    }

    pub fn run_lease_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.run_lease_ttl_secs as i64)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cascade_policy: CascadePolicy::default(),
            rule_timeout_secs: defaults::DEFAULT_RULE_TIMEOUT_SECS,
            run_lease_ttl_secs: defaults::DEFAULT_RUN_LEASE_TTL_SECS,
            only_active_rules: defaults::DEFAULT_ONLY_ACTIVE_RULES,
        }
    }
}
