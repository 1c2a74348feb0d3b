use std::collections::BTreeSet;

use serde::Serialize;

use brm_core::models::{ExecutionResult, RuleId};

/// Outcome of one full pass over the rule graph.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub run_id: String,
    pub dry_run: bool,
    /// Successfully executed rules, in execution order.
    pub executed: Vec<RuleId>,
    pub skipped: BTreeSet<RuleId>,
    /// One entry per runner invocation, in execution order.
    pub results: Vec<ExecutionResult>,
}

impl RunReport {
    pub fn failed(&self) -> impl Iterator<Item = &ExecutionResult> {
        self.results.iter().filter(|r| !r.success)
    }

    pub fn was_executed(&self, id: RuleId) -> bool {
        self.executed.contains(&id)
    }

    pub fn was_skipped(&self, id: RuleId) -> bool {
        self.skipped.contains(&id)
    }

    /// How many times the runner was invoked for `id`.
    pub fn attempts(&self, id: RuleId) -> usize {
        self.results.iter().filter(|r| r.rule_id == id).count()
    }
}
