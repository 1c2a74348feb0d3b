//! Per-rule execution.

pub mod query;
mod sqlite;
pub mod watchdog;

pub use sqlite::SqliteRuleRunner;

use brm_core::models::{ExecutionResult, Rule};

/// Runs one rule and reports the outcome. Never returns an error: every
/// failure mode becomes `success = false` with a message.
pub trait RuleRunner: Send + Sync {
    fn run(&self, rule: &Rule, dry_run: bool) -> ExecutionResult;
}
