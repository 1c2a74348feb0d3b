//! Run progress reporting. The executor only talks to a [`RunObserver`];
//! process-wide logging setup lives in [`crate::tracing_setup`].

use std::time::Duration;

use brm_core::models::{ExecutionResult, RuleId};

use crate::report::RunReport;
use crate::tracing_setup::events;

/// Why a rule was not run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Referenced by an edge but not in the registry.
    NotInRegistry,
    /// Downstream of a failed cascading rule.
    Cascade { from: RuleId },
}

/// Receives progress callbacks from the BFS executor. All methods default
/// to no-ops.
pub trait RunObserver: Send + Sync {
    fn run_started(&self, _run_id: &str, _roots: usize, _dry_run: bool) {}
    fn rule_finished(&self, _run_id: &str, _result: &ExecutionResult, _elapsed: Duration) {}
    fn rule_skipped(&self, _run_id: &str, _rule_id: RuleId, _reason: SkipReason) {}
    fn run_finished(&self, _run_id: &str, _report: &RunReport) {}
}

/// Emits one structured `tracing` event per callback.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl RunObserver for TracingObserver {
    fn run_started(&self, run_id: &str, roots: usize, dry_run: bool) {
        events::run_started(run_id, roots, dry_run);
    }

    fn rule_finished(&self, run_id: &str, result: &ExecutionResult, elapsed: Duration) {
        events::rule_finished(run_id, result, elapsed);
    }

    fn rule_skipped(&self, run_id: &str, rule_id: RuleId, reason: SkipReason) {
        match reason {
            SkipReason::NotInRegistry => events::rule_missing(run_id, rule_id),
            SkipReason::Cascade { from } => events::rule_cascaded(run_id, rule_id, from),
        }
    }

    fn run_finished(&self, run_id: &str, report: &RunReport) {
        events::run_finished(
            run_id,
            report.executed.len(),
            report.skipped.len(),
            report.failed().count(),
        );
    }
}
