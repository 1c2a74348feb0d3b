//! Structured log events for rule runs.
//!
//! Each function emits a `tracing` event with structured fields.

use std::time::Duration;

use brm_core::models::{ExecutionResult, RuleId};

pub fn run_started(run_id: &str, roots: usize, dry_run: bool) {
    tracing::info!(
        event = "run_started",
        run_id = %run_id,
        roots = roots,
        dry_run = dry_run,
        "rule run started"
    );
}

pub fn rule_finished(run_id: &str, result: &ExecutionResult, elapsed: Duration) {
    if result.success {
        tracing::info!(
            event = "rule_passed",
            run_id = %run_id,
            rule_id = %result.rule_id,
            record_count = result.record_count,
            elapsed_ms = elapsed.as_millis() as u64,
            "rule passed"
        );
    } else {
        tracing::warn!(
            event = "rule_failed",
            run_id = %run_id,
            rule_id = %result.rule_id,
            message = %result.message,
            elapsed_ms = elapsed.as_millis() as u64,
            "rule failed"
        );
    }
}

/// A graph node with no registry entry.
pub fn rule_missing(run_id: &str, rule_id: RuleId) {
    tracing::warn!(
        event = "rule_missing",
        run_id = %run_id,
        rule_id = %rule_id,
        "rule not in registry, skipped"
    );
}

pub fn rule_cascaded(run_id: &str, rule_id: RuleId, failed_rule: RuleId) {
    tracing::info!(
        event = "rule_cascaded",
        run_id = %run_id,
        rule_id = %rule_id,
        failed_rule = %failed_rule,
        "rule skipped by failure cascade"
    );
}

pub fn run_finished(run_id: &str, executed: usize, skipped: usize, failed: usize) {
    tracing::info!(
        event = "run_finished",
        run_id = %run_id,
        executed = executed,
        skipped = skipped,
        failed = failed,
        "rule run finished"
    );
}
