//! Breadth-first execution with failure cascade.

use std::collections::{BTreeSet, HashSet, VecDeque};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;

use brm_core::config::CascadePolicy;
use brm_core::errors::BrmResult;
use brm_core::models::{ExecutionLogEntry, ExecutionResult, Rule, RuleId};
use brm_core::traits::IExecutionLogStorage;
use brm_graph::RuleGraph;

use crate::lease::RunHeartbeat;
use crate::observer::{RunObserver, SkipReason, TracingObserver};
use crate::registry::RuleRegistry;
use crate::report::RunReport;
use crate::runner::RuleRunner;

/// Walks the rule graph breadth-first from the roots (ascending), running
/// each rule at most once.
///
/// - A node already skipped or executed is passed over when dequeued.
/// - A node missing from the registry is skipped.
/// - Success enqueues unvisited successors in ascending order.
/// - Failure skips the rule; under the cascade policy it also skips
///   everything reachable from it that has not already executed.
pub struct BfsExecutor {
    runner: Arc<dyn RuleRunner>,
    log: Arc<dyn IExecutionLogStorage>,
    observer: Arc<dyn RunObserver>,
    policy: CascadePolicy,
}

impl BfsExecutor {
    pub fn new(
        runner: Arc<dyn RuleRunner>,
        log: Arc<dyn IExecutionLogStorage>,
        policy: CascadePolicy,
    ) -> Self {
        Self {
            runner,
            log,
            observer: Arc::new(TracingObserver),
            policy,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn RunObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn policy(&self) -> CascadePolicy {
        self.policy
    }

    pub fn execute(
        &self,
        graph: &RuleGraph,
        registry: &RuleRegistry,
        dry_run: bool,
        run_id: &str,
    ) -> RunReport {
        match self.walk(graph, registry, dry_run, run_id, |_| Ok::<(), Infallible>(())) {
            Ok(report) => report,
            Err(never) => match never {},
        }
    }

    /// Like `execute`, but beats `heartbeat` before each rule runs and stops
    /// with its error the first time it fails.
    pub fn execute_with_heartbeat(
        &self,
        graph: &RuleGraph,
        registry: &RuleRegistry,
        dry_run: bool,
        run_id: &str,
        heartbeat: &dyn RunHeartbeat,
    ) -> BrmResult<RunReport> {
        self.walk(graph, registry, dry_run, run_id, |_| heartbeat.beat(run_id))
    }

    fn walk<E>(
        &self,
        graph: &RuleGraph,
        registry: &RuleRegistry,
        dry_run: bool,
        run_id: &str,
        mut before_rule: impl FnMut(RuleId) -> Result<(), E>,
    ) -> Result<RunReport, E> {
        let roots = graph.roots();
        self.observer.run_started(run_id, roots.len(), dry_run);

        let mut queue: VecDeque<RuleId> = roots.iter().copied().collect();
        let mut queued: HashSet<RuleId> = roots.iter().copied().collect();
        let mut executed_set: HashSet<RuleId> = HashSet::new();
        let mut report = RunReport {
            run_id: run_id.to_string(),
            dry_run,
            ..RunReport::default()
        };

        while let Some(rid) = queue.pop_front() {
            if report.skipped.contains(&rid) || executed_set.contains(&rid) {
                continue;
            }
            let Some(rule) = registry.get(rid) else {
                report.skipped.insert(rid);
                self.observer
                    .rule_skipped(run_id, rid, SkipReason::NotInRegistry);
                continue;
            };

            before_rule(rid)?;

            let started = Instant::now();
            let result = self.runner.run(rule, dry_run);
            let elapsed = started.elapsed();
            self.append_log(&result, run_id, dry_run, elapsed.as_millis() as u64);
            self.observer.rule_finished(run_id, &result, elapsed);

            if result.success {
                report.executed.push(rid);
                executed_set.insert(rid);
                for next in graph.neighbors(rid) {
                    if executed_set.contains(&next) || report.skipped.contains(&next) {
                        continue;
                    }
                    if queued.insert(next) {
                        queue.push_back(next);
                    }
                }
            } else {
                report.skipped.insert(rid);
                if cascades(self.policy, rule) {
                    self.cascade(graph, rid, &executed_set, &mut report.skipped, run_id);
                }
            }
            report.results.push(result);
        }

        self.observer.run_finished(run_id, &report);
        Ok(report)
    }

    fn cascade(
        &self,
        graph: &RuleGraph,
        failed: RuleId,
        executed: &HashSet<RuleId>,
        skipped: &mut BTreeSet<RuleId>,
        run_id: &str,
    ) {
        for downstream in graph.reachable_from(failed) {
            if executed.contains(&downstream) {
                continue;
            }
            if skipped.insert(downstream) {
                self.observer
                    .rule_skipped(run_id, downstream, SkipReason::Cascade { from: failed });
            }
        }
    }

    fn append_log(&self, result: &ExecutionResult, run_id: &str, dry_run: bool, elapsed_ms: u64) {
        let entry = ExecutionLogEntry {
            rule_id: result.rule_id,
            run_id: run_id.to_string(),
            pass: result.success,
            message: result.message.clone(),
            record_count: result.record_count,
            dry_run,
            elapsed_ms,
            timestamp: Utc::now(),
        };
        if let Err(e) = self.log.append_execution_log(&entry) {
            tracing::warn!(rule_id = %result.rule_id, error = %e, "failed to write execution log");
        }
    }
}

/// Whether a failure of `rule` suppresses everything downstream.
pub fn cascades(policy: CascadePolicy, rule: &Rule) -> bool {
    match policy {
        CascadePolicy::Always => true,
        CascadePolicy::CriticalOnly => rule.cascades_on_failure(),
    }
}
