//! BFS traversal, cascade policy, re-visitation, and execution logs.

use std::collections::{BTreeSet, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use brm_core::config::CascadePolicy;
use brm_core::errors::{BrmError, BrmResult};
use brm_core::models::{EdgeKind, ExecutionLogEntry, ExecutionResult, Rule, RuleId};
use brm_core::traits::{IExecutionLogStorage, IRuleStorage};
use brm_core::errors::LockError;
use brm_engine::{
    BfsExecutor, RuleRegistry, RuleRunner, RunHeartbeat, RunObserver, SkipReason, SqliteRuleRunner,
};
use brm_graph::{RelationshipLoader, RuleGraph};
use brm_storage::StorageEngine;
use test_fixtures::{rule, seeded_engine, RuleBuilder};

/// Fails the configured IDs, passes everything else, records call order.
#[derive(Default)]
struct ScriptedRunner {
    failing: HashSet<RuleId>,
    calls: Mutex<Vec<RuleId>>,
}

impl ScriptedRunner {
    fn failing(ids: &[i64]) -> Self {
        Self {
            failing: ids.iter().copied().map(RuleId).collect(),
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl RuleRunner for ScriptedRunner {
    fn run(&self, rule: &Rule, _dry_run: bool) -> ExecutionResult {
        self.calls.lock().unwrap().push(rule.id);
        let success = !self.failing.contains(&rule.id);
        ExecutionResult {
            rule_id: rule.id,
            success,
            message: if success { "ok" } else { "scripted failure" }.to_string(),
            record_count: 0,
        }
    }
}

struct BrokenLog;

impl IExecutionLogStorage for BrokenLog {
    fn append_execution_log(&self, _entry: &ExecutionLogEntry) -> BrmResult<()> {
        Err(BrmError::ConcurrencyError("log unavailable".to_string()))
    }
    fn execution_logs_for_rule(&self, _rule_id: RuleId) -> BrmResult<Vec<ExecutionLogEntry>> {
        Ok(Vec::new())
    }
    fn execution_logs_for_run(&self, _run_id: &str) -> BrmResult<Vec<ExecutionLogEntry>> {
        Ok(Vec::new())
    }
}

#[derive(Default)]
struct RecordingObserver {
    skips: Mutex<Vec<(RuleId, SkipReason)>>,
    finished: Mutex<usize>,
}

impl RunObserver for RecordingObserver {
    fn rule_skipped(&self, _run_id: &str, rule_id: RuleId, reason: SkipReason) {
        self.skips.lock().unwrap().push((rule_id, reason));
    }
    fn rule_finished(&self, _run_id: &str, _result: &ExecutionResult, _elapsed: Duration) {
        *self.finished.lock().unwrap() += 1;
    }
}

fn ids(v: &[i64]) -> Vec<RuleId> {
    v.iter().copied().map(RuleId).collect()
}

fn set(v: &[i64]) -> BTreeSet<RuleId> {
    v.iter().copied().map(RuleId).collect()
}

fn graph_of(rules: &[Rule], extra: &[(i64, i64)]) -> RuleGraph {
    let mut graph = RuleGraph::new();
    for r in rules {
        graph.add_rule(r.id, r.parent_id);
    }
    for &(a, b) in extra {
        graph.add_edge(RuleId(a), RuleId(b), EdgeKind::GlobalCritical);
    }
    graph
}

fn executor(runner: ScriptedRunner, policy: CascadePolicy) -> BfsExecutor {
    BfsExecutor::new(Arc::new(runner), Arc::new(BrokenLog), policy)
}

#[test]
fn critical_root_failure_skips_whole_chain() {
    let rules = vec![
        RuleBuilder::new(1).critical().build(),
        rule(2, Some(1)),
        rule(3, Some(2)),
    ];
    let graph = graph_of(&rules, &[]);
    let registry = RuleRegistry::from_rules(rules);

    let report = executor(ScriptedRunner::failing(&[1]), CascadePolicy::CriticalOnly)
        .execute(&graph, &registry, false, "run");
    assert!(report.executed.is_empty());
    assert_eq!(report.skipped, set(&[1, 2, 3]));
}

#[test]
fn forest_without_failures_visits_everything_reachable() {
    let rules = vec![
        rule(1, None),
        rule(2, Some(1)),
        rule(3, Some(1)),
        rule(4, Some(2)),
        rule(10, None),
        rule(11, Some(10)),
    ];
    let graph = graph_of(&rules, &[]);
    let registry = RuleRegistry::from_rules(rules);

    let report = executor(ScriptedRunner::default(), CascadePolicy::CriticalOnly)
        .execute(&graph, &registry, true, "run");
    assert_eq!(report.executed, ids(&[1, 10, 2, 3, 11, 4]));
    assert!(report.skipped.is_empty());
}

#[test]
fn global_rule_failure_cascades() {
    let rules = vec![RuleBuilder::new(1).global().build(), rule(2, Some(1))];
    let graph = graph_of(&rules, &[]);
    let registry = RuleRegistry::from_rules(rules);

    let report = executor(ScriptedRunner::failing(&[1]), CascadePolicy::CriticalOnly)
        .execute(&graph, &registry, false, "run");
    assert_eq!(report.skipped, set(&[1, 2]));
}

#[test]
fn non_critical_failure_cascade_depends_on_policy() {
    // 1 fails (non-critical); 2 is its child and also a target of root 4.
    let rules = vec![rule(1, None), rule(2, Some(1)), rule(4, None)];
    let graph = graph_of(&rules, &[(4, 2)]);
    let registry = RuleRegistry::from_rules(rules);

    let critical_only = executor(ScriptedRunner::failing(&[1]), CascadePolicy::CriticalOnly)
        .execute(&graph, &registry, false, "run");
    assert_eq!(critical_only.executed, ids(&[4, 2]));
    assert_eq!(critical_only.skipped, set(&[1]));

    let always = executor(ScriptedRunner::failing(&[1]), CascadePolicy::Always)
        .execute(&graph, &registry, false, "run");
    assert_eq!(always.executed, ids(&[4]));
    assert_eq!(always.skipped, set(&[1, 2]));
}

#[test]
fn cascade_never_unexecutes() {
    let rules = vec![rule(1, None), RuleBuilder::new(2).critical().build(), rule(3, None)];
    let graph = graph_of(&rules, &[(1, 3), (2, 1), (2, 3)]);
    let registry = RuleRegistry::from_rules(rules);

    let report = executor(ScriptedRunner::failing(&[2]), CascadePolicy::CriticalOnly)
        .execute(&graph, &registry, false, "run");
    assert_eq!(report.executed, ids(&[1]));
    assert_eq!(report.skipped, set(&[2, 3]));
}

#[test]
fn dangling_reference_is_skipped() {
    let rules = vec![rule(1, None)];
    let graph = graph_of(&rules, &[(1, 77)]);
    let registry = RuleRegistry::from_rules(rules);
    let observer = Arc::new(RecordingObserver::default());

    let report = executor(ScriptedRunner::default(), CascadePolicy::CriticalOnly)
        .with_observer(observer.clone())
        .execute(&graph, &registry, false, "run");
    assert_eq!(report.executed, ids(&[1]));
    assert_eq!(report.skipped, set(&[77]));
    assert_eq!(
        *observer.skips.lock().unwrap(),
        vec![(RuleId(77), SkipReason::NotInRegistry)]
    );
    assert_eq!(*observer.finished.lock().unwrap(), 1);
}

#[test]
fn cycles_run_each_rule_once() {
    let rules = vec![rule(1, None), rule(2, None)];
    let graph = graph_of(&rules, &[(1, 2), (2, 1)]);
    let registry = RuleRegistry::from_rules(rules);
    let runner = Arc::new(ScriptedRunner::default());

    let report = BfsExecutor::new(runner.clone(), Arc::new(BrokenLog), CascadePolicy::Always)
        .execute(&graph, &registry, false, "run");
    assert_eq!(report.executed, ids(&[1, 2]));
    assert_eq!(*runner.calls.lock().unwrap(), ids(&[1, 2]));
}

#[test]
fn conflict_pair_runs_each_side_once() {
    let engine = Arc::new(seeded_engine("conflict"));
    let graph = RelationshipLoader::new().load(engine.as_ref()).unwrap();
    let registry = RuleRegistry::load(engine.as_ref(), true).unwrap();
    let runner = SqliteRuleRunner::new(engine.writer(), Duration::from_secs(5));

    let report = BfsExecutor::new(Arc::new(runner), engine.clone(), CascadePolicy::CriticalOnly)
        .execute(&graph, &registry, true, "conflict-run");
    assert_eq!(report.attempts(RuleId(5)), 1);
    assert_eq!(report.executed, ids(&[5, 9]));
}

#[test]
fn composite_is_attempted_when_one_reference_passes() {
    let engine = Arc::new(seeded_engine("composite"));
    let graph = RelationshipLoader::new().load(engine.as_ref()).unwrap();
    let registry = RuleRegistry::load(engine.as_ref(), true).unwrap();
    let runner = SqliteRuleRunner::new(engine.writer(), Duration::from_secs(5));

    let report = BfsExecutor::new(Arc::new(runner), engine.clone(), CascadePolicy::CriticalOnly)
        .execute(&graph, &registry, true, "composite-run");
    assert_eq!(report.executed, ids(&[10, 30]));
    assert_eq!(report.skipped, set(&[20]));
    assert_eq!(report.attempts(RuleId(30)), 1);
}

#[test]
fn chain_scenario_with_real_runner() {
    let engine = Arc::new(seeded_engine("chain_abc"));
    let graph = RelationshipLoader::new().load(engine.as_ref()).unwrap();
    let registry = RuleRegistry::load(engine.as_ref(), true).unwrap();
    let runner = SqliteRuleRunner::new(engine.writer(), Duration::from_secs(5));

    let report = BfsExecutor::new(Arc::new(runner), engine.clone(), CascadePolicy::CriticalOnly)
        .execute(&graph, &registry, false, "chain-run");
    assert!(report.executed.is_empty());
    assert_eq!(report.skipped, set(&[1, 2, 3]));
}

#[test]
fn every_attempt_is_logged() {
    let engine = Arc::new(seeded_engine("composite"));
    let graph = RelationshipLoader::new().load(engine.as_ref()).unwrap();
    let registry = RuleRegistry::load(engine.as_ref(), true).unwrap();
    let runner = SqliteRuleRunner::new(engine.writer(), Duration::from_secs(5));

    let report = BfsExecutor::new(Arc::new(runner), engine.clone(), CascadePolicy::CriticalOnly)
        .execute(&graph, &registry, true, "logged-run");

    let logs = engine.execution_logs_for_run("logged-run").unwrap();
    assert_eq!(logs.len(), report.results.len());
    let logged: Vec<(RuleId, bool)> = logs.iter().map(|l| (l.rule_id, l.pass)).collect();
    assert_eq!(
        logged,
        vec![(RuleId(10), true), (RuleId(20), false), (RuleId(30), true)]
    );
    assert!(logs.iter().all(|l| l.dry_run));
}

#[test]
fn inactive_rules_are_not_run() {
    let engine = StorageEngine::open_in_memory().unwrap();
    engine.insert_rule(&rule(1, None)).unwrap();
    engine
        .insert_rule(&RuleBuilder::new(2).parent(1).inactive().build())
        .unwrap();

    let graph = RelationshipLoader::new().load(&engine).unwrap();
    let registry = RuleRegistry::load(&engine, true).unwrap();
    assert!(!registry.contains(RuleId(2)));

    let report = executor(ScriptedRunner::default(), CascadePolicy::CriticalOnly)
        .execute(&graph, &registry, false, "run");
    assert_eq!(report.executed, ids(&[1]));
    assert_eq!(report.skipped, set(&[2]));

    let all = RuleRegistry::load(&engine, false).unwrap();
    assert_eq!(all.len(), 2);
}

/// Allows a fixed number of beats, then reports the lease as lost.
struct CountedHeartbeat {
    allowed: usize,
    beats: Mutex<Vec<String>>,
}

impl RunHeartbeat for CountedHeartbeat {
    fn beat(&self, run_id: &str) -> BrmResult<()> {
        let mut beats = self.beats.lock().unwrap();
        beats.push(run_id.to_string());
        if beats.len() > self.allowed {
            return Err(LockError::LeaseLost {
                lease: "bfs-run".to_string(),
                holder: "intruder".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

#[test]
fn heartbeat_runs_before_each_rule() {
    let rules = vec![rule(1, None), rule(2, Some(1)), rule(3, Some(2))];
    let graph = graph_of(&rules, &[]);
    let registry = RuleRegistry::from_rules(rules);
    let heartbeat = CountedHeartbeat {
        allowed: usize::MAX,
        beats: Mutex::new(Vec::new()),
    };

    let report = executor(ScriptedRunner::default(), CascadePolicy::CriticalOnly)
        .execute_with_heartbeat(&graph, &registry, true, "run-7", &heartbeat)
        .unwrap();
    assert_eq!(report.executed, ids(&[1, 2, 3]));
    assert_eq!(*heartbeat.beats.lock().unwrap(), vec!["run-7"; 3]);
}

#[test]
fn lost_heartbeat_stops_the_run() {
    let rules = vec![rule(1, None), rule(2, Some(1)), rule(3, Some(2))];
    let graph = graph_of(&rules, &[]);
    let registry = RuleRegistry::from_rules(rules);
    let heartbeat = CountedHeartbeat {
        allowed: 1,
        beats: Mutex::new(Vec::new()),
    };
    let runner = Arc::new(ScriptedRunner::default());
    let exec = BfsExecutor::new(runner.clone(), Arc::new(BrokenLog), CascadePolicy::CriticalOnly);

    let err = exec
        .execute_with_heartbeat(&graph, &registry, true, "run", &heartbeat)
        .unwrap_err();
    assert!(matches!(err, BrmError::Lock(LockError::LeaseLost { .. })));
    assert_eq!(*runner.calls.lock().unwrap(), ids(&[1]));
}
