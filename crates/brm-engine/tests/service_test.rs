//! Full runs through the service: lease exclusion, validation gate, commit
//! and rollback.

use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};

use brm_core::config::{CascadePolicy, EngineConfig};
use brm_core::constants::RUN_LEASE_NAME;
use brm_core::errors::{BrmError, LockError};
use brm_core::models::{AcquireOutcome, Rule, RuleId};
use brm_core::traits::{
    DecisionEvaluator, IExecutionLogStorage, ILockStorage, IRuleStorage, IValidationStorage,
};
use brm_engine::{RuleRunService, RunLease};
use brm_storage::StorageEngine;
use test_fixtures::{seeded_engine, RuleBuilder};

fn service(engine: Arc<StorageEngine>) -> RuleRunService {
    RuleRunService::new(engine, EngineConfig::default())
}

fn create_ledger(engine: &StorageEngine) {
    engine
        .pool()
        .writer
        .with_conn_sync(|conn| {
            conn.execute_batch("CREATE TABLE ledger (entry INTEGER);").unwrap();
            Ok(())
        })
        .unwrap();
}

fn ledger_rows(engine: &StorageEngine) -> i64 {
    engine
        .pool()
        .writer
        .with_conn_sync(|conn| {
            Ok(conn
                .query_row("SELECT COUNT(*) FROM ledger", [], |r| r.get(0))
                .unwrap())
        })
        .unwrap()
}

#[test]
fn run_executes_and_releases_lease() {
    let engine = Arc::new(seeded_engine("composite"));
    let report = service(engine.clone()).run(true).unwrap();

    assert_eq!(report.executed, vec![RuleId(10), RuleId(30)]);
    assert!(report.dry_run);
    assert!(engine.current_lease(RUN_LEASE_NAME).unwrap().is_none());
    assert_eq!(
        engine.execution_logs_for_run(&report.run_id).unwrap().len(),
        3
    );
}

#[test]
fn concurrent_run_is_rejected() {
    let engine = Arc::new(seeded_engine("composite"));
    let held = engine
        .try_acquire_lease(RUN_LEASE_NAME, "other-run", Utc::now(), Duration::hours(1))
        .unwrap();
    assert_eq!(held, AcquireOutcome::Acquired);

    let err = service(engine.clone()).run(true).unwrap_err();
    match err {
        BrmError::Lock(LockError::RunInProgress { holder, .. }) => assert_eq!(holder, "other-run"),
        other => panic!("expected RunInProgress, got {other}"),
    }
    assert!(engine.execution_logs_for_rule(RuleId(10)).unwrap().is_empty());
    assert_eq!(
        engine.current_lease(RUN_LEASE_NAME).unwrap().unwrap().holder,
        "other-run"
    );
}

#[test]
fn failed_validation_aborts_before_any_rule() {
    let engine = Arc::new(seeded_engine("composite"));
    engine
        .add_data_validation("reference data loaded", "SELECT 0")
        .unwrap();
    engine
        .add_data_validation("schema present", "SELECT 1")
        .unwrap();

    let err = service(engine.clone()).run(false).unwrap_err();
    match err {
        BrmError::ValidationFailed { failures } => {
            assert_eq!(failures.len(), 1);
            assert!(failures[0].starts_with("reference data loaded"));
        }
        other => panic!("expected ValidationFailed, got {other}"),
    }
    assert!(engine.execution_logs_for_rule(RuleId(10)).unwrap().is_empty());
    assert!(engine.current_lease(RUN_LEASE_NAME).unwrap().is_none());
}

#[test]
fn disabled_validation_is_ignored() {
    let engine = Arc::new(seeded_engine("conflict"));
    let id = engine.add_data_validation("stale check", "SELECT 0").unwrap();
    engine.set_validation_enabled(id, false).unwrap();
    assert!(service(engine).run(true).is_ok());
}

#[test]
fn live_run_commits_and_dry_run_does_not() {
    let engine = Arc::new(StorageEngine::open_in_memory().unwrap());
    create_ledger(&engine);
    engine
        .insert_rule(&RuleBuilder::new(1).sql("INSERT INTO ledger (entry) VALUES (1)").build())
        .unwrap();

    let svc = service(engine.clone());
    svc.run(true).unwrap();
    assert_eq!(ledger_rows(&engine), 0);

    let report = svc.run(false).unwrap();
    assert_eq!(report.executed, vec![RuleId(1)]);
    assert_eq!(ledger_rows(&engine), 1);
}

#[test]
fn always_policy_is_honored() {
    let engine = Arc::new(StorageEngine::open_in_memory().unwrap());
    engine.insert_rule(&RuleBuilder::new(1).failing().build()).unwrap();
    engine.insert_rule(&RuleBuilder::new(2).parent(1).build()).unwrap();

    let critical_only = service(engine.clone()).run(true).unwrap();
    assert!(!critical_only.was_skipped(RuleId(2)));

    let config = EngineConfig {
        cascade_policy: CascadePolicy::Always,
        ..EngineConfig::default()
    };
    let always = RuleRunService::new(engine, config).run(true).unwrap();
    assert!(always.was_skipped(RuleId(2)));
}

#[test]
fn expired_lease_is_lost_on_refresh() {
    let engine = Arc::new(StorageEngine::open_in_memory().unwrap());
    let lease = RunLease::acquire(engine.clone(), RUN_LEASE_NAME, "run-a", Duration::hours(1))
        .unwrap();
    lease.refresh().unwrap();

    // Age run-a's lease past its TTL and let another run reclaim it.
    engine
        .pool()
        .writer
        .with_conn_sync(|conn| {
            conn.execute(
                "UPDATE run_leases SET acquired_at = '2000-01-01T00:00:00.000Z'",
                [],
            )
            .unwrap();
            Ok(())
        })
        .unwrap();
    let taken = engine
        .try_acquire_lease(RUN_LEASE_NAME, "run-b", Utc::now(), Duration::hours(1))
        .unwrap();
    assert_eq!(taken, AcquireOutcome::Acquired);

    match lease.refresh().unwrap_err() {
        BrmError::Lock(LockError::LeaseLost { holder, .. }) => assert_eq!(holder, "run-b"),
        other => panic!("expected LeaseLost, got {other}"),
    }
}

/// Sleeps on each decision-table rule, then records whether a competing run
/// could take the lease at that moment.
struct SlowEvaluator {
    engine: Arc<StorageEngine>,
    pause: StdDuration,
    intruder_outcomes: Mutex<Vec<AcquireOutcome>>,
}

impl DecisionEvaluator for SlowEvaluator {
    fn evaluate(&self, _rule: &Rule) -> (bool, String) {
        std::thread::sleep(self.pause);
        let outcome = self
            .engine
            .try_acquire_lease(RUN_LEASE_NAME, "intruder", Utc::now(), Duration::seconds(1))
            .unwrap();
        self.intruder_outcomes.lock().unwrap().push(outcome);
        (true, "evaluated".to_string())
    }
}

fn slow_chain(pause_ms: u64) -> (Arc<StorageEngine>, Arc<SlowEvaluator>) {
    let engine = Arc::new(StorageEngine::open_in_memory().unwrap());
    for (id, parent) in [(1, None), (2, Some(1)), (3, Some(2))] {
        let mut builder = RuleBuilder::new(id).decision_table(id);
        if let Some(p) = parent {
            builder = builder.parent(p);
        }
        engine.insert_rule(&builder.build()).unwrap();
    }
    let evaluator = Arc::new(SlowEvaluator {
        engine: engine.clone(),
        pause: StdDuration::from_millis(pause_ms),
        intruder_outcomes: Mutex::new(Vec::new()),
    });
    (engine, evaluator)
}

fn short_lease_config() -> EngineConfig {
    EngineConfig {
        run_lease_ttl_secs: 1,
        ..EngineConfig::default()
    }
}

#[test]
fn lease_is_refreshed_between_rules() {
    // Each rule takes 0.7s, so the run as a whole outlives the 1s TTL, but
    // no single gap between refreshes does.
    let (engine, evaluator) = slow_chain(700);
    let report = RuleRunService::new(engine.clone(), short_lease_config())
        .with_evaluator(evaluator.clone())
        .run(true)
        .unwrap();

    assert_eq!(report.executed, vec![RuleId(1), RuleId(2), RuleId(3)]);
    let outcomes = evaluator.intruder_outcomes.lock().unwrap();
    assert_eq!(outcomes.len(), 3);
    assert!(outcomes
        .iter()
        .all(|o| matches!(o, AcquireOutcome::Held(holder) if *holder == report.run_id)));
    assert!(engine.current_lease(RUN_LEASE_NAME).unwrap().is_none());
}

#[test]
fn run_stops_when_its_lease_is_taken() {
    // A 1.2s rule outlives the 1s TTL; the intruder claims the lease and the
    // next refresh fails.
    let (engine, evaluator) = slow_chain(1_200);
    let err = RuleRunService::new(engine.clone(), short_lease_config())
        .with_evaluator(evaluator.clone())
        .run(true)
        .unwrap_err();

    match err {
        BrmError::Lock(LockError::LeaseLost { holder, .. }) => assert_eq!(holder, "intruder"),
        other => panic!("expected LeaseLost, got {other}"),
    }
    assert_eq!(evaluator.intruder_outcomes.lock().unwrap().len(), 1);
    assert_eq!(
        engine.current_lease(RUN_LEASE_NAME).unwrap().unwrap().holder,
        "intruder"
    );
}
