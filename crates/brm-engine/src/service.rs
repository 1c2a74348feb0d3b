//! One full pass: run lease, validation gate, graph load, BFS execution.

use std::sync::Arc;

use uuid::Uuid;

use brm_core::config::EngineConfig;
use brm_core::constants::RUN_LEASE_NAME;
use brm_core::errors::BrmResult;
use brm_core::traits::{
    DecisionEvaluator, IExecutionLogStorage, IValidationStorage, PassThroughEvaluator,
};
use brm_graph::RelationshipLoader;
use brm_storage::StorageEngine;

use crate::executor::BfsExecutor;
use crate::lease::RunLease;
use crate::observer::{RunObserver, TracingObserver};
use crate::registry::RuleRegistry;
use crate::report::RunReport;
use crate::runner::SqliteRuleRunner;
use crate::validation::SqlDataValidator;

/// Entry point for a complete rule run against one database.
pub struct RuleRunService {
    storage: Arc<StorageEngine>,
    config: EngineConfig,
    loader: RelationshipLoader,
    evaluator: Arc<dyn DecisionEvaluator>,
    observer: Arc<dyn RunObserver>,
}

impl RuleRunService {
    pub fn new(storage: Arc<StorageEngine>, config: EngineConfig) -> Self {
        Self {
            storage,
            config,
            loader: RelationshipLoader::new(),
            evaluator: Arc::new(PassThroughEvaluator),
            observer: Arc::new(TracingObserver),
        }
    }

    pub fn with_evaluator(mut self, evaluator: Arc<dyn DecisionEvaluator>) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn RunObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_loader(mut self, loader: RelationshipLoader) -> Self {
        self.loader = loader;
        self
    }

    /// Run every reachable rule once. Fails with `RunInProgress` while another
    /// run holds the lease, and with `ValidationFailed` before any rule runs
    /// if a data validation fails. The lease is refreshed before each rule;
    /// losing it stops the run with `LeaseLost`. It is released on every path.
    pub fn run(&self, dry_run: bool) -> BrmResult<RunReport> {
        let run_id = Uuid::new_v4().to_string();
        let lease = RunLease::acquire(
            self.storage.clone(),
            RUN_LEASE_NAME,
            &run_id,
            self.config.run_lease_ttl(),
        )?;

        let result = self.run_with_lease(&lease, dry_run);
        lease.release();
        result
    }

    fn run_with_lease(&self, lease: &RunLease, dry_run: bool) -> BrmResult<RunReport> {
        let run_id = lease.holder();
        let span = tracing::info_span!("rule_run", run_id = %run_id, dry_run);
        let _guard = span.enter();

        let checks = self.storage.list_data_validations()?;
        SqlDataValidator::new(self.storage.writer()).ensure_valid(&checks)?;

        let graph = self.loader.load(self.storage.as_ref())?;
        let registry = RuleRegistry::load(self.storage.as_ref(), self.config.only_active_rules)?;

        let runner = SqliteRuleRunner::new(self.storage.writer(), self.config.rule_timeout())
            .with_evaluator(Arc::clone(&self.evaluator));
        let log: Arc<dyn IExecutionLogStorage> = self.storage.clone();
        let executor = BfsExecutor::new(Arc::new(runner), log, self.config.cascade_policy)
            .with_observer(Arc::clone(&self.observer));

        executor.execute_with_heartbeat(&graph, &registry, dry_run, run_id, lease)
    }
}
