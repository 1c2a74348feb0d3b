//! StorageEngine: owns ConnectionPool, implements every storage trait the
//! rule manager consumes, and runs migrations on open.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use brm_core::config::StorageConfig;
use brm_core::errors::BrmResult;
use brm_core::models::{
    AcquireOutcome, ApprovalStage, AuditEntry, CompositeRule, DataValidation, ExecutionLogEntry,
    GlobalCriticalLink, LeaseRecord, LockRecord, Rule, RuleConflict, RuleId, TableReference,
};
use brm_core::traits::{
    IApprovalStorage, IAuditStorage, IExecutionLogStorage, ILockStorage, IRuleStorage,
    IValidationStorage, ReleaseOutcome,
};

use crate::audit::AuditLogger;
use crate::migrations;
use crate::pool::{ConnectionPool, WriteConnection};
use crate::queries::{
    approval_ops, audit_ops, execution_log_ops, lease_ops, lock_ops, relationship_ops, rule_crud,
    validation_ops,
};

/// The main storage engine. Owns the connection pool and provides the
/// full rule, approval, lock, log, validation, and audit interfaces.
pub struct StorageEngine {
    pool: ConnectionPool,
    /// When true, use the read pool for read operations (file-backed mode).
    /// When false, route all reads through the writer (in-memory mode,
    /// because in-memory read pool connections are isolated databases).
    use_read_pool: bool,
}

impl StorageEngine {
    /// Open a storage engine backed by a file on disk with default settings.
    pub fn open(path: &Path) -> BrmResult<Self> {
        let config = StorageConfig {
            db_path: path.to_string_lossy().into_owned(),
            ..StorageConfig::default()
        };
        Self::open_with_config(&config)
    }

    /// Open the database named in the storage config.
    pub fn open_with_config(config: &StorageConfig) -> BrmResult<Self> {
        let pool = ConnectionPool::open(
            Path::new(&config.db_path),
            config.read_pool_size,
            config.busy_timeout_ms,
        )?;
        let engine = Self {
            pool,
            use_read_pool: true,
        };
        engine.initialize()?;
        Ok(engine)
    }

    /// Open an in-memory storage engine (for testing).
    pub fn open_in_memory() -> BrmResult<Self> {
        let pool = ConnectionPool::open_in_memory()?;
        let engine = Self {
            pool,
            use_read_pool: false,
        };
        engine.initialize()?;
        Ok(engine)
    }

    fn initialize(&self) -> BrmResult<()> {
        self.pool
            .writer
            .with_conn_sync(migrations::run_migrations)
    }

    /// Get a reference to the connection pool (for advanced operations).
    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    /// Shared handle to the write connection. Rule SQL runs here.
    pub fn writer(&self) -> Arc<WriteConnection> {
        Arc::clone(&self.pool.writer)
    }

    /// Execute a read-only query on the best available connection.
    fn with_reader<F, T>(&self, f: F) -> BrmResult<T>
    where
        F: FnOnce(&rusqlite::Connection) -> BrmResult<T>,
    {
        if self.use_read_pool {
            self.pool.readers.with_conn(f)
        } else {
            self.pool.writer.with_conn_sync(f)
        }
    }

    fn with_writer<F, T>(&self, f: F) -> BrmResult<T>
    where
        F: FnOnce(&rusqlite::Connection) -> BrmResult<T>,
    {
        self.pool.writer.with_conn_sync(f)
    }

    /// Enable or disable a data validation.
    pub fn set_validation_enabled(&self, id: i64, enabled: bool) -> BrmResult<()> {
        self.with_writer(|conn| validation_ops::set_validation_enabled(conn, id, enabled))
    }
}

impl IRuleStorage for StorageEngine {
    fn insert_rule(&self, rule: &Rule) -> BrmResult<()> {
        self.with_writer(|conn| rule_crud::insert_rule(conn, rule))
    }

    fn insert_new_rule(&self, rule: &Rule) -> BrmResult<RuleId> {
        self.with_writer(|conn| rule_crud::insert_new_rule(conn, rule))
    }

    fn get_rule(&self, id: RuleId) -> BrmResult<Option<Rule>> {
        self.with_reader(|conn| rule_crud::get_rule(conn, id))
    }

    fn update_rule(&self, rule: &Rule) -> BrmResult<()> {
        self.with_writer(|conn| rule_crud::update_rule(conn, rule))
    }

    fn delete_rule(&self, id: RuleId) -> BrmResult<()> {
        self.with_writer(|conn| rule_crud::delete_rule(conn, id))
    }

    fn list_rules(&self) -> BrmResult<Vec<Rule>> {
        self.with_reader(rule_crud::list_rules)
    }

    fn children_of(&self, id: RuleId) -> BrmResult<Vec<Rule>> {
        self.with_reader(|conn| rule_crud::children_of(conn, id))
    }

    fn global_critical_links(&self) -> BrmResult<Vec<GlobalCriticalLink>> {
        self.with_reader(relationship_ops::global_critical_links)
    }

    fn add_global_critical_link(&self, link: &GlobalCriticalLink) -> BrmResult<()> {
        self.with_writer(|conn| relationship_ops::add_global_critical_link(conn, link))
    }

    fn conflicts(&self) -> BrmResult<Vec<RuleConflict>> {
        self.with_reader(relationship_ops::conflicts)
    }

    fn add_conflict(&self, conflict: &RuleConflict) -> BrmResult<()> {
        self.with_writer(|conn| relationship_ops::add_conflict(conn, conflict))
    }

    fn composite_rules(&self) -> BrmResult<Vec<CompositeRule>> {
        self.with_reader(relationship_ops::composite_rules)
    }

    fn upsert_composite_rule(&self, composite: &CompositeRule) -> BrmResult<()> {
        self.with_writer(|conn| relationship_ops::upsert_composite_rule(conn, composite))
    }

    fn replace_table_dependencies(&self, id: RuleId, tables: &[TableReference]) -> BrmResult<()> {
        self.with_writer(|conn| relationship_ops::replace_table_dependencies(conn, id, tables))
    }

    fn table_dependencies(&self, id: RuleId) -> BrmResult<Vec<TableReference>> {
        self.with_reader(|conn| relationship_ops::table_dependencies(conn, id))
    }
}

impl IApprovalStorage for StorageEngine {
    fn replace_pipeline(&self, rule_id: RuleId, stages: &[ApprovalStage]) -> BrmResult<()> {
        self.with_writer(|conn| approval_ops::replace_pipeline(conn, rule_id, stages))
    }

    fn approvals_for_rule(&self, rule_id: RuleId) -> BrmResult<Vec<ApprovalStage>> {
        self.with_reader(|conn| approval_ops::approvals_for_rule(conn, rule_id))
    }

    fn mark_approved(
        &self,
        rule_id: RuleId,
        stage: u32,
        username: &str,
        at: DateTime<Utc>,
    ) -> BrmResult<bool> {
        self.with_writer(|conn| approval_ops::mark_approved(conn, rule_id, stage, username, at))
    }

    fn approvers_for_group(&self, group: &str) -> BrmResult<Vec<String>> {
        self.with_reader(|conn| approval_ops::approvers_for_group(conn, group))
    }

    fn add_group_approver(&self, group: &str, username: &str) -> BrmResult<()> {
        self.with_writer(|conn| approval_ops::add_group_approver(conn, group, username))
    }
}

// Lock and lease reads go through the writer so a caller never observes a
// state older than its own last acquisition.
impl ILockStorage for StorageEngine {
    fn try_acquire_lock(
        &self,
        rule_id: RuleId,
        holder: &str,
        now: DateTime<Utc>,
        ttl: Duration,
        force: bool,
    ) -> BrmResult<AcquireOutcome> {
        self.with_writer(|conn| lock_ops::try_acquire_lock(conn, rule_id, holder, now, ttl, force))
    }

    fn release_lock(
        &self,
        rule_id: RuleId,
        holder: &str,
        force: bool,
    ) -> BrmResult<ReleaseOutcome> {
        self.with_writer(|conn| lock_ops::release_lock(conn, rule_id, holder, force))
    }

    fn current_lock(&self, rule_id: RuleId) -> BrmResult<Option<LockRecord>> {
        self.with_writer(|conn| lock_ops::current_lock(conn, rule_id))
    }

    fn try_acquire_lease(
        &self,
        name: &str,
        holder: &str,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> BrmResult<AcquireOutcome> {
        self.with_writer(|conn| lease_ops::try_acquire_lease(conn, name, holder, now, ttl))
    }

    fn release_lease(&self, name: &str, holder: &str) -> BrmResult<bool> {
        self.with_writer(|conn| lease_ops::release_lease(conn, name, holder))
    }

    fn current_lease(&self, name: &str) -> BrmResult<Option<LeaseRecord>> {
        self.with_writer(|conn| lease_ops::current_lease(conn, name))
    }
}

impl IExecutionLogStorage for StorageEngine {
    fn append_execution_log(&self, entry: &ExecutionLogEntry) -> BrmResult<()> {
        self.with_writer(|conn| execution_log_ops::append_execution_log(conn, entry))
    }

    fn execution_logs_for_rule(&self, rule_id: RuleId) -> BrmResult<Vec<ExecutionLogEntry>> {
        self.with_reader(|conn| execution_log_ops::logs_for_rule(conn, rule_id))
    }

    fn execution_logs_for_run(&self, run_id: &str) -> BrmResult<Vec<ExecutionLogEntry>> {
        self.with_reader(|conn| execution_log_ops::logs_for_run(conn, run_id))
    }
}

impl IValidationStorage for StorageEngine {
    fn list_data_validations(&self) -> BrmResult<Vec<DataValidation>> {
        self.with_reader(validation_ops::list_data_validations)
    }

    fn add_data_validation(&self, description: &str, check_sql: &str) -> BrmResult<i64> {
        self.with_writer(|conn| validation_ops::add_data_validation(conn, description, check_sql))
    }
}

impl IAuditStorage for StorageEngine {
    fn record_audit(&self, entry: &AuditEntry) -> BrmResult<()> {
        self.with_writer(|conn| AuditLogger::log(conn, entry))
    }

    fn audit_entries_for(&self, table_name: &str, record_id: &str) -> BrmResult<Vec<AuditEntry>> {
        self.with_reader(|conn| audit_ops::query_by_record(conn, table_name, record_id))
    }
}
