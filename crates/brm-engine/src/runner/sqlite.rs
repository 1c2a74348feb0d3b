//! Transactional runner over the shared SQLite write connection.

use std::sync::Arc;
use std::time::Duration;

use rusqlite::Connection;

use brm_core::models::{ExecutionResult, OperationType, Rule};
use brm_core::traits::{DecisionEvaluator, PassThroughEvaluator};
use brm_storage::pool::WriteConnection;

use super::query::run_query;
use super::watchdog::Watchdog;
use super::RuleRunner;

/// Runs each rule's SQL in its own transaction.
///
/// Dry runs and failures roll back; only a successful live run commits.
/// Decision-table rules go to the injected evaluator instead.
pub struct SqliteRuleRunner {
    writer: Arc<WriteConnection>,
    evaluator: Arc<dyn DecisionEvaluator>,
    timeout: Duration,
}

impl SqliteRuleRunner {
    pub fn new(writer: Arc<WriteConnection>, timeout: Duration) -> Self {
        Self {
            writer,
            evaluator: Arc::new(PassThroughEvaluator),
            timeout,
        }
    }

    pub fn with_evaluator(mut self, evaluator: Arc<dyn DecisionEvaluator>) -> Self {
        self.evaluator = evaluator;
        self
    }

    fn run_sql(&self, conn: &Connection, rule: &Rule, dry_run: bool) -> ExecutionResult {
        let failed = |message: String| ExecutionResult {
            rule_id: rule.id,
            success: false,
            message,
            record_count: 0,
        };

        let tx = match conn.unchecked_transaction() {
            Ok(tx) => tx,
            Err(e) => return failed(format!("begin transaction: {e}")),
        };

        let watchdog = (!self.timeout.is_zero())
            .then(|| Watchdog::arm(conn.get_interrupt_handle(), self.timeout));
        let outcome = run_query(&tx, &rule.sql_text);
        let timed_out = watchdog.map(Watchdog::disarm).unwrap_or(false);

        let result = match outcome {
            Ok(outcome) => ExecutionResult {
                rule_id: rule.id,
                success: outcome.passed(),
                message: outcome.message(),
                record_count: outcome.row_count,
            },
            Err(_) if timed_out => failed(format!(
                "timed out after {}s",
                self.timeout.as_secs_f64()
            )),
            Err(e) => failed(e.to_string()),
        };

        if result.success && !dry_run {
            if let Err(e) = tx.commit() {
                return failed(format!("commit: {e}"));
            }
        } else if let Err(e) = tx.rollback() {
            tracing::warn!(rule_id = %rule.id, error = %e, "rollback failed");
        }
        result
    }
}

impl RuleRunner for SqliteRuleRunner {
    fn run(&self, rule: &Rule, dry_run: bool) -> ExecutionResult {
        if rule.operation_type == OperationType::DecisionTable {
            let (success, message) = self.evaluator.evaluate(rule);
            return ExecutionResult {
                rule_id: rule.id,
                success,
                message,
                record_count: 0,
            };
        }

        self.writer
            .with_conn_sync(|conn| Ok(self.run_sql(conn, rule, dry_run)))
            .unwrap_or_else(|e| ExecutionResult {
                rule_id: rule.id,
                success: false,
                message: e.to_string(),
                record_count: 0,
            })
    }
}
