//! Global data validations checked before a run starts.

use std::sync::Arc;

use brm_core::errors::{BrmError, BrmResult};
use brm_core::models::DataValidation;
use brm_storage::pool::WriteConnection;

use crate::runner::query::run_query;

/// Runs every enabled validation inside a transaction that is always rolled
/// back. A check passes with no rows or a first column equal to 1.
pub struct SqlDataValidator {
    writer: Arc<WriteConnection>,
}

impl SqlDataValidator {
    pub fn new(writer: Arc<WriteConnection>) -> Self {
        Self { writer }
    }

    /// Descriptions of every failed check, with the reason.
    pub fn failures(&self, checks: &[DataValidation]) -> BrmResult<Vec<String>> {
        self.writer.with_conn_sync(|conn| {
            let tx = conn
                .unchecked_transaction()
                .map_err(|e| BrmError::ConcurrencyError(format!("validation begin: {e}")))?;

            let mut failures = Vec::new();
            for check in checks.iter().filter(|c| c.enabled) {
                match run_query(&tx, &check.check_sql) {
                    Ok(outcome) if outcome.passed() => {
                        tracing::debug!(validation = check.id, "data validation passed");
                    }
                    Ok(outcome) => {
                        failures.push(format!("{}: {}", check.description, outcome.message()))
                    }
                    Err(e) => failures.push(format!("{}: {e}", check.description)),
                }
            }

            let _ = tx.rollback();
            Ok(failures)
        })
    }

    /// Fail with `ValidationFailed` if any enabled check fails.
    pub fn ensure_valid(&self, checks: &[DataValidation]) -> BrmResult<()> {
        let failures = self.failures(checks)?;
        if failures.is_empty() {
            Ok(())
        } else {
            for failure in &failures {
                tracing::warn!(failure = %failure, "data validation failed");
            }
            Err(BrmError::ValidationFailed { failures })
        }
    }
}
