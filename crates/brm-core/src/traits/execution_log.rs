use crate::errors::BrmResult;
use crate::models::{DataValidation, ExecutionLogEntry, RuleId};

/// Append-only execution log.
pub trait IExecutionLogStorage: Send + Sync {
    fn append_execution_log(&self, entry: &ExecutionLogEntry) -> BrmResult<()>;
    fn execution_logs_for_rule(&self, rule_id: RuleId) -> BrmResult<Vec<ExecutionLogEntry>>;
    fn execution_logs_for_run(&self, run_id: &str) -> BrmResult<Vec<ExecutionLogEntry>>;
}

/// Global data checks that gate a run.
pub trait IValidationStorage: Send + Sync {
    fn list_data_validations(&self) -> BrmResult<Vec<DataValidation>>;
    fn add_data_validation(&self, description: &str, check_sql: &str) -> BrmResult<i64>;
}
