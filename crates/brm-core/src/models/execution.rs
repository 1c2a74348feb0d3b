use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::RuleId;

/// Outcome of running one rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub rule_id: RuleId,
    pub success: bool,
    pub message: String,
    pub record_count: u64,
}

/// A persisted execution-log row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionLogEntry {
    pub rule_id: RuleId,
    pub run_id: String,
    pub pass: bool,
    pub message: String,
    pub record_count: u64,
    pub dry_run: bool,
    pub elapsed_ms: u64,
    pub timestamp: DateTime<Utc>,
}

/// A global data check that must pass before any rule runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataValidation {
    pub id: i64,
    pub description: String,
    /// Passes when it returns no rows or a first column equal to 1.
    pub check_sql: String,
    pub enabled: bool,
}
