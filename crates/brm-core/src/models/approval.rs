use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::RuleId;

/// One approver's row in one stage of a rule's pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalStage {
    pub rule_id: RuleId,
    pub group_name: String,
    pub username: String,
    /// 1-based.
    pub stage: u32,
    pub approved: bool,
    pub approved_at: Option<DateTime<Utc>>,
}
