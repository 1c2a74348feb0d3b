use chrono::{DateTime, Utc};

use crate::errors::BrmResult;
use crate::models::{ApprovalStage, RuleId};

/// Approval rows and group membership.
pub trait IApprovalStorage: Send + Sync {
    /// Atomically drop every approval row for the rule and insert `stages`.
    fn replace_pipeline(&self, rule_id: RuleId, stages: &[ApprovalStage]) -> BrmResult<()>;
    /// Ordered by stage, then username.
    fn approvals_for_rule(&self, rule_id: RuleId) -> BrmResult<Vec<ApprovalStage>>;
    /// Mark one pending row approved. Returns false when no pending row matched.
    fn mark_approved(
        &self,
        rule_id: RuleId,
        stage: u32,
        username: &str,
        at: DateTime<Utc>,
    ) -> BrmResult<bool>;

    fn approvers_for_group(&self, group: &str) -> BrmResult<Vec<String>>;
    fn add_group_approver(&self, group: &str, username: &str) -> BrmResult<()>;
}
