//! Moving a rule through its approval pipeline.

use chrono::{DateTime, Utc};

use brm_core::errors::{BrmError, BrmResult};
use brm_core::models::{ApprovalStatus, LifecycleState, RuleId};
use brm_core::traits::{IApprovalStorage, IRuleStorage};

/// Where the pipeline stands after an approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalProgress {
    /// Rows are still pending; carries the lowest pending stage.
    Pending { stage: u32 },
    /// Every row is approved and the rule is now APPROVED.
    Completed,
}

/// Approve `username`'s pending row in the current stage (the lowest stage
/// with pending rows). When nothing is left pending the rule becomes
/// APPROVED.
pub fn record_approval(
    rules: &dyn IRuleStorage,
    approvals: &dyn IApprovalStorage,
    rule_id: RuleId,
    username: &str,
    now: DateTime<Utc>,
) -> BrmResult<ApprovalProgress> {
    let mut rule = rules
        .get_rule(rule_id)?
        .ok_or(BrmError::RuleNotFound { id: rule_id.value() })?;
    if rule.approval_status != ApprovalStatus::ApprovalInProgress {
        return Err(BrmError::InvalidState {
            rule_id: rule_id.value(),
            reason: format!("approval status is {}", rule.approval_status),
        });
    }

    let rows = approvals.approvals_for_rule(rule_id)?;
    let not_an_approver = || BrmError::NotAnApprover {
        rule_id: rule_id.value(),
        username: username.to_string(),
    };
    let current = rows
        .iter()
        .filter(|r| !r.approved)
        .map(|r| r.stage)
        .min()
        .ok_or_else(not_an_approver)?;

    if !approvals.mark_approved(rule_id, current, username, now)? {
        return Err(not_an_approver());
    }
    tracing::info!(rule_id = %rule_id, username, stage = current, "approval recorded");

    let next_pending = approvals
        .approvals_for_rule(rule_id)?
        .iter()
        .filter(|r| !r.approved)
        .map(|r| r.stage)
        .min();

    match next_pending {
        Some(stage) => Ok(ApprovalProgress::Pending { stage }),
        None => {
            rule.approval_status = ApprovalStatus::Approved;
            rule.lifecycle_state = LifecycleState::Approved;
            rule.updated_by = Some(username.to_string());
            rule.updated_at = now;
            rules.update_rule(&rule)?;
            tracing::info!(rule_id = %rule_id, "approval pipeline completed");
            Ok(ApprovalProgress::Completed)
        }
    }
}

/// Reject the rule. Only a user with a pending row in the current stage may
/// reject.
pub fn reject(
    rules: &dyn IRuleStorage,
    approvals: &dyn IApprovalStorage,
    rule_id: RuleId,
    username: &str,
    now: DateTime<Utc>,
) -> BrmResult<()> {
    let mut rule = rules
        .get_rule(rule_id)?
        .ok_or(BrmError::RuleNotFound { id: rule_id.value() })?;
    if rule.approval_status != ApprovalStatus::ApprovalInProgress {
        return Err(BrmError::InvalidState {
            rule_id: rule_id.value(),
            reason: format!("approval status is {}", rule.approval_status),
        });
    }

    let rows = approvals.approvals_for_rule(rule_id)?;
    let current = rows.iter().filter(|r| !r.approved).map(|r| r.stage).min();
    let may_reject = rows
        .iter()
        .any(|r| Some(r.stage) == current && !r.approved && r.username == username);
    if !may_reject {
        return Err(BrmError::NotAnApprover {
            rule_id: rule_id.value(),
            username: username.to_string(),
        });
    }

    rule.approval_status = ApprovalStatus::Rejected;
    rule.updated_by = Some(username.to_string());
    rule.updated_at = now;
    rules.update_rule(&rule)?;
    tracing::info!(rule_id = %rule_id, username, "rule rejected");
    Ok(())
}
