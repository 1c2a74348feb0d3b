//! State preconditions for lifecycle transitions.

use brm_core::errors::{BrmError, BrmResult};
use brm_core::models::{ApprovalStatus, Rule, RuleStatus};

fn invalid(rule: &Rule, reason: impl Into<String>) -> BrmError {
    BrmError::InvalidState {
        rule_id: rule.id.value(),
        reason: reason.into(),
    }
}

fn require_approved(rule: &Rule) -> BrmResult<()> {
    if rule.approval_status != ApprovalStatus::Approved {
        return Err(invalid(
            rule,
            format!("approval status is {}, expected APPROVED", rule.approval_status),
        ));
    }
    Ok(())
}

/// Activation needs a fully approved rule whose parent, if any, is active.
pub fn check_activate(rule: &Rule, parent: Option<&Rule>) -> BrmResult<()> {
    require_approved(rule)?;
    match (rule.parent_id, parent) {
        (None, _) => Ok(()),
        (Some(pid), None) => Err(invalid(rule, format!("parent {pid} does not exist"))),
        (Some(pid), Some(p)) if !p.is_active() => {
            Err(invalid(rule, format!("parent {pid} is not active")))
        }
        _ => Ok(()),
    }
}

/// Deactivation needs an approved rule with no active children.
pub fn check_deactivate(rule: &Rule, children: &[Rule]) -> BrmResult<()> {
    require_approved(rule)?;
    let active: Vec<String> = children
        .iter()
        .filter(|c| c.is_active())
        .map(|c| c.id.to_string())
        .collect();
    if !active.is_empty() {
        return Err(invalid(rule, format!("active children: {}", active.join(", "))));
    }
    Ok(())
}

/// Deletion needs an inactive, approved rule with no children at all.
pub fn check_delete(rule: &Rule, children: &[Rule]) -> BrmResult<()> {
    if rule.status != RuleStatus::Inactive {
        return Err(invalid(rule, "rule is still active"));
    }
    require_approved(rule)?;
    if !children.is_empty() {
        return Err(invalid(rule, format!("rule has {} children", children.len())));
    }
    Ok(())
}
