//! Group ordering for approval stages.

use std::collections::{HashMap, HashSet};

use brm_core::config::ApprovalConfig;
use brm_core::models::{Rule, RuleId};

/// Distinct owner groups over `related`, in the order they are first met.
/// IDs with no rule record, and rules without an owner, contribute nothing.
pub fn impacted_groups(related: &[RuleId], rules: &HashMap<RuleId, Rule>) -> Vec<String> {
    let mut seen = HashSet::new();
    related
        .iter()
        .filter_map(|id| rules.get(id)?.owner_group.as_deref())
        .filter(|group| !group.is_empty())
        .filter(|group| seen.insert(group.to_string()))
        .map(str::to_string)
        .collect()
}

/// Stage groups in order: the leading group, impacted priority groups in
/// configured order, remaining impacted groups in encounter order, then the
/// final group. Each group appears once.
pub fn stage_sequence(impacted: &[String], config: &ApprovalConfig) -> Vec<String> {
    let mut sequence = vec![config.leading_group.clone()];

    for group in &config.priority_groups {
        if impacted.contains(group) && !sequence.contains(group) {
            sequence.push(group.clone());
        }
    }
    for group in impacted {
        if *group != config.final_group && !sequence.contains(group) {
            sequence.push(group.clone());
        }
    }
    if !sequence.contains(&config.final_group) {
        sequence.push(config.final_group.clone());
    }
    sequence
}
