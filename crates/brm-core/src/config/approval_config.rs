use serde::{Deserialize, Serialize};

use super::defaults;
use crate::constants;

/// Approval pipeline shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApprovalConfig {
    /// Always stage 1.
    pub leading_group: String,
    /// Added right after the leading group, in this order, when impacted.
    pub priority_groups: Vec<String>,
    /// Always the last stage.
    pub final_group: String,
    /// Appended to a group name to form its synthetic approver.
    pub default_approver_suffix: String,
}

impl ApprovalConfig {
    /// Username of the placeholder approver for a group with none configured.
    pub fn default_approver(&self, group: &str) -> String {
        format!("{group}{}", self.default_approver_suffix)
    }
}

impl Default for ApprovalConfig {
    fn default() -> Self {
        Self {
            leading_group: constants::LEADING_APPROVAL_GROUP.to_string(),
            priority_groups: defaults::DEFAULT_PRIORITY_GROUPS
                .iter()
                .map(|g| g.to_string())
                .collect(),
            final_group: constants::FINAL_APPROVAL_GROUP.to_string(),
            default_approver_suffix: constants::DEFAULT_APPROVER_SUFFIX.to_string(),
        }
    }
}
