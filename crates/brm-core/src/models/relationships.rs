use serde::{Deserialize, Serialize};

use super::RuleId;

/// Provenance of a graph edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// parent → child.
    ParentChild,
    /// global-critical rule → target.
    GlobalCritical,
    /// Both directions of a conflict pair.
    Conflict,
    /// referenced sub-rule → composite.
    CompositeReference,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ParentChild => "parent_child",
            Self::GlobalCritical => "global_critical",
            Self::Conflict => "conflict",
            Self::CompositeReference => "composite_reference",
        }
    }
}

impl std::fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A global-critical rule that gates a target rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalCriticalLink {
    pub gcr_rule_id: RuleId,
    pub target_rule_id: RuleId,
}

/// Two rules that touch the same data and must not diverge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConflict {
    pub rule_id_1: RuleId,
    pub rule_id_2: RuleId,
    pub priority: i64,
}

/// A composite rule whose logic expression references other rules by text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeRule {
    pub id: RuleId,
    pub logic_expr: String,
}
