use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity of a rule. Composite expressions refer to rules as `Rule<id>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(pub i64);

impl RuleId {
    pub fn value(self) -> i64 {
        self.0
    }
}

impl From<i64> for RuleId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for RuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether a rule takes part in runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleStatus {
    Active,
    Inactive,
}

/// Outcome of the approval pipeline so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalStatus {
    ApprovalInProgress,
    Approved,
    Rejected,
}

/// Where a rule sits in its definition lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleState {
    Draft,
    UnderApproval,
    Approved,
    Active,
    Inactive,
    Archived,
}

/// What kind of statement a rule runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationType {
    Insert,
    Update,
    Delete,
    Select,
    DecisionTable,
    Other,
}

macro_rules! str_enum {
    ($ty:ty { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            /// Stored column value.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }

            /// Parse from the stored column value.
            pub fn from_str_name(s: &str) -> Option<Self> {
                match s {
                    $($name => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(RuleStatus {
    Active => "ACTIVE",
    Inactive => "INACTIVE",
});

str_enum!(ApprovalStatus {
    ApprovalInProgress => "APPROVAL_IN_PROGRESS",
    Approved => "APPROVED",
    Rejected => "REJECTED",
});

str_enum!(LifecycleState {
    Draft => "DRAFT",
    UnderApproval => "UNDER_APPROVAL",
    Approved => "APPROVED",
    Active => "ACTIVE",
    Inactive => "INACTIVE",
    Archived => "ARCHIVED",
});

str_enum!(OperationType {
    Insert => "INSERT",
    Update => "UPDATE",
    Delete => "DELETE",
    Select => "SELECT",
    DecisionTable => "DECISION_TABLE",
    Other => "OTHER",
});

impl OperationType {
    /// Classify a rule from its SQL text.
    ///
    /// Blank SQL with a decision table reference is a decision table rule;
    /// otherwise the leading keyword decides.
    pub fn detect(sql_text: &str, decision_table_id: Option<i64>) -> Self {
        let trimmed = sql_text.trim();
        if trimmed.is_empty() && decision_table_id.is_some() {
            return Self::DecisionTable;
        }
        let upper = trimmed.to_ascii_uppercase();
        if upper.starts_with("INSERT") {
            Self::Insert
        } else if upper.starts_with("UPDATE") {
            Self::Update
        } else if upper.starts_with("DELETE") {
            Self::Delete
        } else if upper.starts_with("SELECT") {
            Self::Select
        } else {
            Self::Other
        }
    }
}

/// A stored business rule, decoded once at the storage boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: RuleId,
    pub parent_id: Option<RuleId>,
    pub name: String,
    pub description: String,
    pub critical: bool,
    pub is_global: bool,
    pub owner_group: Option<String>,
    pub status: RuleStatus,
    pub approval_status: ApprovalStatus,
    pub lifecycle_state: LifecycleState,
    pub sql_text: String,
    pub operation_type: OperationType,
    pub decision_table_id: Option<i64>,
    pub version: i64,
    pub created_by: String,
    pub updated_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Rule {
    /// A failure of this rule suppresses everything reachable from it.
    pub fn cascades_on_failure(&self) -> bool {
        self.critical || self.is_global
    }

    pub fn is_active(&self) -> bool {
        self.status == RuleStatus::Active
    }
}

/// Caller-supplied fields for a new rule. Identity, state, and version are
/// assigned on insert.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewRule {
    pub parent_id: Option<RuleId>,
    pub name: String,
    pub description: String,
    pub critical: bool,
    pub is_global: bool,
    pub owner_group: Option<String>,
    pub sql_text: String,
    pub decision_table_id: Option<i64>,
}

/// Editable fields on update. `None` keeps the current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleChanges {
    pub parent_id: Option<Option<RuleId>>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub critical: Option<bool>,
    pub is_global: Option<bool>,
    pub owner_group: Option<Option<String>>,
    pub sql_text: Option<String>,
    pub decision_table_id: Option<Option<i64>>,
}
