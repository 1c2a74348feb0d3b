use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An entry in the append-only audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub action: AuditAction,
    pub table_name: String,
    pub record_id: Option<String>,
    pub actor: String,
    pub old_data: Option<serde_json::Value>,
    pub new_data: Option<serde_json::Value>,
    pub timestamp: DateTime<Utc>,
}

/// Operations tracked in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Insert,
    Update,
    Activate,
    Deactivate,
    Delete,
    Approve,
    Reject,
    ForceLock,
    ForceUnlock,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Activate => "ACTIVATE",
            Self::Deactivate => "DEACTIVATE",
            Self::Delete => "DELETE",
            Self::Approve => "APPROVE",
            Self::Reject => "REJECT",
            Self::ForceLock => "FORCE_LOCK",
            Self::ForceUnlock => "FORCE_UNLOCK",
        }
    }

    pub fn from_str_name(s: &str) -> Option<Self> {
        match s {
            "INSERT" => Some(Self::Insert),
            "UPDATE" => Some(Self::Update),
            "ACTIVATE" => Some(Self::Activate),
            "DEACTIVATE" => Some(Self::Deactivate),
            "DELETE" => Some(Self::Delete),
            "APPROVE" => Some(Self::Approve),
            "REJECT" => Some(Self::Reject),
            "FORCE_LOCK" => Some(Self::ForceLock),
            "FORCE_UNLOCK" => Some(Self::ForceUnlock),
            _ => None,
        }
    }
}
