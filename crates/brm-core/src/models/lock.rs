use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::RuleId;

/// Current holder of a rule's edit lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockRecord {
    pub rule_id: RuleId,
    pub locked_by: String,
    pub locked_at: DateTime<Utc>,
}

/// Result of an atomic acquisition attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquireOutcome {
    Acquired,
    /// Held by someone else; carries the current holder.
    Held(String),
}

/// Current holder of a named lease.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaseRecord {
    pub name: String,
    pub holder: String,
    pub acquired_at: DateTime<Utc>,
}
