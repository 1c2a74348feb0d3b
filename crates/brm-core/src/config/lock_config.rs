use serde::{Deserialize, Serialize};

use super::defaults;

/// Rule edit-lock configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LockConfig {
    /// Locks older than this are expired on the next acquisition attempt.
    pub ttl_minutes: i64,
}

impl LockConfig {
    pub fn ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.ttl_minutes)
    }
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            ttl_minutes: defaults::DEFAULT_LOCK_TTL_MINUTES,
        }
    }
}
