use super::{LockError, StorageError};

/// Convenience alias used throughout the workspace.
pub type BrmResult<T> = Result<T, BrmError>;

/// Top-level error for every BRM operation.
#[derive(Debug, thiserror::Error)]
pub enum BrmError {
    #[error("rule not found: {id}")]
    RuleNotFound { id: i64 },

    #[error("rule {rule_id} is not in a valid state: {reason}")]
    InvalidState { rule_id: i64, reason: String },

    #[error("data validation failed: {}", failures.join("; "))]
    ValidationFailed { failures: Vec<String> },

    #[error("user {username} has no pending approval for rule {rule_id} in the current stage")]
    NotAnApprover { rule_id: i64, username: String },

    #[error("lock error: {0}")]
    Lock(#[from] LockError),

    #[error("storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("concurrency error: {0}")]
    ConcurrencyError(String),
}

impl BrmError {
    /// Whether this error is a lock conflict (as opposed to not-found or bad state).
    pub fn is_lock_conflict(&self) -> bool {
        matches!(
            self,
            BrmError::Lock(LockError::Conflict { .. }) | BrmError::Lock(LockError::NotHolder { .. })
        )
    }
}
