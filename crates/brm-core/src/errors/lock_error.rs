/// Edit-lock and run-lease errors.
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    /// A live lock is held by someone else and `force` was not set.
    #[error("rule {rule_id} is locked by {holder}")]
    Conflict { rule_id: i64, holder: String },

    /// Unlock attempted by a user who does not hold the lock.
    #[error("cannot unlock rule {rule_id}; it is locked by {holder}")]
    NotHolder { rule_id: i64, holder: String },

    /// Another BFS run currently holds the run lease.
    #[error("a run is already in progress (lease {lease} held by {holder})")]
    RunInProgress { lease: String, holder: String },

    /// The run's lease expired and another holder claimed it mid-run.
    #[error("run lease {lease} lost to {holder}")]
    LeaseLost { lease: String, holder: String },
}
