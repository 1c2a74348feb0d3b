use chrono::{DateTime, Duration, Utc};

use crate::errors::BrmResult;
use crate::models::{AcquireOutcome, LeaseRecord, LockRecord, RuleId};

/// Result of a release attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseOutcome {
    Released,
    NotLocked,
    /// Held by someone else and not forced; carries the holder.
    HeldBy(String),
}

/// Rule edit locks and named run leases. Acquisition is a single atomic
/// conditional write; expired entries are purged first in the same transaction.
pub trait ILockStorage: Send + Sync {
    fn try_acquire_lock(
        &self,
        rule_id: RuleId,
        holder: &str,
        now: DateTime<Utc>,
        ttl: Duration,
        force: bool,
    ) -> BrmResult<AcquireOutcome>;
    fn release_lock(&self, rule_id: RuleId, holder: &str, force: bool)
        -> BrmResult<ReleaseOutcome>;
    fn current_lock(&self, rule_id: RuleId) -> BrmResult<Option<LockRecord>>;

    fn try_acquire_lease(
        &self,
        name: &str,
        holder: &str,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> BrmResult<AcquireOutcome>;
    fn release_lease(&self, name: &str, holder: &str) -> BrmResult<bool>;
    fn current_lease(&self, name: &str) -> BrmResult<Option<LeaseRecord>>;
}
