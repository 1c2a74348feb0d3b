//! The named lease that keeps full runs from overlapping.

use std::sync::Arc;

use chrono::{Duration, Utc};

use brm_core::errors::{BrmResult, LockError};
use brm_core::models::AcquireOutcome;
use brm_core::traits::ILockStorage;

/// Called by the executor before each rule runs. An error aborts the run.
pub trait RunHeartbeat: Send + Sync {
    fn beat(&self, run_id: &str) -> BrmResult<()>;
}

/// A held run lease. Each beat re-acquires it under the same holder, which
/// pushes its expiry out by a full TTL.
pub struct RunLease {
    storage: Arc<dyn ILockStorage>,
    name: String,
    holder: String,
    ttl: Duration,
}

impl RunLease {
    /// Take the lease, or fail with `RunInProgress` naming the current holder.
    pub fn acquire(
        storage: Arc<dyn ILockStorage>,
        name: &str,
        holder: &str,
        ttl: Duration,
    ) -> BrmResult<Self> {
        match storage.try_acquire_lease(name, holder, Utc::now(), ttl)? {
            AcquireOutcome::Acquired => Ok(Self {
                storage,
                name: name.to_string(),
                holder: holder.to_string(),
                ttl,
            }),
            AcquireOutcome::Held(current) => Err(LockError::RunInProgress {
                lease: name.to_string(),
                holder: current,
            }
            .into()),
        }
    }

    pub fn holder(&self) -> &str {
        &self.holder
    }

    /// Extend the lease. Fails with `LeaseLost` if it expired and someone
    /// else took it.
    pub fn refresh(&self) -> BrmResult<()> {
        match self
            .storage
            .try_acquire_lease(&self.name, &self.holder, Utc::now(), self.ttl)?
        {
            AcquireOutcome::Acquired => Ok(()),
            AcquireOutcome::Held(current) => {
                tracing::warn!(
                    lease = %self.name,
                    holder = %self.holder,
                    taken_by = %current,
                    "run lease lost"
                );
                Err(LockError::LeaseLost {
                    lease: self.name.clone(),
                    holder: current,
                }
                .into())
            }
        }
    }

    /// Give the lease up. Problems are logged, never returned.
    pub fn release(self) {
        match self.storage.release_lease(&self.name, &self.holder) {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(run_id = %self.holder, "run lease was no longer held at release")
            }
            Err(e) => {
                tracing::warn!(run_id = %self.holder, error = %e, "failed to release run lease")
            }
        }
    }
}

impl RunHeartbeat for RunLease {
    fn beat(&self, _run_id: &str) -> BrmResult<()> {
        self.refresh()
    }
}
