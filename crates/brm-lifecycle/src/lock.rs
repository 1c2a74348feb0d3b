//! Exclusive, TTL-bounded edit lock per rule.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::json;

use brm_core::errors::{BrmResult, LockError};
use brm_core::models::{AcquireOutcome, AuditAction, AuditEntry, LockRecord, RuleId};
use brm_core::traits::{IAuditStorage, ILockStorage, ReleaseOutcome};

/// Table name recorded for forced lock changes.
const LOCKS_TABLE: &str = "rule_locks";

/// Edit lock over a rule. Acquisition purges an expired lock and claims the
/// rule in one atomic write, so two callers can never both hold it.
pub struct RuleLock {
    storage: Arc<dyn ILockStorage>,
    audit: Arc<dyn IAuditStorage>,
    ttl: Duration,
}

impl RuleLock {
    pub fn new(
        storage: Arc<dyn ILockStorage>,
        audit: Arc<dyn IAuditStorage>,
        ttl: Duration,
    ) -> Self {
        Self { storage, audit, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Take the lock. Re-locking by the current holder refreshes it. A live
    /// lock held by someone else is a `LockError::Conflict` unless `force`.
    pub fn lock(&self, rule_id: RuleId, holder: &str, force: bool) -> BrmResult<()> {
        let now = Utc::now();
        let previous = if force {
            self.storage
                .current_lock(rule_id)?
                .filter(|p| p.locked_at >= now - self.ttl)
        } else {
            None
        };

        match self
            .storage
            .try_acquire_lock(rule_id, holder, now, self.ttl, force)?
        {
            AcquireOutcome::Acquired => {
                tracing::debug!(rule_id = %rule_id, holder, "rule locked");
                if let Some(prev) = previous.filter(|p| p.locked_by != holder) {
                    self.audit_forced(AuditAction::ForceLock, rule_id, holder, &prev);
                }
                Ok(())
            }
            AcquireOutcome::Held(current) => Err(LockError::Conflict {
                rule_id: rule_id.value(),
                holder: current,
            }
            .into()),
        }
    }

    /// Release the lock. Releasing an unlocked rule succeeds. Someone else's
    /// lock is a `LockError::NotHolder` unless `force`.
    pub fn unlock(&self, rule_id: RuleId, holder: &str, force: bool) -> BrmResult<()> {
        let previous = if force {
            self.storage.current_lock(rule_id)?
        } else {
            None
        };

        match self.storage.release_lock(rule_id, holder, force)? {
            ReleaseOutcome::Released => {
                tracing::debug!(rule_id = %rule_id, holder, "rule unlocked");
                if let Some(prev) = previous.filter(|p| p.locked_by != holder) {
                    self.audit_forced(AuditAction::ForceUnlock, rule_id, holder, &prev);
                }
                Ok(())
            }
            ReleaseOutcome::NotLocked => Ok(()),
            ReleaseOutcome::HeldBy(current) => Err(LockError::NotHolder {
                rule_id: rule_id.value(),
                holder: current,
            }
            .into()),
        }
    }

    pub fn holder(&self, rule_id: RuleId) -> BrmResult<Option<LockRecord>> {
        self.storage.current_lock(rule_id)
    }

    fn audit_forced(
        &self,
        action: AuditAction,
        rule_id: RuleId,
        actor: &str,
        overridden: &LockRecord,
    ) {
        tracing::warn!(
            rule_id = %rule_id,
            actor,
            overridden = %overridden.locked_by,
            action = action.as_str(),
            "lock ownership overridden"
        );
        let entry = AuditEntry {
            action,
            table_name: LOCKS_TABLE.to_string(),
            record_id: Some(rule_id.to_string()),
            actor: actor.to_string(),
            old_data: Some(json!({
                "locked_by": overridden.locked_by,
                "locked_at": overridden.locked_at,
            })),
            new_data: match action {
                AuditAction::ForceLock => Some(json!({ "locked_by": actor })),
                _ => None,
            },
            timestamp: Utc::now(),
        };
        if let Err(e) = self.audit.record_audit(&entry) {
            tracing::warn!(rule_id = %rule_id, error = %e, "failed to audit forced lock change");
        }
    }
}
