//! Rule edit locks.
//!
//! Acquisition is one transaction: purge the rule's expired lock, then a
//! conditional upsert that only overwrites a row held by the same user (or
//! any row when forced). A zero change count means someone else holds it.

use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use brm_core::errors::BrmResult;
use brm_core::models::{AcquireOutcome, LockRecord, RuleId};
use brm_core::traits::ReleaseOutcome;

use crate::{format_timestamp, parse_timestamp, to_storage_err};

pub fn try_acquire_lock(
    conn: &Connection,
    rule_id: RuleId,
    holder: &str,
    now: DateTime<Utc>,
    ttl: Duration,
    force: bool,
) -> BrmResult<AcquireOutcome> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| to_storage_err(format!("try_acquire_lock begin: {e}")))?;

    match try_acquire_inner(&tx, rule_id, holder, now, ttl, force) {
        Ok(outcome) => {
            tx.commit()
                .map_err(|e| to_storage_err(format!("try_acquire_lock commit: {e}")))?;
            Ok(outcome)
        }
        Err(e) => {
            let _ = tx.rollback();
            Err(e)
        }
    }
}

fn try_acquire_inner(
    conn: &Connection,
    rule_id: RuleId,
    holder: &str,
    now: DateTime<Utc>,
    ttl: Duration,
    force: bool,
) -> BrmResult<AcquireOutcome> {
    let expired = conn
        .execute(
            "DELETE FROM rule_locks WHERE rule_id = ?1 AND locked_at < ?2",
            params![rule_id.value(), format_timestamp(now - ttl)],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    if expired > 0 {
        tracing::debug!(rule_id = %rule_id, "purged expired rule lock");
    }

    let changed = conn
        .execute(
            "INSERT INTO rule_locks (rule_id, locked_by, locked_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(rule_id) DO UPDATE
                SET locked_by = excluded.locked_by, locked_at = excluded.locked_at
                WHERE rule_locks.locked_by = excluded.locked_by OR ?4",
            params![rule_id.value(), holder, format_timestamp(now), force],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;

    if changed > 0 {
        return Ok(AcquireOutcome::Acquired);
    }
    let current = current_lock(conn, rule_id)?
        .map(|l| l.locked_by)
        .unwrap_or_default();
    Ok(AcquireOutcome::Held(current))
}

/// Release a lock held by `holder`, or any lock when `force` is set.
pub fn release_lock(
    conn: &Connection,
    rule_id: RuleId,
    holder: &str,
    force: bool,
) -> BrmResult<ReleaseOutcome> {
    let deleted = conn
        .execute(
            "DELETE FROM rule_locks WHERE rule_id = ?1 AND (locked_by = ?2 OR ?3)",
            params![rule_id.value(), holder, force],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    if deleted > 0 {
        return Ok(ReleaseOutcome::Released);
    }
    Ok(match current_lock(conn, rule_id)? {
        Some(lock) => ReleaseOutcome::HeldBy(lock.locked_by),
        None => ReleaseOutcome::NotLocked,
    })
}

pub fn current_lock(conn: &Connection, rule_id: RuleId) -> BrmResult<Option<LockRecord>> {
    let row = conn
        .query_row(
            "SELECT locked_by, locked_at FROM rule_locks WHERE rule_id = ?1",
            params![rule_id.value()],
            |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;

    match row {
        Some((locked_by, locked_at)) => Ok(Some(LockRecord {
            rule_id,
            locked_by,
            locked_at: parse_timestamp(&locked_at)?,
        })),
        None => Ok(None),
    }
}
