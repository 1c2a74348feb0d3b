//! Named leases that serialize long-running work such as a full BFS run.
//! Same acquisition shape as rule locks, keyed by name, without force.

use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use brm_core::errors::BrmResult;
use brm_core::models::{AcquireOutcome, LeaseRecord};

use crate::{format_timestamp, parse_timestamp, to_storage_err};

pub fn try_acquire_lease(
    conn: &Connection,
    name: &str,
    holder: &str,
    now: DateTime<Utc>,
    ttl: Duration,
) -> BrmResult<AcquireOutcome> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| to_storage_err(format!("try_acquire_lease begin: {e}")))?;

    let expired = tx
        .execute(
            "DELETE FROM run_leases WHERE name = ?1 AND acquired_at < ?2",
            params![name, format_timestamp(now - ttl)],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    if expired > 0 {
        tracing::warn!(lease = name, "reclaimed expired lease");
    }

    let changed = tx
        .execute(
            "INSERT INTO run_leases (name, holder, acquired_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(name) DO UPDATE
                SET holder = excluded.holder, acquired_at = excluded.acquired_at
                WHERE run_leases.holder = excluded.holder",
            params![name, holder, format_timestamp(now)],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;

    let outcome = if changed > 0 {
        AcquireOutcome::Acquired
    } else {
        AcquireOutcome::Held(
            current_lease(&tx, name)?
                .map(|l| l.holder)
                .unwrap_or_default(),
        )
    };

    tx.commit()
        .map_err(|e| to_storage_err(format!("try_acquire_lease commit: {e}")))?;
    Ok(outcome)
}

/// Release the lease if `holder` owns it. Returns whether a row was removed.
pub fn release_lease(conn: &Connection, name: &str, holder: &str) -> BrmResult<bool> {
    let deleted = conn
        .execute(
            "DELETE FROM run_leases WHERE name = ?1 AND holder = ?2",
            params![name, holder],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(deleted > 0)
}

pub fn current_lease(conn: &Connection, name: &str) -> BrmResult<Option<LeaseRecord>> {
    let row = conn
        .query_row(
            "SELECT holder, acquired_at FROM run_leases WHERE name = ?1",
            params![name],
            |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;

    match row {
        Some((holder, acquired_at)) => Ok(Some(LeaseRecord {
            name: name.to_string(),
            holder,
            acquired_at: parse_timestamp(&acquired_at)?,
        })),
        None => Ok(None),
    }
}
