//! # brm-storage
//!
//! SQLite persistence for rules, relationships, approvals, locks, leases,
//! execution logs, and the audit trail. One serialized writer, a small read
//! pool for file-backed databases, and `PRAGMA user_version` migrations.

pub mod audit;
pub mod engine;
pub mod migrations;
pub mod pool;
pub mod queries;

pub use engine::StorageEngine;

use brm_core::errors::{BrmError, StorageError};
use chrono::{DateTime, SecondsFormat, Utc};

/// Wrap a SQLite failure message as a workspace error.
pub(crate) fn to_storage_err(message: String) -> BrmError {
    BrmError::StorageError(StorageError::SqliteError { message })
}

/// Fixed-width UTC timestamp so stored values compare lexicographically.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, BrmError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| to_storage_err(format!("parse datetime '{s}': {e}")))
}
