//! Append-only audit trail of rule definition changes.

pub mod logger;

pub use logger::AuditLogger;
