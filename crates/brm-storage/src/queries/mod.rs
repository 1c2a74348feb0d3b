//! Raw SQL operations, one module per table family. Every function takes a
//! borrowed `Connection` so callers decide which connection and transaction
//! scope to use.

pub mod approval_ops;
pub mod audit_ops;
pub mod execution_log_ops;
pub mod lease_ops;
pub mod lock_ops;
pub mod relationship_ops;
pub mod rule_crud;
pub mod validation_ops;
