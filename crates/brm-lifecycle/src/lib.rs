//! # brm-lifecycle
//!
//! Rule definition mutation: create, update, activate, deactivate, delete,
//! approve, reject. Every mutation of an existing rule runs under its edit
//! lock and leaves an audit entry.

pub mod guards;
pub mod lock;
pub mod service;

pub use lock::RuleLock;
pub use service::RuleLifecycleService;
