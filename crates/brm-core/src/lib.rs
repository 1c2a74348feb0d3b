//! # brm-core
//!
//! Foundation crate for the business rule manager.
//! Defines all types, traits, errors, config, and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::BrmConfig;
pub use errors::{BrmError, BrmResult};
pub use models::{EdgeKind, OperationType, Rule, RuleId};
