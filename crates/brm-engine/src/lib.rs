//! # brm-engine
//!
//! Runs every reachable rule once, breadth-first from the roots. Each rule
//! runs in its own transaction; failures of cascading rules suppress
//! everything downstream.

pub mod executor;
pub mod lease;
pub mod observer;
pub mod registry;
pub mod report;
pub mod runner;
pub mod service;
pub mod tracing_setup;
pub mod validation;

pub use executor::BfsExecutor;
pub use lease::{RunHeartbeat, RunLease};
pub use observer::{RunObserver, SkipReason, TracingObserver};
pub use registry::RuleRegistry;
pub use report::RunReport;
pub use runner::{RuleRunner, SqliteRuleRunner};
pub use service::RuleRunService;
pub use validation::SqlDataValidator;
