//! # brm-approval
//!
//! Derives a rule's approval pipeline from the groups owning every rule it
//! can reach, and moves approvals through the pipeline stage by stage.

pub mod builder;
pub mod progress;
pub mod sequence;

pub use builder::ApprovalPipelineBuilder;
pub use progress::{record_approval, reject, ApprovalProgress};
pub use sequence::{impacted_groups, stage_sequence};
