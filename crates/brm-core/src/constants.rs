/// BRM system version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the lease that serializes full BFS runs.
pub const RUN_LEASE_NAME: &str = "bfs-run";

/// Approval group that always opens the pipeline.
pub const LEADING_APPROVAL_GROUP: &str = "BG1";

/// Approval group that always closes the pipeline.
pub const FINAL_APPROVAL_GROUP: &str = "FINAL";

/// Suffix for the synthetic approver of a group with no configured approvers.
pub const DEFAULT_APPROVER_SUFFIX: &str = "_default";

/// Audit actor used for engine-initiated writes.
pub const SYSTEM_ACTOR: &str = "system";
