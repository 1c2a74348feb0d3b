// Single source of truth for all default values.

// --- Storage ---
pub const DEFAULT_DB_FILENAME: &str = "brm.db";
pub const DEFAULT_BUSY_TIMEOUT_MS: u32 = 5_000;
pub const DEFAULT_READ_POOL_SIZE: usize = 4;

// --- Engine ---
pub const DEFAULT_RULE_TIMEOUT_SECS: u64 = 300; // 5 minutes
pub const DEFAULT_RUN_LEASE_TTL_SECS: u64 = 3_600; // 1 hour
pub const DEFAULT_ONLY_ACTIVE_RULES: bool = true;

// --- Lock ---
pub const DEFAULT_LOCK_TTL_MINUTES: i64 = 30;

// --- Approval ---
pub const DEFAULT_PRIORITY_GROUPS: [&str; 2] = ["BG2", "BG3"];

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
