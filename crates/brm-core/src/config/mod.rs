//! Workspace configuration, loaded from TOML with per-section defaults.

mod approval_config;
pub mod defaults;
mod engine_config;
mod lock_config;
mod observability_config;
mod storage_config;

pub use approval_config::ApprovalConfig;
pub use engine_config::{CascadePolicy, EngineConfig};
pub use lock_config::LockConfig;
pub use observability_config::ObservabilityConfig;
pub use storage_config::StorageConfig;

use serde::{Deserialize, Serialize};

use crate::errors::{BrmError, BrmResult};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BrmConfig {
    pub storage: StorageConfig,
    pub engine: EngineConfig,
    pub lock: LockConfig,
    pub approval: ApprovalConfig,
    pub observability: ObservabilityConfig,
}

impl BrmConfig {
    /// Parse a TOML document. Missing sections and fields fall back to defaults.
    pub fn from_toml(s: &str) -> BrmResult<Self> {
        toml::from_str(s).map_err(|e| BrmError::ConfigError(e.to_string()))
    }

    /// Read and parse a TOML file.
    pub fn from_file(path: &std::path::Path) -> BrmResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| BrmError::ConfigError(format!("{}: {e}", path.display())))?;
        Self::from_toml(&content)
    }
}
