//! Tracing setup: structured JSON logging filtered by `BRM_LOG`.

pub mod events;

use tracing_subscriber::EnvFilter;

use brm_core::config::ObservabilityConfig;

/// Environment variable holding the filter directive.
pub const LOG_ENV_VAR: &str = "BRM_LOG";

/// Initialize the global subscriber with structured JSON output.
///
/// Respects `BRM_LOG`; falls back to `default_level` when unset. Returns
/// false if a subscriber was already installed.
pub fn init_tracing(default_level: &str) -> bool {
    let filter =
        EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(default_level));
    install(filter)
}

/// Initialize tracing with `observability.log_level` as the fallback level.
pub fn init_tracing_from_config(config: &ObservabilityConfig) -> bool {
    install(filter_for(config))
}

/// The filter `init_tracing_from_config` installs: `BRM_LOG` when set,
/// otherwise the configured level.
pub fn filter_for(config: &ObservabilityConfig) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(&config.log_level))
}

fn install(filter: EnvFilter) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .json()
        .try_init()
        .is_ok()
}

/// Initialize tracing with a custom filter string (for testing or embedding).
pub fn init_tracing_with_filter(filter: &str) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(true)
        .json()
        .try_init()
        .is_ok()
}
