//! Tracing subscriber setup driven by `[logging]`

use super::loader::{ConfigError, LoggingConfig};
use tracing_subscriber::EnvFilter;

/// Builds the filter for `logging`. `RUST_LOG` takes precedence when set.
pub fn env_filter(logging: &LoggingConfig) -> Result<EnvFilter, ConfigError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(logging.level.to_lowercase())
            .map_err(|e| ConfigError::Invalid(format!("Invalid log level: {}", e))),
    }
}

/// Installs a global fmt subscriber.
///
/// Returns `Ok(false)` if another subscriber was already installed.
pub fn init_logging(logging: &LoggingConfig) -> Result<bool, ConfigError> {
    let filter = env_filter(logging)?;
    Ok(tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(logging.with_target)
        .try_init()
        .is_ok())
}
