//! Configuration validator for Retro-Search
//!
//! Validates configuration values to ensure they are within acceptable ranges.

use super::loader::{Config, ConfigError, LoggingConfig, SearchConfig};

/// Log levels accepted in `[logging] level`
pub const VALID_LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validates the entire configuration
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        Self::validate_search(&config.search)?;
        Self::validate_logging(&config.logging)?;
        Ok(())
    }

    /// Validates search configuration
    fn validate_search(search: &SearchConfig) -> Result<(), ConfigError> {
        if search.default_types.is_empty() {
            return Err(ConfigError::Invalid(
                "At least one default search type is required".to_string(),
            ));
        }

        search
            .data_types()
            .map_err(|e| ConfigError::Invalid(format!("Bad default search type: {}", e)))?;

        search
            .scan_options()
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("Bad search alignment: {}", e)))?;

        if search.max_threads == 0 {
            return Err(ConfigError::Invalid(
                "Search threads must be at least 1".to_string(),
            ));
        }

        if search.max_threads > 128 {
            return Err(ConfigError::Invalid(
                "Search threads cannot exceed 128".to_string(),
            ));
        }

        Ok(())
    }

    /// Validates logging configuration
    fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
        if !VALID_LOG_LEVELS.contains(&logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::Invalid(format!(
                "Invalid log level: {}. Must be one of: {:?}",
                logging.level, VALID_LOG_LEVELS
            )));
        }

        Ok(())
    }
}

/// Validates a configuration
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    ConfigValidator::validate(config)
}
