//! Configuration module for Retro-Search
//!
//! Provides configuration loading, validation, default settings and
//! logging setup.

mod defaults;
mod loader;
mod logging;
mod validator;

pub use defaults::{default_config, ConfigDefaults, DEFAULT_SEARCH_TYPES};
pub use loader::{load_config, ConfigLoader, LoggingConfig, SearchConfig};
pub use logging::{env_filter, init_logging};
pub use validator::{validate_config, ConfigValidator, VALID_LOG_LEVELS};

// Re-export the main configuration structure
pub use loader::Config;

// Configuration-related error type
pub use loader::ConfigError;

// Configuration result type
pub type ConfigResult<T> = Result<T, ConfigError>;
