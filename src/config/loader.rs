//! Configuration loader for Retro-Search
//!
//! Handles loading configuration from TOML files and merging with defaults.

use super::defaults::default_config;
use super::validator::validate_config;
use crate::core::types::{DataType, SearchError, SearchResult};
use crate::memory::{ScanOptions, SearchRegistry};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_search")]
    pub search: SearchConfig,

    #[serde(default = "default_logging")]
    pub logging: LoggingConfig,
}

/// Search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_types")]
    pub default_types: Vec<String>,
    #[serde(default = "default_alignment")]
    pub alignment: usize,
    #[serde(default = "default_parallel")]
    pub parallel: bool,
    #[serde(default = "default_max_threads")]
    pub max_threads: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_with_target")]
    pub with_target: bool,
}

impl SearchConfig {
    /// Parses the configured default types
    pub fn data_types(&self) -> SearchResult<Vec<DataType>> {
        self.default_types.iter().map(|s| s.parse()).collect()
    }

    /// Scan options for engines built from this configuration
    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            alignment: self.alignment,
            parallel: self.parallel,
        }
    }

    /// Sizes the global rayon pool used by parallel scans.
    ///
    /// Returns `false` if the global pool was already built.
    pub fn init_thread_pool(&self) -> bool {
        rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_threads)
            .build_global()
            .is_ok()
    }
}

impl Config {
    /// Builds an empty registry using the configured types and scan options.
    ///
    /// The whole configuration is validated first.
    pub fn registry(&self) -> SearchResult<SearchRegistry> {
        validate_config(self).map_err(|e| match e {
            ConfigError::Invalid(message) => SearchError::InvalidConfiguration(message),
            other => SearchError::invalid_configuration(other.to_string()),
        })?;
        SearchRegistry::new(self.search.data_types()?)?.with_options(self.search.scan_options())
    }
}

/// Configuration loader
pub struct ConfigLoader {
    config_path: PathBuf,
}

impl ConfigLoader {
    /// Creates a new configuration loader
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        ConfigLoader {
            config_path: path.as_ref().to_path_buf(),
        }
    }

    /// Loads configuration from file
    pub fn load(&self) -> Result<Config, ConfigError> {
        if !self.config_path.exists() {
            return Err(ConfigError::FileNotFound(
                self.config_path.display().to_string(),
            ));
        }

        let contents = fs::read_to_string(&self.config_path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Loads configuration or returns defaults if the file is missing or invalid
    pub fn load_or_default(&self) -> Config {
        self.load().unwrap_or_else(|err| {
            tracing::debug!(error = %err, "Using default configuration");
            Config::default()
        })
    }

    /// Saves configuration to file
    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, contents)?;
        Ok(())
    }
}

/// Loads configuration from the default location
pub fn load_config() -> Result<Config, ConfigError> {
    Ok(ConfigLoader::new("retro-search.toml").load_or_default())
}

// Default functions for serde
fn default_search() -> SearchConfig {
    let defaults = default_config();
    SearchConfig {
        default_types: defaults.search.default_types,
        alignment: defaults.search.alignment,
        parallel: defaults.search.parallel,
        max_threads: defaults.search.max_threads,
    }
}

fn default_logging() -> LoggingConfig {
    let defaults = default_config();
    LoggingConfig {
        level: defaults.logging.level,
        with_target: defaults.logging.with_target,
    }
}

// Individual field defaults
fn default_types() -> Vec<String> {
    default_config().search.default_types
}

fn default_alignment() -> usize {
    default_config().search.alignment
}

fn default_parallel() -> bool {
    default_config().search.parallel
}

fn default_max_threads() -> usize {
    default_config().search.max_threads
}

fn default_log_level() -> String {
    default_config().logging.level
}

fn default_with_target() -> bool {
    default_config().logging.with_target
}

impl Default for Config {
    fn default() -> Self {
        Config {
            search: default_search(),
            logging: default_logging(),
        }
    }
}
