//! Default configuration values for Retro-Search

use serde::{Deserialize, Serialize};

/// Default configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigDefaults {
    pub search: SearchDefaults,
    pub logging: LoggingDefaults,
}

/// Default search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchDefaults {
    pub default_types: Vec<String>,
    pub alignment: usize,
    pub parallel: bool,
    pub max_threads: usize,
}

/// Default logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingDefaults {
    pub level: String,
    pub with_target: bool,
}

/// Types tried by a named search that was not given its own list
pub const DEFAULT_SEARCH_TYPES: [&str; 10] = [
    "|u1", "|i1", "<u2", "<i2", ">u2", ">i2", "<u4", "<i4", ">u4", ">i4",
];

/// Returns the default configuration
pub fn default_config() -> ConfigDefaults {
    ConfigDefaults {
        search: SearchDefaults {
            default_types: DEFAULT_SEARCH_TYPES.iter().map(|s| s.to_string()).collect(),
            alignment: 1,
            parallel: false,
            max_threads: num_cpus::get().min(8),
        },
        logging: LoggingDefaults {
            level: "info".to_string(),
            with_target: false,
        },
    }
}
