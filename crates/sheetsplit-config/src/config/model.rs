use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use sheetsplit_utils::types::ConfigSource;

use super::Selectors;

/// Default cap on the number of output workbooks
pub const DEFAULT_GROUP_SIZE: usize = 10;

/// Default number of documents loaded concurrently
pub const DEFAULT_WORKERS: usize = 4;

/// Default per-document load timeout in seconds (0 disables the timeout)
pub const DEFAULT_LOAD_TIMEOUT_SECS: u64 = 120;

/// Default name of the column holding the grouping identity
pub const DEFAULT_IDENTITY_COLUMN: &str = "BrowserID";

/// Default output directory, relative to the working directory
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Upper bound accepted for `group_size`
pub const MAX_GROUP_SIZE: usize = 10_000;

/// Upper bound accepted for `workers`
pub const MAX_WORKERS: usize = 64;

/// Fully resolved configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub defaults: Defaults,
    pub selectors: Selectors,
    pub source_attribution: HashMap<String, ConfigSource>,
}

/// Tunables for split and merge runs, as read from `[defaults]`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    pub group_size: Option<usize>,
    pub workers: Option<usize>,
    pub load_timeout_secs: Option<u64>,
    pub identity_column: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub verbose: Option<bool>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            group_size: Some(DEFAULT_GROUP_SIZE),
            workers: Some(DEFAULT_WORKERS),
            load_timeout_secs: Some(DEFAULT_LOAD_TIMEOUT_SECS),
            identity_column: Some(DEFAULT_IDENTITY_COLUMN.to_string()),
            output_dir: Some(PathBuf::from(DEFAULT_OUTPUT_DIR)),
            verbose: Some(false),
        }
    }
}

impl Config {
    #[must_use]
    pub fn group_size(&self) -> usize {
        self.defaults.group_size.unwrap_or(DEFAULT_GROUP_SIZE)
    }

    #[must_use]
    pub fn workers(&self) -> usize {
        self.defaults.workers.unwrap_or(DEFAULT_WORKERS)
    }

    /// Per-document load timeout; `None` when configured as 0
    #[must_use]
    pub fn load_timeout(&self) -> Option<Duration> {
        match self
            .defaults
            .load_timeout_secs
            .unwrap_or(DEFAULT_LOAD_TIMEOUT_SECS)
        {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    #[must_use]
    pub fn identity_column(&self) -> &str {
        self.defaults
            .identity_column
            .as_deref()
            .unwrap_or(DEFAULT_IDENTITY_COLUMN)
    }

    #[must_use]
    pub fn output_dir(&self) -> PathBuf {
        self.defaults
            .output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR))
    }

    #[must_use]
    pub fn verbose(&self) -> bool {
        self.defaults.verbose.unwrap_or(false)
    }

    /// Source of a resolved key, `Default` when nothing overrode it
    #[must_use]
    pub fn source_of(&self, key: &str) -> ConfigSource {
        self.source_attribution
            .get(key)
            .cloned()
            .unwrap_or(ConfigSource::Default)
    }
}
