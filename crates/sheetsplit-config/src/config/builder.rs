use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use sheetsplit_utils::error::SheetSplitError;

use super::{Config, ConfigSource, Defaults, Selectors};

impl Config {
    /// Create a builder for programmatic configuration.
    ///
    /// Use this to embed sheetsplit without consulting environment variables
    /// or config files.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use sheetsplit_config::Config;
    /// use std::time::Duration;
    ///
    /// let config = Config::builder()
    ///     .group_size(5)
    ///     .workers(2)
    ///     .load_timeout(Duration::from_secs(30))
    ///     .output_dir("batches")
    ///     .build()
    ///     .expect("Failed to build config");
    /// ```
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }
}

/// Builder for programmatic configuration.
///
/// All values set via the builder are attributed to
/// `ConfigSource::Programmatic`; everything else reports `Default`.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    group_size: Option<usize>,
    workers: Option<usize>,
    load_timeout: Option<Duration>,
    identity_column: Option<String>,
    output_dir: Option<PathBuf>,
    verbose: Option<bool>,
    selectors: Option<Selectors>,
}

impl ConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Maximum number of output workbooks (1..=10000)
    #[must_use]
    pub fn group_size(mut self, group_size: usize) -> Self {
        self.group_size = Some(group_size);
        self
    }

    /// Number of documents loaded concurrently (1..=64)
    #[must_use]
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    /// Per-document load timeout; `Duration::ZERO` disables it
    #[must_use]
    pub fn load_timeout(mut self, timeout: Duration) -> Self {
        self.load_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn identity_column(mut self, column: impl Into<String>) -> Self {
        self.identity_column = Some(column.into());
        self
    }

    #[must_use]
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    #[must_use]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = Some(verbose);
        self
    }

    #[must_use]
    pub fn selectors(mut self, selectors: Selectors) -> Self {
        self.selectors = Some(selectors);
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> Result<Config, SheetSplitError> {
        let mut source_attribution = HashMap::new();
        let mut defaults = Defaults::default();
        let mut selectors = Selectors::default();

        let mut mark = |key: &str| {
            source_attribution.insert(key.to_string(), ConfigSource::Programmatic);
        };

        if let Some(value) = self.group_size {
            defaults.group_size = Some(value);
            mark("group_size");
        }
        if let Some(value) = self.workers {
            defaults.workers = Some(value);
            mark("workers");
        }
        if let Some(value) = self.load_timeout {
            defaults.load_timeout_secs = Some(value.as_secs());
            mark("load_timeout_secs");
        }
        if let Some(value) = self.identity_column {
            defaults.identity_column = Some(value);
            mark("identity_column");
        }
        if let Some(value) = self.output_dir {
            defaults.output_dir = Some(value);
            mark("output_dir");
        }
        if let Some(value) = self.verbose {
            defaults.verbose = Some(value);
            mark("verbose");
        }
        if let Some(value) = self.selectors {
            selectors = value;
            mark("selectors_include");
            mark("selectors_exclude");
        }

        let config = Config {
            defaults,
            selectors,
            source_attribution,
        };
        config.validate()?;
        Ok(config)
    }
}
