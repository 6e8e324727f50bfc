use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use sheetsplit_utils::error::{ConfigError, SheetSplitError};

use super::{CliArgs, Config, ConfigSource, Defaults, Selectors};

/// Directory holding the project configuration file
pub const CONFIG_DIR_NAME: &str = ".sheetsplit";

/// Environment variable overriding `group_size`
pub const ENV_GROUP_SIZE: &str = "SHEETSPLIT_GROUP_SIZE";

/// Environment variable overriding `workers`
pub const ENV_WORKERS: &str = "SHEETSPLIT_WORKERS";

/// TOML configuration file structure
#[derive(Debug, Default, Deserialize, Serialize)]
struct TomlConfig {
    defaults: Option<FileDefaults>,
    selectors: Option<Selectors>,
}

/// `[defaults]` as written in the file; every key is optional
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct FileDefaults {
    group_size: Option<usize>,
    workers: Option<usize>,
    load_timeout_secs: Option<u64>,
    identity_column: Option<String>,
    output_dir: Option<PathBuf>,
    verbose: Option<bool>,
}

const TRACKED_KEYS: [&str; 6] = [
    "group_size",
    "workers",
    "load_timeout_secs",
    "identity_column",
    "output_dir",
    "verbose",
];

impl Config {
    /// Discover and load configuration with precedence: CLI > env > file > defaults
    ///
    /// Uses the current working directory for config file discovery when no
    /// explicit path is provided in `cli_args`.
    pub fn discover(cli_args: &CliArgs) -> Result<Self> {
        let start_dir = std::env::current_dir().context("Failed to get current directory")?;
        Self::discover_from(&start_dir, cli_args)
    }

    /// Discover and load configuration starting from a specific directory
    pub fn discover_from(start_dir: &Path, cli_args: &CliArgs) -> Result<Self> {
        Self::resolve(start_dir, cli_args, &|key| std::env::var(key).ok())
    }

    /// Resolution with an injectable environment lookup
    pub(crate) fn resolve(
        start_dir: &Path,
        cli_args: &CliArgs,
        env: &dyn Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let mut source_attribution = HashMap::new();
        let mut defaults = Defaults::default();
        let mut selectors = Selectors::default();

        for key in TRACKED_KEYS {
            source_attribution.insert(key.to_string(), ConfigSource::Default);
        }

        let config_path = match &cli_args.config_path {
            Some(explicit) => {
                if !explicit.is_file() {
                    return Err(SheetSplitError::Config(ConfigError::NotFound {
                        path: explicit.display().to_string(),
                    })
                    .into());
                }
                Some(explicit.clone())
            }
            None => Self::discover_config_file_from(start_dir)?,
        };

        if let Some(path) = &config_path {
            let file_config = Self::load_config_file(path)?;
            tracing::debug!(path = %path.display(), "loaded configuration file");
            let source = ConfigSource::Config;

            if let Some(file) = file_config.defaults {
                if let Some(value) = file.group_size {
                    defaults.group_size = Some(value);
                    source_attribution.insert("group_size".to_string(), source.clone());
                }
                if let Some(value) = file.workers {
                    defaults.workers = Some(value);
                    source_attribution.insert("workers".to_string(), source.clone());
                }
                if let Some(value) = file.load_timeout_secs {
                    defaults.load_timeout_secs = Some(value);
                    source_attribution.insert("load_timeout_secs".to_string(), source.clone());
                }
                if let Some(value) = file.identity_column {
                    defaults.identity_column = Some(value);
                    source_attribution.insert("identity_column".to_string(), source.clone());
                }
                if let Some(value) = file.output_dir {
                    defaults.output_dir = Some(value);
                    source_attribution.insert("output_dir".to_string(), source.clone());
                }
                if let Some(value) = file.verbose {
                    defaults.verbose = Some(value);
                    source_attribution.insert("verbose".to_string(), source.clone());
                }
            }

            if let Some(file_selectors) = file_config.selectors {
                if !file_selectors.include.is_empty() {
                    selectors.include = file_selectors.include;
                    source_attribution.insert("selectors_include".to_string(), source.clone());
                }
                if !file_selectors.exclude.is_empty() {
                    selectors.exclude = file_selectors.exclude;
                    source_attribution.insert("selectors_exclude".to_string(), source);
                }
            }
        }

        // Environment overrides the file but not the command line
        if let Some(raw) = env(ENV_GROUP_SIZE) {
            defaults.group_size = Some(parse_env_usize("group_size", ENV_GROUP_SIZE, &raw)?);
            source_attribution.insert("group_size".to_string(), ConfigSource::Env);
        }
        if let Some(raw) = env(ENV_WORKERS) {
            defaults.workers = Some(parse_env_usize("workers", ENV_WORKERS, &raw)?);
            source_attribution.insert("workers".to_string(), ConfigSource::Env);
        }

        if let Some(value) = cli_args.group_size {
            defaults.group_size = Some(value);
            source_attribution.insert("group_size".to_string(), ConfigSource::Cli);
        }
        if let Some(value) = cli_args.workers {
            defaults.workers = Some(value);
            source_attribution.insert("workers".to_string(), ConfigSource::Cli);
        }
        if let Some(value) = cli_args.load_timeout_secs {
            defaults.load_timeout_secs = Some(value);
            source_attribution.insert("load_timeout_secs".to_string(), ConfigSource::Cli);
        }
        if let Some(value) = &cli_args.identity_column {
            defaults.identity_column = Some(value.clone());
            source_attribution.insert("identity_column".to_string(), ConfigSource::Cli);
        }
        if let Some(value) = &cli_args.output_dir {
            defaults.output_dir = Some(value.clone());
            source_attribution.insert("output_dir".to_string(), ConfigSource::Cli);
        }
        if let Some(value) = cli_args.verbose {
            defaults.verbose = Some(value);
            source_attribution.insert("verbose".to_string(), ConfigSource::Cli);
        }

        let config = Config {
            defaults,
            selectors,
            source_attribution,
        };
        config.validate()?;
        Ok(config)
    }

    /// Discover config file by searching upward from a given directory
    ///
    /// Walks up the directory tree looking for `.sheetsplit/config.toml`,
    /// stopping at repository root markers (.git, .hg, .svn) or the
    /// filesystem root.
    pub fn discover_config_file_from(start_dir: &Path) -> Result<Option<PathBuf>> {
        let mut current_dir = Some(start_dir);

        while let Some(dir) = current_dir {
            let config_path = dir.join(CONFIG_DIR_NAME).join("config.toml");
            if config_path.is_file() {
                return Ok(Some(config_path));
            }

            if dir.join(".git").exists() || dir.join(".hg").exists() || dir.join(".svn").exists()
            {
                break;
            }

            current_dir = dir.parent();
        }

        Ok(None)
    }

    fn load_config_file(path: &Path) -> Result<TomlConfig> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content).map_err(|e| {
            SheetSplitError::Config(ConfigError::InvalidFile(format!(
                "{}: {}",
                path.display(),
                e.message()
            )))
            .into()
        })
    }
}

fn parse_env_usize(key: &str, var: &str, raw: &str) -> Result<usize> {
    raw.trim().parse::<usize>().map_err(|_| {
        SheetSplitError::Config(ConfigError::InvalidValue {
            key: key.to_string(),
            value: format!("{var}='{raw}' is not a non-negative integer"),
        })
        .into()
    })
}
