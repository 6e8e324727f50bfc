//! Configuration for sheetsplit: model, discovery, builder, and validation.

pub mod config;

pub use config::{
    CliArgs, Config, ConfigBuilder, ConfigSource, DEFAULT_GROUP_SIZE, DEFAULT_IDENTITY_COLUMN,
    DEFAULT_LOAD_TIMEOUT_SECS, DEFAULT_OUTPUT_DIR, DEFAULT_WORKERS, Defaults, LOCK_FILE_PREFIX,
    Selectors,
};
