//! Configuration management for sheetsplit
//!
//! Values resolve with precedence CLI > environment > config file > defaults.
//! Every resolved key records where it came from so `sheetsplit config` can
//! show the effective configuration with its sources.

mod builder;
mod cli_args;
mod discovery;
mod model;
mod selectors;
mod sources;
mod validation;

pub use builder::ConfigBuilder;
pub use cli_args::CliArgs;
pub use model::*;
pub use selectors::{LOCK_FILE_PREFIX, Selectors};
pub use sheetsplit_utils::types::ConfigSource;
