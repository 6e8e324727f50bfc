//! Command-line interface for sheetsplit
//!
//! - `args`: CLI argument definitions (clap)
//! - `run`: entry point and command dispatch
//! - `commands`: command implementations

pub mod args;
mod commands;
mod run;


pub use args::{Cli, Commands, build_cli};
pub use run::run;
