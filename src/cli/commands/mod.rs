//! Command implementations

mod config_cmd;
mod json_emit;
mod merge;
mod split;

pub use config_cmd::execute_config_command;
pub use merge::execute_merge_command;
pub use split::execute_split_command;
