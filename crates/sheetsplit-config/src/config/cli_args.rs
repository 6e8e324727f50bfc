use std::path::PathBuf;

/// CLI arguments that take part in configuration resolution
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub config_path: Option<PathBuf>,
    pub group_size: Option<usize>,
    pub workers: Option<usize>,
    pub load_timeout_secs: Option<u64>,
    pub identity_column: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub verbose: Option<bool>,
}
