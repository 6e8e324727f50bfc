//! CLI argument definitions and parsing structures

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// sheetsplit - regroup spreadsheet rows by identity
#[derive(Parser, Debug)]
#[command(name = "sheetsplit")]
#[command(about = "Regroup rows from many workbooks into batches with one row per identity")]
#[command(long_about = r#"
sheetsplit collects every workbook under a folder, groups the rows by an
identity column (BrowserID by default) and writes output_001.xlsx,
output_002.xlsx, ... where output i holds the i-th row of every identity
that has at least i rows.

EXAMPLES:
  # Regroup everything under ./exports into at most 10 workbooks
  sheetsplit split ./exports

  # Cap the number of output workbooks and choose where they go
  sheetsplit split ./exports --group-size 3 --output ./batches

  # Merge workbooks into one, tagging rows with their source file and folder
  sheetsplit merge a.xlsx b.xlsx --output merged.xlsx
  sheetsplit merge --from-dir ./exports --output merged.xlsx

  # Machine-readable result
  sheetsplit split ./exports --json

CONFIGURATION:
  Precedence: CLI flags > SHEETSPLIT_* environment > config file > defaults
  The config file is discovered by searching upward from CWD for
  .sheetsplit/config.toml; use --config to specify an explicit path.

EXIT CODES:
  0 success, 1 internal error, 2 invalid arguments or configuration,
  3 input folder missing, 4 no usable data, 5 partial success with --strict
"#)]
#[command(version)]
pub struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Regroup rows from every workbook under ROOT by identity
    ///
    /// EXAMPLES:
    ///   sheetsplit split ./exports
    ///   sheetsplit split ./exports --group-size 5 --workers 8 --json
    Split {
        /// Folder searched recursively for workbooks
        root: Utf8PathBuf,

        /// Maximum number of output workbooks (default: 10)
        #[arg(short = 'n', long)]
        group_size: Option<usize>,

        /// Output folder, created if missing (default: output)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Workbooks loaded concurrently (default: 4)
        #[arg(long)]
        workers: Option<usize>,

        /// Per-workbook load timeout in seconds, 0 disables (default: 120)
        #[arg(long)]
        load_timeout: Option<u64>,

        /// Column holding the grouping identity (default: BrowserID)
        #[arg(long)]
        identity_column: Option<String>,

        /// Print the result as canonical JSON
        #[arg(long)]
        json: bool,

        /// Exit with code 5 if any workbook or batch was skipped
        #[arg(long)]
        strict: bool,
    },

    /// Concatenate workbooks into one, adding SourceFile and SourceFolder
    ///
    /// EXAMPLES:
    ///   sheetsplit merge a.xlsx b.xlsx --output merged.xlsx
    ///   sheetsplit merge --from-dir ./exports --output merged.xlsx
    Merge {
        /// Workbooks to merge, in order
        #[arg(required_unless_present = "from_dir")]
        files: Vec<Utf8PathBuf>,

        /// Destination workbook
        #[arg(short, long)]
        output: Utf8PathBuf,

        /// Also merge every workbook found under this folder
        #[arg(long)]
        from_dir: Option<Utf8PathBuf>,

        /// Workbooks loaded concurrently (default: 4)
        #[arg(long)]
        workers: Option<usize>,

        /// Per-workbook load timeout in seconds, 0 disables (default: 120)
        #[arg(long)]
        load_timeout: Option<u64>,

        /// Print the result as canonical JSON
        #[arg(long)]
        json: bool,

        /// Exit with code 5 if any workbook was skipped
        #[arg(long)]
        strict: bool,
    },

    /// Show the effective configuration and where each value came from
    Config {
        /// Print as canonical JSON
        #[arg(long)]
        json: bool,
    },
}

impl Commands {
    /// Operation name used in error reports
    #[must_use]
    pub fn operation(&self) -> &'static str {
        match self {
            Self::Split { .. } => "split",
            Self::Merge { .. } => "merge",
            Self::Config { .. } => "config",
        }
    }
}

/// Build the clap command (for completions and help tests)
#[must_use]
pub fn build_cli() -> clap::Command {
    <Cli as clap::CommandFactory>::command()
}
