//! sheetsplit - regroup spreadsheet rows by identity across many workbooks
//!
//! Split mode walks a folder tree for workbooks, loads them concurrently,
//! groups every row by its identity column (`BrowserID` by default) and
//! writes `output_001.xlsx`, `output_002.xlsx`, ... where batch `i` holds the
//! `i`-th row of every identity that has at least `i` rows. Merge mode
//! concatenates workbooks into one, tagging each row with its source file and
//! folder.
//!
//! # Quick Start (CLI)
//!
//! ```bash
//! # Regroup everything under ./exports into at most 5 workbooks
//! sheetsplit split ./exports --group-size 5 --output ./batches
//!
//! # Merge two workbooks
//! sheetsplit merge a.xlsx b.xlsx --output merged.xlsx
//!
//! # Show effective configuration and where each value came from
//! sheetsplit config
//! ```
//!
//! # Quick Start (Library)
//!
//! ```rust,no_run
//! use sheetsplit::{Config, SplitPipeline};
//!
//! # async fn demo() -> Result<(), sheetsplit::SheetSplitError> {
//! let config = Config::builder().group_size(5).output_dir("batches").build()?;
//! let stats = SplitPipeline::new(config).run(camino::Utf8Path::new("exports")).await?;
//! println!("{} workbooks written", stats.total_output);
//! # Ok(())
//! # }
//! ```
//!
//! # JSON Contracts
//!
//! `--json` prints an [`OperationResult`] in JCS (RFC 8785) canonical form;
//! use [`emit_jcs`] for the same output in your own integrations.

pub mod cli;

pub use sheetsplit_config::{CliArgs, Config, ConfigBuilder, ConfigSource, Selectors};
pub use sheetsplit_engine::{
    CellValue, DocumentScanner, GroupIndex, Ingestor, MergeEngine, OutputComposer, Record,
    RecordSet, SourceDocument, SplitPipeline,
};
pub use sheetsplit_utils::canonicalization::emit_jcs;
pub use sheetsplit_utils::error::{
    ConfigError, DiscoveryError, LoadFailure, SheetSplitError, UserFriendlyError, WriteFailure,
};
pub use sheetsplit_utils::exit_codes::ExitCode;
pub use sheetsplit_utils::types::{MergeStats, OperationResult, SkippedItem, SplitStats};
