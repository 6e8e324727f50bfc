use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Library-level error type with rich context and user-friendly reporting.
///
/// `SheetSplitError` covers the fatal conditions of a split or merge run:
/// anything that aborts the whole operation. Per-document and per-batch
/// problems are never raised as `SheetSplitError`; they are reported through
/// [`LoadFailure`] and [`WriteFailure`] outcomes and surface only as counts.
///
/// # Error Categories
///
/// | Category | Description |
/// |----------|-------------|
/// | `Config` | Configuration file or CLI argument errors |
/// | `Discovery` | Input root missing or not a directory |
/// | `NoIdentityColumn` | Ingested rows never carry the identity column |
/// | `NoValidData` | Every discovered document failed to load |
/// | `OutputDirectory` | Output directory could not be created |
/// | `MergeWriteFailed` | The single merge output could not be written |
///
/// # Exit Code Mapping
///
/// | Exit Code | Error Type |
/// |-----------|------------|
/// | 2 | Configuration/CLI argument errors |
/// | 3 | Input root missing or not a directory |
/// | 4 | No valid data / no identity column |
/// | 1 | Other errors |
///
/// # Example
///
/// ```rust
/// use sheetsplit_utils::error::{DiscoveryError, SheetSplitError};
/// use sheetsplit_utils::exit_codes::ExitCode;
///
/// let err = SheetSplitError::Discovery(DiscoveryError::DirectoryNotFound {
///     path: "/missing".to_string(),
/// });
/// assert_eq!(err.to_exit_code(), ExitCode::INPUT_NOT_FOUND);
/// assert!(err.display_for_user().contains("Suggestions:"));
/// ```
#[derive(Error, Debug)]
pub enum SheetSplitError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Discovery error: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error("No record carries the identity column '{column}'")]
    NoIdentityColumn { column: String },

    #[error("No valid data to {mode}: {attempted} document(s) attempted, none loaded")]
    NoValidData { mode: String, attempted: usize },

    #[error("Failed to create output directory {path}: {reason}")]
    OutputDirectory { path: String, reason: String },

    #[error("Failed to write merged workbook {path}: {reason}")]
    MergeWriteFailed { path: String, reason: String },
}

/// Trait for providing user-friendly error reporting with context and suggestions
pub trait UserFriendlyError {
    /// Get a user-friendly error message
    fn user_message(&self) -> String;

    /// Get contextual information about the error
    fn context(&self) -> Option<String>;

    /// Get suggested actions to resolve the error
    fn suggestions(&self) -> Vec<String>;

    /// Get the error category for grouping similar errors
    fn category(&self) -> ErrorCategory;
}

/// Categories of errors for better organization and handling
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Data,
    FileSystem,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "Configuration"),
            Self::Input => write!(f, "Input"),
            Self::Data => write!(f, "Data"),
            Self::FileSystem => write!(f, "File System"),
        }
    }
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration file: {0}")]
    InvalidFile(String),

    #[error("Invalid configuration value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found at {path}")]
    NotFound { path: String },
}

impl UserFriendlyError for ConfigError {
    fn user_message(&self) -> String {
        match self {
            Self::InvalidFile(reason) => {
                format!("Configuration file has invalid format: {reason}")
            }
            Self::InvalidValue { key, value } => {
                format!("Configuration '{key}' has invalid value: {value}")
            }
            Self::NotFound { path } => {
                format!("Configuration file not found: {path}")
            }
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::InvalidFile(_) => Some(
                "Configuration files must be valid TOML with optional [defaults] and [selectors] sections."
                    .to_string(),
            ),
            Self::InvalidValue { key, value: _ } => Some(format!(
                "The '{key}' configuration option has specific range requirements."
            )),
            Self::NotFound { path: _ } => Some(
                "sheetsplit searches for .sheetsplit/config.toml starting from the current directory upward."
                    .to_string(),
            ),
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidFile(_) => vec![
                "Check the TOML syntax using a TOML validator".to_string(),
                "Run 'sheetsplit config' to see which file was loaded".to_string(),
            ],
            Self::InvalidValue { key, value: _ } => match key.as_str() {
                "group_size" => vec![
                    "Use a positive integer, e.g. --group-size 10".to_string(),
                    "The value caps how many output workbooks are produced".to_string(),
                ],
                "workers" => vec![
                    "Use a worker count between 1 and 64".to_string(),
                    "Small pools (around 4) are usually enough for local disks".to_string(),
                ],
                "identity_column" => {
                    vec!["Provide the exact header name, e.g. BrowserID".to_string()]
                }
                "selectors.include" | "selectors.exclude" => vec![
                    "Check glob syntax, e.g. **/*.xlsx".to_string(),
                    "Escape literal brackets in file names".to_string(),
                ],
                _ => vec![
                    "Check the documentation for valid values for this option".to_string(),
                    "Remove the option to use the default value".to_string(),
                ],
            },
            Self::NotFound { path: _ } => vec![
                "Create .sheetsplit/config.toml in your project root".to_string(),
                "Use CLI flags instead of a configuration file".to_string(),
            ],
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Configuration
    }
}

/// Errors raised while enumerating input workbooks
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryError {
    #[error("Input directory does not exist: {path}")]
    DirectoryNotFound { path: String },

    #[error("Input path is not a directory: {path}")]
    NotADirectory { path: String },

    #[error("Failed to scan {path}: {reason}")]
    ScanFailed { path: String, reason: String },
}

impl UserFriendlyError for DiscoveryError {
    fn user_message(&self) -> String {
        match self {
            Self::DirectoryNotFound { path } => format!("Input folder '{path}' does not exist"),
            Self::NotADirectory { path } => format!("Input path '{path}' is a file, not a folder"),
            Self::ScanFailed { path, reason } => {
                format!("Could not scan '{path}' for workbooks: {reason}")
            }
        }
    }

    fn context(&self) -> Option<String> {
        Some(
            "Workbooks are collected recursively below the input folder; lock files starting with ~$ are ignored."
                .to_string(),
        )
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::DirectoryNotFound { .. } => vec![
                "Check the spelling of the input folder".to_string(),
                "Use an absolute path if running from another directory".to_string(),
            ],
            Self::NotADirectory { .. } => vec![
                "Pass the folder that contains the workbooks".to_string(),
                "Use 'sheetsplit merge' to combine explicit workbook files".to_string(),
            ],
            Self::ScanFailed { .. } => vec![
                "Check read permissions on the input folder and its subfolders".to_string(),
            ],
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Input
    }
}

/// Why a single input document was skipped.
///
/// Load failures are recoverable: the document contributes no rows and the
/// run continues with the remaining documents.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadFailure {
    #[error("unreadable workbook: {reason}")]
    Unreadable { reason: String },

    #[error("workbook has no worksheets")]
    NoWorksheet,

    #[error("table has no data rows")]
    EmptyTable,

    #[error("missing identity column '{column}'")]
    MissingIdentityColumn { column: String },

    #[error("load timed out after {limit:?}")]
    TimedOut { limit: Duration },

    #[error("load task aborted: {reason}")]
    Aborted { reason: String },
}

impl LoadFailure {
    /// Stable short label used in structured logs and JSON output
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Unreadable { .. } => "unreadable",
            Self::NoWorksheet => "no_worksheet",
            Self::EmptyTable => "empty_table",
            Self::MissingIdentityColumn { .. } => "missing_identity_column",
            Self::TimedOut { .. } => "timed_out",
            Self::Aborted { .. } => "aborted",
        }
    }
}

/// Why a single output workbook could not be produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WriteFailure {
    #[error("failed to serialize workbook: {reason}")]
    Serialize { reason: String },

    #[error("failed to persist {path}: {reason}")]
    Persist { path: String, reason: String },
}

impl WriteFailure {
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Serialize { .. } => "serialize_failed",
            Self::Persist { .. } => "persist_failed",
        }
    }
}

impl UserFriendlyError for SheetSplitError {
    fn user_message(&self) -> String {
        match self {
            Self::Config(config_err) => config_err.user_message(),
            Self::Discovery(discovery_err) => discovery_err.user_message(),
            Self::NoIdentityColumn { column } => {
                format!("None of the loaded rows has a '{column}' column")
            }
            Self::NoValidData { mode, attempted } => format!(
                "Nothing to {mode}: all {attempted} workbook(s) were empty, unreadable, or missing required columns"
            ),
            Self::OutputDirectory { path, reason } => {
                format!("Could not create output folder '{path}': {reason}")
            }
            Self::MergeWriteFailed { path, reason } => {
                format!("Could not save merged workbook '{path}': {reason}")
            }
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::Config(config_err) => config_err.context(),
            Self::Discovery(discovery_err) => discovery_err.context(),
            Self::NoIdentityColumn { .. } => Some(
                "Rows are regrouped by the identity column, so at least one workbook must provide it."
                    .to_string(),
            ),
            Self::NoValidData { .. } => Some(
                "Each skipped workbook is logged with its reason above this message.".to_string(),
            ),
            Self::OutputDirectory { .. } | Self::MergeWriteFailed { .. } => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Config(config_err) => config_err.suggestions(),
            Self::Discovery(discovery_err) => discovery_err.suggestions(),
            Self::NoIdentityColumn { column } => vec![
                format!("Check that the header row contains '{column}' exactly"),
                "Use --identity-column to regroup by a different header".to_string(),
            ],
            Self::NoValidData { .. } => vec![
                "Run with --verbose to see why each workbook was skipped".to_string(),
                "Close the workbooks in Excel and retry if they are locked".to_string(),
            ],
            Self::OutputDirectory { .. } | Self::MergeWriteFailed { .. } => vec![
                "Check write permissions on the output location".to_string(),
                "Close any output workbook that is open in Excel".to_string(),
            ],
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(_) => ErrorCategory::Configuration,
            Self::Discovery(_) => ErrorCategory::Input,
            Self::NoIdentityColumn { .. } | Self::NoValidData { .. } => ErrorCategory::Data,
            Self::OutputDirectory { .. } | Self::MergeWriteFailed { .. } => {
                ErrorCategory::FileSystem
            }
        }
    }
}

impl SheetSplitError {
    /// Get a user-friendly error message with context and actionable suggestions.
    ///
    /// ```text
    /// Error: <user message>
    ///
    /// Context: <context if available>
    ///
    /// Suggestions:
    ///   • <suggestion 1>
    /// ```
    #[must_use]
    pub fn display_for_user(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("Error: {}\n", self.user_message()));

        if let Some(ctx) = self.context() {
            output.push_str(&format!("\nContext: {ctx}\n"));
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for suggestion in suggestions {
                output.push_str(&format!("  • {suggestion}\n"));
            }
        }

        output
    }

    /// Map this error to the appropriate CLI exit code.
    #[must_use]
    pub fn to_exit_code(&self) -> crate::exit_codes::ExitCode {
        use crate::exit_codes::ExitCode;

        match self {
            SheetSplitError::Config(_) => ExitCode::CLI_ARGS,
            SheetSplitError::Discovery(DiscoveryError::ScanFailed { .. }) => ExitCode::INTERNAL,
            SheetSplitError::Discovery(_) => ExitCode::INPUT_NOT_FOUND,
            SheetSplitError::NoIdentityColumn { .. } | SheetSplitError::NoValidData { .. } => {
                ExitCode::NO_VALID_DATA
            }
            SheetSplitError::OutputDirectory { .. } | SheetSplitError::MergeWriteFailed { .. } => {
                ExitCode::INTERNAL
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exit_codes::ExitCode;

    #[test]
    fn test_discovery_errors_map_to_input_exit_code() {
        let missing = SheetSplitError::from(DiscoveryError::DirectoryNotFound {
            path: "/nope".to_string(),
        });
        let file = SheetSplitError::from(DiscoveryError::NotADirectory {
            path: "/etc/hosts".to_string(),
        });
        assert_eq!(missing.to_exit_code(), ExitCode::INPUT_NOT_FOUND);
        assert_eq!(file.to_exit_code(), ExitCode::INPUT_NOT_FOUND);
        assert_eq!(missing.category(), ErrorCategory::Input);
    }

    #[test]
    fn test_no_valid_data_report_has_suggestions() {
        let err = SheetSplitError::NoValidData {
            mode: "split".to_string(),
            attempted: 3,
        };
        let report = err.display_for_user();
        assert!(report.starts_with("Error: Nothing to split: all 3 workbook(s)"));
        assert!(report.contains("Context:"));
        assert!(report.contains("  • Run with --verbose"));
        assert_eq!(err.to_exit_code(), ExitCode::NO_VALID_DATA);
    }

    #[test]
    fn test_config_invalid_value_suggestions_are_key_specific() {
        let err = ConfigError::InvalidValue {
            key: "group_size".to_string(),
            value: "must be greater than 0".to_string(),
        };
        assert!(err.suggestions()[0].contains("--group-size"));
        assert_eq!(
            SheetSplitError::from(err).to_exit_code(),
            ExitCode::CLI_ARGS
        );
    }

    #[test]
    fn test_output_failures_are_internal_filesystem_errors() {
        let err = SheetSplitError::OutputDirectory {
            path: "out".to_string(),
            reason: "permission denied".to_string(),
        };
        assert_eq!(err.to_exit_code(), ExitCode::INTERNAL);
        assert_eq!(err.category(), ErrorCategory::FileSystem);
        assert!(err.context().is_none());
        assert!(err.user_message().contains("'out'"));
    }

    #[test]
    fn test_load_failure_kinds_are_stable() {
        assert_eq!(LoadFailure::EmptyTable.kind(), "empty_table");
        assert_eq!(
            LoadFailure::MissingIdentityColumn {
                column: "BrowserID".to_string()
            }
            .to_string(),
            "missing identity column 'BrowserID'"
        );
        let timed_out = LoadFailure::TimedOut {
            limit: Duration::from_millis(250),
        };
        assert_eq!(timed_out.kind(), "timed_out");
        assert_eq!(timed_out.to_string(), "load timed out after 250ms");
    }
}
