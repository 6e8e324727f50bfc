use serde::{Deserialize, Serialize};

/// Where an effective configuration value came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    /// Value provided via CLI argument (highest precedence).
    Cli,
    /// Value provided through a `SHEETSPLIT_*` environment variable.
    Env,
    /// Value loaded from configuration file.
    Config,
    /// Value provided programmatically (e.g., `Config::builder()`).
    Programmatic,
    /// Built-in default value (lowest precedence).
    Default,
}

/// One document or batch that was skipped during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedItem {
    /// Path of the input document or intended output file
    pub path: String,
    /// Stable machine-readable reason (`empty_table`, `unreadable`, ...)
    pub kind: String,
    /// Human-readable reason
    pub reason: String,
}

/// Statistics for a completed split run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitStats {
    /// Output workbooks successfully written
    pub total_output: usize,
    /// Output workbooks that failed to write
    pub failed_output: usize,
    /// Distinct identities found across all loaded documents
    pub identity_count: usize,
    /// Batches composed (`min(group_size, largest group)`)
    pub batch_count: usize,
    /// Documents found by discovery
    pub discovered: usize,
    /// Documents that loaded successfully
    pub loaded: usize,
    /// Rows excluded from grouping because their identity was blank
    pub rows_without_identity: usize,
    /// Output directory
    pub output_dir: String,
    /// Written output file paths, in batch order
    pub outputs: Vec<String>,
    /// Documents skipped during ingestion, then batches that failed to write
    pub skipped: Vec<SkippedItem>,
}

impl SplitStats {
    /// True when every discovered document loaded and every batch was written
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty() && self.failed_output == 0
    }
}

/// Statistics for a completed merge run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeStats {
    /// Documents whose rows were merged
    pub merged_files_count: usize,
    /// Rows in the merged workbook
    pub total_rows: usize,
    /// Path of the merged workbook
    pub output_file: String,
    /// Documents skipped because they were empty or unreadable
    pub skipped: Vec<SkippedItem>,
}

impl MergeStats {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Result object handed to callers (CLI, embedding applications).
///
/// Serializes as `{"success": true, ...stats}` or
/// `{"success": false, "error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationResult<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub stats: Option<T>,
}

impl<T> OperationResult<T> {
    #[must_use]
    pub fn succeeded(stats: T) -> Self {
        Self {
            success: true,
            error: None,
            stats: Some(stats),
        }
    }

    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            stats: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonicalization::emit_jcs;

    #[test]
    fn test_failed_result_serializes_without_stats() {
        let result: OperationResult<SplitStats> = OperationResult::failed("no data");
        assert_eq!(
            emit_jcs(&result).unwrap(),
            r#"{"error":"no data","success":false}"#
        );
    }

    #[test]
    fn test_succeeded_result_flattens_stats() {
        let result = OperationResult::succeeded(MergeStats {
            merged_files_count: 2,
            total_rows: 7,
            output_file: "merged.xlsx".to_string(),
            skipped: Vec::new(),
        });
        let json = emit_jcs(&result).unwrap();
        assert_eq!(
            json,
            r#"{"merged_files_count":2,"output_file":"merged.xlsx","skipped":[],"success":true,"total_rows":7}"#
        );
    }

    #[test]
    fn test_split_stats_completeness() {
        let mut stats = SplitStats::default();
        assert!(stats.is_complete());
        stats.failed_output = 1;
        assert!(!stats.is_complete());
    }
}
