//! `sheetsplit merge`

use anyhow::Result;
use camino::{Utf8Path, Utf8PathBuf};

use sheetsplit_utils::error::{SheetSplitError, UserFriendlyError};

use super::json_emit::emit_merge_json;
use crate::{Config, DocumentScanner, ExitCode, MergeEngine, MergeStats, OperationResult, SourceDocument};

/// Merge the given files (plus any found under `from_dir`) into `output`
pub async fn execute_merge_command(
    files: &[Utf8PathBuf],
    from_dir: Option<&Utf8Path>,
    output: &Utf8Path,
    config: &Config,
    json: bool,
    strict: bool,
) -> Result<ExitCode> {
    let outcome = match collect_documents(files, from_dir, config) {
        Ok(documents) => {
            MergeEngine::new(config.workers(), config.load_timeout())
                .merge(&documents, output)
                .await
        }
        Err(err) => Err(err),
    };

    let stats = match outcome {
        Ok(stats) => stats,
        Err(err) => {
            if json {
                let failed = OperationResult::<MergeStats>::failed(err.user_message());
                println!("{}", emit_merge_json(&failed)?);
            }
            return Err(err.into());
        }
    };

    if json {
        println!("{}", emit_merge_json(&OperationResult::succeeded(stats.clone()))?);
    } else {
        let mark = if stats.is_complete() { "✓" } else { "⚠" };
        println!("{mark} Merge complete");
        println!("  Files merged: {}", stats.merged_files_count);
        println!("  Rows:         {}", stats.total_rows);
        println!("  Output:       {}", stats.output_file);
        for item in &stats.skipped {
            println!("  Skipped:      {} ({})", item.path, item.reason);
        }
    }

    if strict && !stats.is_complete() {
        return Ok(ExitCode::PARTIAL_FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn collect_documents(
    files: &[Utf8PathBuf],
    from_dir: Option<&Utf8Path>,
    config: &Config,
) -> Result<Vec<SourceDocument>, SheetSplitError> {
    let mut documents: Vec<SourceDocument> =
        files.iter().map(|f| SourceDocument::from_path(f)).collect();

    if let Some(dir) = from_dir {
        let scanner = DocumentScanner::new(&config.selectors)?;
        let found = scanner.scan(dir)?;
        tracing::info!(root = %dir, count = found.len(), "discovered");
        documents.extend(found);
    }

    Ok(documents)
}
