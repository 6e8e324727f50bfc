//! `sheetsplit split`

use anyhow::Result;
use camino::Utf8Path;

use sheetsplit_utils::error::UserFriendlyError;

use super::json_emit::emit_split_json;
use crate::{Config, ExitCode, OperationResult, SplitPipeline, SplitStats};

/// Run a split over `root` and print the summary (or JSON)
pub async fn execute_split_command(
    root: &Utf8Path,
    config: &Config,
    json: bool,
    strict: bool,
) -> Result<ExitCode> {
    let pipeline = SplitPipeline::new(config.clone());

    let stats = match pipeline.run(root).await {
        Ok(stats) => stats,
        Err(err) => {
            if json {
                let failed = OperationResult::<SplitStats>::failed(err.user_message());
                println!("{}", emit_split_json(&failed)?);
            }
            return Err(err.into());
        }
    };

    if json {
        println!("{}", emit_split_json(&OperationResult::succeeded(stats.clone()))?);
    } else {
        print_summary(root, &stats);
    }

    if strict && !stats.is_complete() {
        return Ok(ExitCode::PARTIAL_FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn print_summary(root: &Utf8Path, stats: &SplitStats) {
    if stats.discovered == 0 {
        println!("No workbooks found under {root}");
        return;
    }

    let mark = if stats.is_complete() { "✓" } else { "⚠" };
    println!("{mark} Split complete");
    println!("  Workbooks:    {} found, {} loaded", stats.discovered, stats.loaded);
    println!("  Identities:   {}", stats.identity_count);
    if stats.rows_without_identity > 0 {
        println!("  No identity:  {} row(s) left out", stats.rows_without_identity);
    }
    println!(
        "  Output:       {} written, {} failed in {}",
        stats.total_output, stats.failed_output, stats.output_dir
    );
    for output in &stats.outputs {
        println!("    {output}");
    }
    if !stats.skipped.is_empty() {
        println!("  Skipped:");
        for item in &stats.skipped {
            println!("    {} ({})", item.path, item.reason);
        }
    }
}
