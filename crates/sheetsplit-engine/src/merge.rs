//! Merge mode: concatenate every readable document into one workbook.

use camino::Utf8Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{Instrument, info};

use sheetsplit_utils::atomic_write::write_bytes_atomic;
use sheetsplit_utils::error::SheetSplitError;
use sheetsplit_utils::logging::{StageTimer, stage_span};
use sheetsplit_utils::types::MergeStats;

use crate::discovery::SourceDocument;
use crate::ingest::Ingestor;
use crate::record::{Record, SOURCE_FILE_COLUMN, SOURCE_FOLDER_COLUMN};
use crate::writer::{column_union, render_workbook};

/// Concatenates documents without grouping; no identity column is required
#[derive(Debug, Clone)]
pub struct MergeEngine {
    ingestor: Ingestor,
}

impl MergeEngine {
    #[must_use]
    pub fn new(workers: usize, load_timeout: Option<Duration>) -> Self {
        Self {
            ingestor: Ingestor::new(workers).with_timeout(load_timeout),
        }
    }

    /// Merge `documents` (in the given order) into `destination`.
    ///
    /// Skips documents that fail to load; fails only when none loaded or the
    /// merged workbook cannot be written.
    pub async fn merge(
        &self,
        documents: &[SourceDocument],
        destination: &Utf8Path,
    ) -> Result<MergeStats, SheetSplitError> {
        let ingestion = self
            .ingestor
            .ingest(documents)
            .instrument(stage_span("ingest"))
            .await;

        let merged_files_count = ingestion.loaded_count();
        if merged_files_count == 0 {
            return Err(SheetSplitError::NoValidData {
                mode: "merge".to_string(),
                attempted: documents.len(),
            });
        }

        let records = ingestion.records.records();
        stage_span("merge").in_scope(|| write_merged(records, destination))?;
        info!(
            path = %destination,
            files = merged_files_count,
            rows = records.len(),
            "merged"
        );

        Ok(MergeStats {
            merged_files_count,
            total_rows: records.len(),
            output_file: destination.to_string(),
            skipped: ingestion.skipped_items(),
        })
    }
}

fn write_merged(records: &[Record], destination: &Utf8Path) -> Result<(), SheetSplitError> {
    let timer = StageTimer::start("merge");
    let failed = |reason: String| SheetSplitError::MergeWriteFailed {
        path: destination.to_string(),
        reason,
    };

    let columns = provenance_last(column_union(records));
    let bytes = render_workbook(&columns, records).map_err(|e| failed(e.to_string()))?;
    write_bytes_atomic(destination, &bytes).map_err(|e| failed(format!("{e:#}")))?;

    timer.finish(records.len());
    Ok(())
}

/// Move `SourceFile` then `SourceFolder` to the end of the column order
#[must_use]
pub fn provenance_last(columns: Vec<Arc<str>>) -> Vec<Arc<str>> {
    let is_provenance =
        |name: &Arc<str>| name.as_ref() == SOURCE_FILE_COLUMN || name.as_ref() == SOURCE_FOLDER_COLUMN;
    let (mut data, _): (Vec<_>, Vec<_>) = columns.into_iter().partition(|c| !is_provenance(c));
    data.push(Arc::from(SOURCE_FILE_COLUMN));
    data.push(Arc::from(SOURCE_FOLDER_COLUMN));
    data
}
