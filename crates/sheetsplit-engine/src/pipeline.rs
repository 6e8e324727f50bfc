//! Split mode: discover → ingest → join → group → compose → write.

use camino::{Utf8Path, Utf8PathBuf};
use std::collections::BTreeMap;
use tracing::{Instrument, debug, info, warn};

use sheetsplit_config::Config;
use sheetsplit_utils::error::SheetSplitError;
use sheetsplit_utils::logging::{StageTimer, stage_span};
use sheetsplit_utils::types::{SkippedItem, SplitStats};

use crate::compose::{OutputComposer, batch_count};
use crate::discovery::{DocumentScanner, SourceDocument};
use crate::group::GroupIndex;
use crate::ingest::{Ingestion, Ingestor};
use crate::writer::BatchWriter;

/// Runs the whole split for one input root
#[derive(Debug, Clone)]
pub struct SplitPipeline {
    config: Config,
}

impl SplitPipeline {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the split.
    ///
    /// Fatal: invalid root, no document loaded, or no record carries the
    /// identity column. Skipped documents and failed batches are reported in
    /// the returned stats.
    pub async fn run(&self, root: &Utf8Path) -> Result<SplitStats, SheetSplitError> {
        let output_dir = self.output_dir()?;
        let scanner = DocumentScanner::new(&self.config.selectors)?;
        let documents = stage_span("discover").in_scope(|| discover(&scanner, root))?;

        let mut stats = SplitStats {
            discovered: documents.len(),
            output_dir: output_dir.to_string(),
            ..SplitStats::default()
        };
        if documents.is_empty() {
            warn!(root = %root, "no workbooks found");
            return Ok(stats);
        }

        let ingestion = self
            .ingestor()
            .ingest(&documents)
            .instrument(stage_span("ingest"))
            .await;
        stats.loaded = ingestion.loaded_count();
        stats.skipped = ingestion.skipped_items();
        if stats.loaded == 0 {
            return Err(SheetSplitError::NoValidData {
                mode: "split".to_string(),
                attempted: documents.len(),
            });
        }

        let groups = stage_span("group").in_scope(|| self.group(&ingestion))?;
        stats.identity_count = groups.len();
        stats.rows_without_identity = groups.rows_without_identity();

        let composer = OutputComposer::new(self.config.group_size());
        stats.batch_count = stage_span("compose").in_scope(|| {
            let count = batch_count(self.config.group_size(), &groups);
            info!(
                batches = count,
                group_size = self.config.group_size(),
                largest_group = groups.max_group_len(),
                "batch count derived"
            );
            count
        });
        if stats.batch_count == 0 {
            info!("no identity groups, nothing to write");
            return Ok(stats);
        }

        stage_span("write").in_scope(|| {
            let timer = StageTimer::start("write");
            let writer = BatchWriter::create(&output_dir)?;
            for batch in composer.compose(&groups) {
                if batch.members.is_empty() {
                    warn!(batch = batch.index, "batch has no rows, skipped");
                    continue;
                }
                match writer.write_batch(&batch, &ingestion.records) {
                    Ok(path) => {
                        stats.total_output += 1;
                        stats.outputs.push(path.to_string());
                    }
                    Err(failure) => {
                        let path = writer.path_for(&batch);
                        warn!(path = %path, reason = %failure, "batch write failed");
                        stats.failed_output += 1;
                        stats.skipped.push(SkippedItem {
                            path: path.to_string(),
                            kind: failure.kind().to_string(),
                            reason: failure.to_string(),
                        });
                    }
                }
            }
            timer.finish(stats.total_output);
            Ok::<_, SheetSplitError>(())
        })?;

        info!(
            written = stats.total_output,
            failed = stats.failed_output,
            identities = stats.identity_count,
            skipped_documents = stats.discovered - stats.loaded,
            "split complete"
        );
        Ok(stats)
    }

    fn output_dir(&self) -> Result<Utf8PathBuf, SheetSplitError> {
        let dir = self.config.output_dir();
        Utf8PathBuf::from_path_buf(dir).map_err(|dir| SheetSplitError::OutputDirectory {
            path: dir.display().to_string(),
            reason: "path is not valid UTF-8".to_string(),
        })
    }

    fn ingestor(&self) -> Ingestor {
        Ingestor::new(self.config.workers())
            .with_timeout(self.config.load_timeout())
            .require_column(self.config.identity_column())
    }

    fn group(&self, ingestion: &Ingestion) -> Result<GroupIndex, SheetSplitError> {
        let timer = StageTimer::start("group");
        let groups = GroupIndex::build(&ingestion.records, self.config.identity_column())?;
        if groups.rows_without_identity() > 0 {
            warn!(
                rows = groups.rows_without_identity(),
                "rows with a blank identity were left out"
            );
        }
        timer.finish(groups.len());
        Ok(groups)
    }
}

fn discover(
    scanner: &DocumentScanner,
    root: &Utf8Path,
) -> Result<Vec<SourceDocument>, SheetSplitError> {
    let timer = StageTimer::start("discover");
    let documents = scanner.scan(root)?;

    let mut by_extension: BTreeMap<String, usize> = BTreeMap::new();
    for document in &documents {
        debug!(document = %document.relative_path, "found");
        let extension = document
            .path
            .extension()
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        *by_extension.entry(extension).or_default() += 1;
    }
    info!(root = %root, count = documents.len(), by_extension = ?by_extension, "discovered");

    timer.finish(documents.len());
    Ok(documents)
}
