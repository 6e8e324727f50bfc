//! Bounded-parallel loading of source documents.
//!
//! Each document is parsed on the blocking pool under a semaphore permit.
//! Handles are awaited in discovery order, which is the join barrier: the
//! resulting [`RecordSet`] is assembled in discovery order no matter which
//! load finishes first.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tracing::{Instrument, debug, info, warn};

use sheetsplit_utils::error::LoadFailure;
use sheetsplit_utils::types::SkippedItem;

use crate::discovery::SourceDocument;
use crate::reader::read_table;
use crate::record::{Record, RecordSet};

/// Outcome of loading one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentOutcome {
    Loaded { rows: usize },
    Failed(LoadFailure),
}

/// Per-document report, in discovery order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentReport {
    pub document: SourceDocument,
    pub outcome: DocumentOutcome,
}

/// Everything the ingestor produced
#[derive(Debug, Clone, Default)]
pub struct Ingestion {
    pub records: RecordSet,
    pub reports: Vec<DocumentReport>,
}

impl Ingestion {
    #[must_use]
    pub fn loaded_count(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| matches!(r.outcome, DocumentOutcome::Loaded { .. }))
            .count()
    }

    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.reports.len() - self.loaded_count()
    }

    /// Failed documents as reportable skip entries
    #[must_use]
    pub fn skipped_items(&self) -> Vec<SkippedItem> {
        self.reports
            .iter()
            .filter_map(|report| match &report.outcome {
                DocumentOutcome::Failed(failure) => Some(SkippedItem {
                    path: report.document.relative_path.clone(),
                    kind: failure.kind().to_string(),
                    reason: failure.to_string(),
                }),
                DocumentOutcome::Loaded { .. } => None,
            })
            .collect()
    }
}

/// Loads documents with a fixed number of concurrent workers
#[derive(Debug, Clone)]
pub struct Ingestor {
    workers: usize,
    timeout: Option<Duration>,
    required_column: Option<Arc<str>>,
}

impl Ingestor {
    #[must_use]
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            timeout: None,
            required_column: None,
        }
    }

    /// Treat loads running longer than `timeout` as failed
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Reject documents whose header lacks `column`
    #[must_use]
    pub fn require_column(mut self, column: &str) -> Self {
        self.required_column = Some(Arc::from(column));
        self
    }

    /// Load every document; per-document failures are recorded, never raised.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn ingest(&self, documents: &[SourceDocument]) -> Ingestion {
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut handles = Vec::with_capacity(documents.len());

        for (index, document) in documents.iter().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            let document = document.clone();
            let required = self.required_column.clone();
            let timeout = self.timeout;
            let span = tracing::debug_span!("load", document = %document.relative_path);

            handles.push(tokio::spawn(
                load_with_permit(semaphore, index, document, required, timeout).instrument(span),
            ));
        }

        let mut ingestion = Ingestion::default();
        for (document, handle) in documents.iter().zip(handles) {
            let result = handle.await.unwrap_or_else(|e| {
                Err(LoadFailure::Aborted {
                    reason: e.to_string(),
                })
            });

            let outcome = match result {
                Ok(records) => {
                    let rows = records.len();
                    info!(document = %document.relative_path, rows, "loaded");
                    ingestion.records.extend(records);
                    DocumentOutcome::Loaded { rows }
                }
                Err(failure) => {
                    warn!(
                        document = %document.relative_path,
                        kind = failure.kind(),
                        reason = %failure,
                        "skipped"
                    );
                    DocumentOutcome::Failed(failure)
                }
            };
            ingestion.reports.push(DocumentReport {
                document: document.clone(),
                outcome,
            });
        }

        debug!(
            loaded = ingestion.loaded_count(),
            failed = ingestion.failed_count(),
            records = ingestion.records.len(),
            "ingestion joined"
        );
        ingestion
    }
}

async fn load_with_permit(
    semaphore: Arc<Semaphore>,
    index: usize,
    document: SourceDocument,
    required: Option<Arc<str>>,
    timeout: Option<Duration>,
) -> Result<Vec<Record>, LoadFailure> {
    run_bounded(semaphore, timeout, move || {
        load_document(index, &document, required.as_deref())
    })
    .await
}

/// Run `work` on the blocking pool once a permit is available.
///
/// The permit moves into the blocking task and is released only when `work`
/// returns, so a timed-out load still occupies its worker slot until the
/// parse actually ends. Its late result is dropped.
async fn run_bounded<T, F>(
    semaphore: Arc<Semaphore>,
    timeout: Option<Duration>,
    work: F,
) -> Result<T, LoadFailure>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, LoadFailure> + Send + 'static,
{
    let permit = semaphore
        .acquire_owned()
        .await
        .map_err(|e| LoadFailure::Aborted {
            reason: e.to_string(),
        })?;

    let parent = tracing::Span::current();
    let load = tokio::task::spawn_blocking(move || {
        let _permit = permit;
        parent.in_scope(work)
    });

    let joined = match timeout {
        Some(limit) => tokio::time::timeout(limit, load)
            .await
            .map_err(|_| LoadFailure::TimedOut { limit })?,
        None => load.await,
    };

    joined.map_err(|e| LoadFailure::Aborted {
        reason: e.to_string(),
    })?
}

/// Read one document into records; all-or-nothing
pub fn load_document(
    index: usize,
    document: &SourceDocument,
    required_column: Option<&str>,
) -> Result<Vec<Record>, LoadFailure> {
    let table = read_table(&document.path)?;
    if let Some(column) = required_column
        && !table.has_column(column)
    {
        return Err(LoadFailure::MissingIdentityColumn {
            column: column.to_string(),
        });
    }
    Ok(table.into_records(index, document))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::CellValue;
    use camino::Utf8PathBuf;
    use sheetsplit_utils::test_support::{
        Cell, write_corrupt_workbook, write_identity_workbook, write_workbook,
    };
    use tempfile::TempDir;

    fn document(temp: &TempDir, rel: &str) -> SourceDocument {
        let path = Utf8PathBuf::try_from(temp.path().join(rel)).unwrap();
        SourceDocument::from_path(&path)
    }

    #[tokio::test]
    async fn test_failures_are_isolated_and_order_is_discovery_order() {
        let temp = TempDir::new().unwrap();
        let first = document(&temp, "a/first.xlsx");
        let broken = document(&temp, "b/broken.xlsx");
        let no_id = document(&temp, "c/no_id.xlsx");
        let last = document(&temp, "d/last.xlsx");
        write_identity_workbook(first.path.as_std_path(), &[("A", "1"), ("B", "2")]).unwrap();
        write_corrupt_workbook(broken.path.as_std_path()).unwrap();
        write_workbook(no_id.path.as_std_path(), &["Other"], &[vec!["x".into()]]).unwrap();
        write_identity_workbook(last.path.as_std_path(), &[("C", "3")]).unwrap();

        let docs = vec![first, broken, no_id, last];
        let ingestion = Ingestor::new(2)
            .require_column("BrowserID")
            .ingest(&docs)
            .await;

        assert_eq!(ingestion.loaded_count(), 2);
        assert_eq!(ingestion.failed_count(), 2);
        assert!(matches!(
            ingestion.reports[1].outcome,
            DocumentOutcome::Failed(LoadFailure::Unreadable { .. })
        ));
        assert_eq!(
            ingestion.reports[2].outcome,
            DocumentOutcome::Failed(LoadFailure::MissingIdentityColumn {
                column: "BrowserID".to_string()
            })
        );

        let ids: Vec<_> = ingestion
            .records
            .iter()
            .map(|r| (r.document(), r.get("BrowserID").cloned()))
            .collect();
        assert_eq!(
            ids,
            vec![
                (0, Some(CellValue::from("A"))),
                (0, Some(CellValue::from("B"))),
                (3, Some(CellValue::from("C"))),
            ]
        );

        let skipped = ingestion.skipped_items();
        assert_eq!(skipped.len(), 2);
        assert_eq!(skipped[0].path, docs[1].relative_path);
        assert_eq!(skipped[1].kind, "missing_identity_column");
    }

    #[tokio::test]
    async fn test_without_required_column_any_table_loads() {
        let temp = TempDir::new().unwrap();
        let doc = document(&temp, "plain.xlsx");
        write_workbook(doc.path.as_std_path(), &["Other"], &[vec!["x".into()]]).unwrap();

        let ingestion = Ingestor::new(1).ingest(&[doc]).await;

        assert_eq!(ingestion.loaded_count(), 1);
        assert_eq!(
            ingestion.reports[0].outcome,
            DocumentOutcome::Loaded { rows: 1 }
        );
    }

    #[tokio::test]
    async fn test_timed_out_load_keeps_its_worker_slot() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let semaphore = Arc::new(Semaphore::new(1));
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let finished = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..2 {
            let (active, peak, finished) =
                (Arc::clone(&active), Arc::clone(&peak), Arc::clone(&finished));
            handles.push(tokio::spawn(run_bounded(
                Arc::clone(&semaphore),
                Some(Duration::from_millis(1)),
                move || {
                    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    std::thread::sleep(Duration::from_millis(100));
                    active.fetch_sub(1, Ordering::SeqCst);
                    finished.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                },
            )));
        }

        for handle in handles {
            let result = handle.await.unwrap();
            assert!(matches!(result, Err(LoadFailure::TimedOut { .. })));
        }

        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while finished.load(Ordering::SeqCst) < 2 && std::time::Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(finished.load(Ordering::SeqCst), 2);
        assert_eq!(peak.load(Ordering::SeqCst), 1, "second parse overlapped the first");
    }

    #[tokio::test]
    async fn test_expired_timeout_is_counted_as_skipped_document() {
        let temp = TempDir::new().unwrap();
        let slow = document(&temp, "slow.xlsx");
        let rows: Vec<Vec<Cell>> = (0..20_000)
            .map(|i| vec![Cell::Text(format!("id-{i}")), Cell::Number(f64::from(i))])
            .collect();
        write_workbook(slow.path.as_std_path(), &["BrowserID", "Value"], &rows).unwrap();

        let ingestion = Ingestor::new(1)
            .with_timeout(Some(Duration::from_nanos(1)))
            .require_column("BrowserID")
            .ingest(&[slow])
            .await;

        assert_eq!(ingestion.loaded_count(), 0);
        assert_eq!(ingestion.failed_count(), 1);
        assert!(ingestion.records.is_empty());
        assert_eq!(
            ingestion.reports[0].outcome,
            DocumentOutcome::Failed(LoadFailure::TimedOut {
                limit: Duration::from_nanos(1)
            })
        );
        let skipped = ingestion.skipped_items();
        assert_eq!(skipped[0].kind, "timed_out");
        assert_eq!(skipped[0].reason, "load timed out after 1ns");
    }

    #[tokio::test]
    async fn test_no_documents_yields_empty_ingestion() {
        let ingestion = Ingestor::new(4).ingest(&[]).await;
        assert!(ingestion.records.is_empty());
        assert!(ingestion.reports.is_empty());
    }
}
