//! Identity-keyed regrouping of spreadsheet rows.
//!
//! Split mode discovers workbooks under a root, loads them concurrently,
//! groups rows by identity and writes batch `i` with the `i`-th row of every
//! group. Merge mode concatenates workbooks into one.

pub mod compose;
pub mod discovery;
pub mod group;
pub mod ingest;
pub mod merge;
pub mod pipeline;
pub mod reader;
pub mod record;
pub mod writer;

pub use compose::{OutputBatch, OutputComposer, batch_count};
pub use discovery::{DocumentScanner, SourceDocument};
pub use group::GroupIndex;
pub use ingest::{DocumentOutcome, DocumentReport, Ingestion, Ingestor};
pub use merge::MergeEngine;
pub use pipeline::SplitPipeline;
pub use record::{
    CellValue, IdentityKey, Record, RecordSet, SOURCE_FILE_COLUMN, SOURCE_FOLDER_COLUMN,
    normalize_identity,
};
pub use writer::{BatchWriter, output_file_name};
