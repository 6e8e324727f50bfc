//! Serialization of record batches to `.xlsx` workbooks.

use camino::{Utf8Path, Utf8PathBuf};
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use std::collections::HashSet;
use std::fs;
use std::sync::Arc;
use tracing::{info, warn};

use sheetsplit_utils::atomic_write::write_bytes_atomic;
use sheetsplit_utils::error::{SheetSplitError, WriteFailure};

use crate::compose::OutputBatch;
use crate::record::{CellValue, Record, RecordSet};

const DATETIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// Largest magnitude an xlsx number cell (an f64) stores exactly
const MAX_EXACT_INT: u64 = 1 << 53;

/// `output_001.xlsx`, `output_002.xlsx`, ...
#[must_use]
pub fn output_file_name(index: usize) -> String {
    format!("output_{index:03}.xlsx")
}

/// Union of the records' columns in first-seen order
#[must_use]
pub fn column_union<'a>(records: impl IntoIterator<Item = &'a Record>) -> Vec<Arc<str>> {
    let mut seen: HashSet<Arc<str>> = HashSet::new();
    let mut columns = Vec::new();
    for record in records {
        for (name, _) in record.fields() {
            if seen.insert(Arc::clone(name)) {
                columns.push(Arc::clone(name));
            }
        }
    }
    columns
}

/// Render a single-sheet workbook: header row, then one row per record.
///
/// A record lacking a column leaves that cell blank.
pub fn render_workbook<'a>(
    columns: &[Arc<str>],
    records: impl IntoIterator<Item = &'a Record>,
) -> Result<Vec<u8>, WriteFailure> {
    build_workbook(columns, records).map_err(|e| WriteFailure::Serialize {
        reason: e.to_string(),
    })
}

fn build_workbook<'a>(
    columns: &[Arc<str>],
    records: impl IntoIterator<Item = &'a Record>,
) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let datetime = Format::new().set_num_format(DATETIME_FORMAT);
    let sheet = workbook.add_worksheet();

    for (col, name) in columns.iter().enumerate() {
        sheet.write_string(0, column_index(col)?, name.as_ref())?;
    }

    for (offset, record) in records.into_iter().enumerate() {
        let row = u32::try_from(offset + 1).map_err(|_| XlsxError::RowColumnLimitError)?;
        for (col, name) in columns.iter().enumerate() {
            let col = column_index(col)?;
            match record.get(name) {
                None | Some(CellValue::Empty) => {}
                Some(CellValue::Text(text)) => {
                    sheet.write_string(row, col, text)?;
                }
                Some(CellValue::Int(n)) if n.unsigned_abs() <= MAX_EXACT_INT => {
                    sheet.write_number(row, col, *n as f64)?;
                }
                Some(CellValue::Int(n)) => {
                    sheet.write_string(row, col, n.to_string())?;
                }
                Some(CellValue::Float(f)) if f.is_finite() => {
                    sheet.write_number(row, col, *f)?;
                }
                Some(CellValue::Float(f)) => {
                    sheet.write_string(row, col, f.to_string())?;
                }
                Some(CellValue::Bool(b)) => {
                    sheet.write_boolean(row, col, *b)?;
                }
                Some(CellValue::DateTime(serial)) => {
                    sheet.write_number_with_format(row, col, *serial, &datetime)?;
                }
            }
        }
    }

    workbook.save_to_buffer()
}

fn column_index(col: usize) -> Result<u16, XlsxError> {
    u16::try_from(col).map_err(|_| XlsxError::RowColumnLimitError)
}

/// Writes composed batches into an output directory
#[derive(Debug, Clone)]
pub struct BatchWriter {
    output_dir: Utf8PathBuf,
}

impl BatchWriter {
    /// Create the output directory (and parents) if absent
    pub fn create(output_dir: &Utf8Path) -> Result<Self, SheetSplitError> {
        fs::create_dir_all(output_dir).map_err(|e| SheetSplitError::OutputDirectory {
            path: output_dir.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
        })
    }

    #[must_use]
    pub fn output_dir(&self) -> &Utf8Path {
        &self.output_dir
    }

    /// Target path of a batch
    #[must_use]
    pub fn path_for(&self, batch: &OutputBatch) -> Utf8PathBuf {
        self.output_dir.join(output_file_name(batch.index))
    }

    /// Serialize one batch, replacing any existing file of the same name
    pub fn write_batch(
        &self,
        batch: &OutputBatch,
        records: &RecordSet,
    ) -> Result<Utf8PathBuf, WriteFailure> {
        let path = self.path_for(batch);
        let rows: Vec<&Record> = batch
            .members
            .iter()
            .filter_map(|&index| records.get(index))
            .collect();

        if rows.is_empty() {
            warn!(batch = batch.index, "batch has no rows, skipped");
            return Err(WriteFailure::Serialize {
                reason: "batch has no rows".to_string(),
            });
        }

        let columns = column_union(rows.iter().copied());
        let bytes = render_workbook(&columns, rows.iter().copied())?;
        write_bytes_atomic(&path, &bytes).map_err(|e| WriteFailure::Persist {
            path: path.to_string(),
            reason: format!("{e:#}"),
        })?;

        info!(path = %path, rows = rows.len(), columns = columns.len(), "written");
        Ok(path)
    }
}
