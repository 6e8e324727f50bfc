//! Workbook reading: first worksheet, first row as header.

use calamine::{Data, Reader, open_workbook_auto};
use camino::Utf8Path;
use std::collections::HashSet;
use std::sync::Arc;

use sheetsplit_utils::error::LoadFailure;

use crate::discovery::SourceDocument;
use crate::record::{CellValue, Record, SOURCE_FILE_COLUMN, SOURCE_FOLDER_COLUMN};

/// Rows of one worksheet under normalized, unique headers
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub headers: Vec<Arc<str>>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    #[must_use]
    pub fn has_column(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h.as_ref() == column)
    }

    /// Turn rows into records stamped with `SourceFile` and `SourceFolder`
    #[must_use]
    pub fn into_records(self, document: usize, source: &SourceDocument) -> Vec<Record> {
        let file_column: Arc<str> = Arc::from(SOURCE_FILE_COLUMN);
        let folder_column: Arc<str> = Arc::from(SOURCE_FOLDER_COLUMN);
        let headers = self.headers;

        self.rows
            .into_iter()
            .map(|row| {
                let fields = headers.iter().cloned().zip(row).collect();
                let mut record = Record::new(document, fields);
                record.set(&file_column, CellValue::Text(source.file_name.clone()));
                record.set(&folder_column, CellValue::Text(source.folder.clone()));
                record
            })
            .collect()
    }
}

/// Read the first worksheet of a workbook.
///
/// Fails with `EmptyTable` when no data row survives after dropping rows whose
/// cells are all empty.
pub fn read_table(path: &Utf8Path) -> Result<Table, LoadFailure> {
    let mut workbook = open_workbook_auto(path.as_std_path()).map_err(|e| {
        LoadFailure::Unreadable {
            reason: e.to_string(),
        }
    })?;

    let range = match workbook.worksheet_range_at(0) {
        None => return Err(LoadFailure::NoWorksheet),
        Some(Err(e)) => {
            return Err(LoadFailure::Unreadable {
                reason: e.to_string(),
            });
        }
        Some(Ok(range)) => range,
    };

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Err(LoadFailure::EmptyTable);
    };
    let headers = normalize_headers(header_row);

    let rows: Vec<Vec<CellValue>> = rows
        .map(|row| row.iter().map(convert_cell).collect::<Vec<_>>())
        .filter(|row| !row.iter().all(CellValue::is_empty))
        .collect();

    if rows.is_empty() {
        return Err(LoadFailure::EmptyTable);
    }

    Ok(Table { headers, rows })
}

fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::Int(n) => CellValue::Int(*n),
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::DateTime(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(e.to_string()),
    }
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) if f.fract() == 0.0 && f.is_finite() => format!("{}", *f as i64),
        other => other.to_string(),
    }
}

/// Blank headers become `Unnamed: {i}`; repeats get `.1`, `.2`, ... suffixes
fn normalize_headers(row: &[Data]) -> Vec<Arc<str>> {
    let mut seen: HashSet<String> = HashSet::with_capacity(row.len());
    row.iter()
        .enumerate()
        .map(|(index, cell)| {
            let text = header_text(cell);
            let base = if text.trim().is_empty() {
                format!("Unnamed: {index}")
            } else {
                text
            };
            let mut name = base.clone();
            let mut suffix = 1;
            while seen.contains(&name) {
                name = format!("{base}.{suffix}");
                suffix += 1;
            }
            seen.insert(name.clone());
            Arc::from(name)
        })
        .collect()
}
