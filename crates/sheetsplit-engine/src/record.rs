//! Row model shared by every stage: cell values, records, and identity keys.

use std::cmp::Ordering;
use std::sync::Arc;

/// Provenance column holding the originating file name
pub const SOURCE_FILE_COLUMN: &str = "SourceFile";

/// Provenance column holding the originating folder name
pub const SOURCE_FOLDER_COLUMN: &str = "SourceFolder";

/// One cell value, typed as read from the workbook
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// Excel serial date-time (days since 1899-12-30)
    DateTime(f64),
}

impl CellValue {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(text) => text.is_empty(),
            _ => false,
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// One row: an ordered list of named fields plus the index of its document.
///
/// Field order is the source document's column order; provenance fields are
/// appended after the document's own columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    document: usize,
    fields: Vec<(Arc<str>, CellValue)>,
}

impl Record {
    #[must_use]
    pub fn new(document: usize, fields: Vec<(Arc<str>, CellValue)>) -> Self {
        Self { document, fields }
    }

    /// Index of the originating document in discovery order
    #[must_use]
    pub fn document(&self) -> usize {
        self.document
    }

    #[must_use]
    pub fn fields(&self) -> &[(Arc<str>, CellValue)] {
        &self.fields
    }

    #[must_use]
    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.fields
            .iter()
            .find(|(name, _)| name.as_ref() == column)
            .map(|(_, value)| value)
    }

    /// Overwrite a field in place, or append it when the column is new
    pub fn set(&mut self, column: &Arc<str>, value: CellValue) {
        match self.fields.iter_mut().find(|(name, _)| name == column) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((Arc::clone(column), value)),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Flat arena of every loaded record, in discovery order then row order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    records: Vec<Record>,
}

impl RecordSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append all rows of one document
    pub fn extend(&mut self, records: impl IntoIterator<Item = Record>) {
        self.records.extend(records);
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// True when at least one record carries `column`
    #[must_use]
    pub fn has_column(&self, column: &str) -> bool {
        self.records.iter().any(|r| r.get(column).is_some())
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Canonical string form of an identity cell, `None` when blank.
///
/// Integer-valued floats lose their fractional suffix so `42.0` read from one
/// workbook groups with `42` read from another.
#[must_use]
pub fn normalize_identity(value: &CellValue) -> Option<String> {
    match value {
        CellValue::Empty => None,
        CellValue::Text(text) => {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        CellValue::Int(n) => Some(n.to_string()),
        CellValue::Float(f) | CellValue::DateTime(f) => Some(format_number(*f)),
        CellValue::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
    }
}

fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e18 {
        // Exact for |value| < 2^63
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Ordering key of a group: numeric identities first, then text.
#[derive(Debug, Clone)]
pub enum IdentityKey {
    Numeric { value: f64, text: String },
    Text(String),
}

impl IdentityKey {
    /// Classify a normalized identity
    #[must_use]
    pub fn from_normalized(text: String) -> Self {
        match text.parse::<f64>() {
            Ok(value) if value.is_finite() && looks_numeric(&text) => {
                Self::Numeric { value, text }
            }
            _ => Self::Text(text),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Numeric { text, .. } | Self::Text(text) => text,
        }
    }
}

// Rejects forms `f64::from_str` accepts but users do not read as numbers
fn looks_numeric(text: &str) -> bool {
    text.bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'-' | b'+' | b'.' | b'e' | b'E'))
}

impl Ord for IdentityKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Numeric { value: a, text: ta }, Self::Numeric { value: b, text: tb }) => {
                a.total_cmp(b).then_with(|| ta.cmp(tb))
            }
            (Self::Numeric { .. }, Self::Text(_)) => Ordering::Less,
            (Self::Text(_), Self::Numeric { .. }) => Ordering::Greater,
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for IdentityKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for IdentityKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for IdentityKey {}

impl std::fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_identity_forms() {
        assert_eq!(normalize_identity(&CellValue::Empty), None);
        assert_eq!(normalize_identity(&CellValue::Text("   ".into())), None);
        assert_eq!(
            normalize_identity(&CellValue::Text("  abc ".into())),
            Some("abc".to_string())
        );
        assert_eq!(normalize_identity(&CellValue::Int(42)), Some("42".into()));
        assert_eq!(normalize_identity(&CellValue::Float(42.0)), Some("42".into()));
        assert_eq!(normalize_identity(&CellValue::Float(-3.0)), Some("-3".into()));
        assert_eq!(normalize_identity(&CellValue::Float(2.5)), Some("2.5".into()));
        assert_eq!(normalize_identity(&CellValue::Bool(true)), Some("1".into()));
    }

    #[test]
    fn test_identity_key_orders_numbers_before_text() {
        let mut keys: Vec<IdentityKey> = ["b", "10", "a", "9", "2.5", "007"]
            .into_iter()
            .map(|s| IdentityKey::from_normalized(s.to_string()))
            .collect();
        keys.sort();
        let ordered: Vec<&str> = keys.iter().map(IdentityKey::as_str).collect();
        assert_eq!(ordered, vec!["2.5", "007", "9", "10", "a", "b"]);
    }

    #[test]
    fn test_numeric_keys_with_different_text_are_distinct() {
        let a = IdentityKey::from_normalized("7".to_string());
        let b = IdentityKey::from_normalized("007".to_string());
        assert_ne!(a, b);
        assert_eq!(a, IdentityKey::from_normalized("7".to_string()));
    }

    #[test]
    fn test_nan_and_inf_text_stay_textual() {
        assert!(matches!(
            IdentityKey::from_normalized("inf".to_string()),
            IdentityKey::Text(_)
        ));
        assert!(matches!(
            IdentityKey::from_normalized("NaN".to_string()),
            IdentityKey::Text(_)
        ));
    }

    #[test]
    fn test_record_set_overwrites_existing_field() {
        let file: Arc<str> = Arc::from(SOURCE_FILE_COLUMN);
        let mut record = Record::new(0, vec![(Arc::from("BrowserID"), CellValue::Int(1))]);

        record.set(&file, CellValue::from("a.xlsx"));
        record.set(&file, CellValue::from("b.xlsx"));

        assert_eq!(record.len(), 2);
        assert_eq!(record.get(SOURCE_FILE_COLUMN), Some(&CellValue::from("b.xlsx")));
    }
}
