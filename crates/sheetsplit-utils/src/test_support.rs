//! Workbook fixtures for tests.
//!
//! Fixtures are written with the same writer the engine uses for output, so
//! tests exercise real `.xlsx` files end to end.

use anyhow::{Context, Result};
use rust_xlsxwriter::Workbook;
use std::fs;
use std::path::Path;

/// A fixture cell value
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Bool(bool),
    Blank,
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Number(value as f64)
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Cell::Bool(value)
    }
}

/// Build a fixture row from heterogeneous values: `row![ "A", 1_i64, Cell::Blank ]`
#[macro_export]
macro_rules! row {
    ($($cell:expr),* $(,)?) => {
        vec![$($crate::test_support::Cell::from($cell)),*]
    };
}

/// Write a single-sheet workbook with a header row followed by `rows`.
///
/// Parent directories are created as needed.
pub fn write_workbook(path: &Path, headers: &[&str], rows: &[Vec<Cell>]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    for (col, header) in headers.iter().enumerate() {
        sheet.write_string(0, col as u16, *header)?;
    }
    for (r, row) in rows.iter().enumerate() {
        let row_idx = (r + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            let col_idx = col as u16;
            match cell {
                Cell::Text(text) => {
                    sheet.write_string(row_idx, col_idx, text)?;
                }
                Cell::Number(number) => {
                    sheet.write_number(row_idx, col_idx, *number)?;
                }
                Cell::Bool(flag) => {
                    sheet.write_boolean(row_idx, col_idx, *flag)?;
                }
                Cell::Blank => {}
            }
        }
    }

    workbook
        .save(path)
        .with_context(|| format!("Failed to save fixture {}", path.display()))?;
    Ok(())
}

/// Write a workbook with `(identity, value)` rows under `BrowserID,Value` headers.
pub fn write_identity_workbook(path: &Path, rows: &[(&str, &str)]) -> Result<()> {
    let rows: Vec<Vec<Cell>> = rows
        .iter()
        .map(|(id, value)| vec![Cell::from(*id), Cell::from(*value)])
        .collect();
    write_workbook(path, &["BrowserID", "Value"], &rows)
}

/// Write bytes that no workbook reader accepts, under a workbook file name.
pub fn write_corrupt_workbook(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, b"this is not a zip container").context("Failed to write corrupt fixture")
}
