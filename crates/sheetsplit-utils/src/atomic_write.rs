//! Atomic workbook writes
//!
//! Output workbooks are serialized in memory and then persisted with
//! temp file + fsync + rename, so an interrupted or failed write never
//! leaves a truncated `output_NNN.xlsx` behind. On Windows the rename is
//! retried with bounded exponential backoff because spreadsheet editors and
//! virus scanners hold short-lived locks on freshly written files.

use anyhow::{Context, Result};
use camino::Utf8Path;
use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

#[cfg(target_os = "windows")]
use std::{thread, time::Duration};

/// Result of an atomic write operation
#[derive(Debug, Clone, Default)]
pub struct AtomicWriteResult {
    /// Bytes written to the target
    pub bytes_written: usize,
    /// Number of rename retries that occurred (Windows only)
    pub rename_retry_count: u32,
}

/// Atomically write `bytes` to `path`, replacing any existing file.
///
/// The parent directory is created if it does not exist.
pub fn write_bytes_atomic(path: &Utf8Path, bytes: &[u8]) -> Result<AtomicWriteResult> {
    if let Some(parent) = path.parent().filter(|p| !p.as_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create parent directory: {parent}"))?;
    }

    let temp_dir = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let mut temp_file = NamedTempFile::new_in(temp_dir)
        .with_context(|| format!("Failed to create temporary file in: {temp_dir}"))?;

    temp_file
        .write_all(bytes)
        .with_context(|| "Failed to write content to temporary file")?;
    temp_file
        .as_file()
        .sync_all()
        .with_context(|| "Failed to fsync temporary file")?;

    let rename_retry_count = atomic_rename(temp_file, path.as_std_path())
        .with_context(|| format!("Failed to atomically write file: {path}"))?;

    Ok(AtomicWriteResult {
        bytes_written: bytes.len(),
        rename_retry_count,
    })
}

/// Attempt atomic rename with bounded retries (≤ 250ms total)
#[cfg(target_os = "windows")]
fn atomic_rename(mut temp_file: NamedTempFile, target: &Path) -> Result<u32> {
    use std::io::ErrorKind;

    const MAX_RETRIES: u32 = 5;
    const INITIAL_DELAY_MS: u64 = 10;
    const MAX_TOTAL_DELAY_MS: u64 = 250;

    let mut retry_count = 0;
    let mut total_delay_ms = 0;

    loop {
        match temp_file.persist(target) {
            Ok(_) => return Ok(retry_count),
            Err(persist_error) => {
                let is_retryable = matches!(
                    persist_error.error.kind(),
                    ErrorKind::PermissionDenied | ErrorKind::Other
                );
                if retry_count >= MAX_RETRIES || !is_retryable {
                    return Err(anyhow::anyhow!(persist_error.error));
                }

                let delay_ms = INITIAL_DELAY_MS * 2_u64.pow(retry_count);
                if total_delay_ms + delay_ms > MAX_TOTAL_DELAY_MS {
                    return Err(anyhow::anyhow!(persist_error.error));
                }

                thread::sleep(Duration::from_millis(delay_ms));
                total_delay_ms += delay_ms;
                retry_count += 1;
                temp_file = persist_error.file;
            }
        }
    }
}

/// Attempt atomic rename (Unix: no retry needed)
#[cfg(not(target_os = "windows"))]
fn atomic_rename(temp_file: NamedTempFile, target: &Path) -> Result<u32> {
    temp_file
        .persist(target)
        .map(|_| 0)
        .map_err(|e| anyhow::anyhow!(e.error))
}
