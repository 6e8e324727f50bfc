//! JSON emit functions for CLI output
//!
//! Everything printed with `--json` goes through JCS (RFC 8785) so the output
//! is byte-stable across runs.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::{MergeStats, OperationResult, SplitStats, emit_jcs};

/// Emit a split result as canonical JSON
pub fn emit_split_json(result: &OperationResult<SplitStats>) -> Result<String> {
    emit_jcs(result).context("Failed to emit split JSON")
}

/// Emit a merge result as canonical JSON
pub fn emit_merge_json(result: &OperationResult<MergeStats>) -> Result<String> {
    emit_jcs(result).context("Failed to emit merge JSON")
}

/// One effective configuration key
#[derive(Debug, Serialize)]
pub struct ConfigEntry {
    pub value: String,
    pub source: String,
}

/// Emit the effective configuration as canonical JSON
pub fn emit_config_json(entries: &BTreeMap<String, ConfigEntry>) -> Result<String> {
    emit_jcs(entries).context("Failed to emit config JSON")
}
