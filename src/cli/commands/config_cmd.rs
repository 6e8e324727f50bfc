//! `sheetsplit config`

use anyhow::Result;
use std::collections::BTreeMap;

use super::json_emit::{ConfigEntry, emit_config_json};
use crate::{Config, ExitCode};

/// Print the effective configuration with the source of every value
pub fn execute_config_command(config: &Config, json: bool) -> Result<ExitCode> {
    let effective = config.effective_config();

    if json {
        let entries: BTreeMap<String, ConfigEntry> = effective
            .into_iter()
            .map(|(key, (value, source))| (key, ConfigEntry { value, source }))
            .collect();
        println!("{}", emit_config_json(&entries)?);
        return Ok(ExitCode::SUCCESS);
    }

    println!("Effective configuration:");
    let width = effective.keys().map(String::len).max().unwrap_or(0);
    for (key, (value, source)) in &effective {
        println!("  {key:<width$} = {value}  ({source})");
    }
    Ok(ExitCode::SUCCESS)
}
