//! Glob selectors deciding which files under the input root are workbooks

use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};

use sheetsplit_utils::error::ConfigError;

/// File name prefix of editor lock files (`~$report.xlsx`), always excluded
pub const LOCK_FILE_PREFIX: &str = "~$";

/// Include/exclude patterns matched against root-relative paths
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Selectors {
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            include: vec!["**/*.xlsx".to_string(), "**/*.xls".to_string()],
            exclude: Vec::new(),
        }
    }
}

impl Selectors {
    /// Check that every pattern compiles and that something can be included
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.include.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "selectors.include".to_string(),
                value: "at least one include pattern is required".to_string(),
            });
        }
        for (key, patterns) in [
            ("selectors.include", &self.include),
            ("selectors.exclude", &self.exclude),
        ] {
            for pattern in patterns {
                Glob::new(pattern).map_err(|e| ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: format!("'{pattern}': {e}"),
                })?;
            }
        }
        Ok(())
    }

    /// Compile the include patterns; extension matching is case-insensitive
    pub fn include_set(&self) -> Result<GlobSet, ConfigError> {
        build_set("selectors.include", &self.include)
    }

    pub fn exclude_set(&self) -> Result<GlobSet, ConfigError> {
        build_set("selectors.exclude", &self.exclude)
    }
}

fn build_set(key: &str, patterns: &[String]) -> Result<GlobSet, ConfigError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .case_insensitive(true)
            .literal_separator(false)
            .build()
            .map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                value: format!("'{pattern}': {e}"),
            })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        value: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_selectors_match_both_excel_extensions() {
        let set = Selectors::default().include_set().unwrap();
        assert!(set.is_match("a.xlsx"));
        assert!(set.is_match("nested/dir/B.XLS"));
        assert!(!set.is_match("notes.csv"));
        assert!(!set.is_match("archive.xlsx.bak"));
    }

    #[test]
    fn test_invalid_glob_is_rejected() {
        let selectors = Selectors {
            include: vec!["[unclosed".to_string()],
            exclude: Vec::new(),
        };
        match selectors.validate() {
            Err(ConfigError::InvalidValue { key, .. }) => assert_eq!(key, "selectors.include"),
            other => panic!("expected invalid value, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_include_is_rejected() {
        let selectors = Selectors {
            include: Vec::new(),
            exclude: vec!["**/tmp/**".to_string()],
        };
        assert!(selectors.validate().is_err());
    }
}
