use sheetsplit_utils::error::{ConfigError, SheetSplitError};

use super::{Config, MAX_GROUP_SIZE, MAX_WORKERS};

impl Config {
    /// Validate configuration values
    pub(crate) fn validate(&self) -> Result<(), SheetSplitError> {
        if let Some(group_size) = self.defaults.group_size {
            if group_size == 0 {
                return Err(invalid("group_size", "must be greater than 0"));
            }
            if group_size > MAX_GROUP_SIZE {
                return Err(invalid(
                    "group_size",
                    &format!("exceeds maximum limit of {MAX_GROUP_SIZE}"),
                ));
            }
        }

        if let Some(workers) = self.defaults.workers {
            if workers == 0 {
                return Err(invalid("workers", "must be greater than 0"));
            }
            if workers > MAX_WORKERS {
                return Err(invalid(
                    "workers",
                    &format!("exceeds maximum limit of {MAX_WORKERS}"),
                ));
            }
        }

        if let Some(column) = &self.defaults.identity_column
            && column.trim().is_empty()
        {
            return Err(invalid("identity_column", "must not be blank"));
        }

        if let Some(dir) = &self.defaults.output_dir
            && dir.as_os_str().is_empty()
        {
            return Err(invalid("output_dir", "must not be empty"));
        }

        self.selectors.validate()?;
        Ok(())
    }
}

fn invalid(key: &str, value: &str) -> SheetSplitError {
    SheetSplitError::Config(ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}
