use std::collections::BTreeMap;

use sheetsplit_utils::types::ConfigSource;

use super::Config;

fn stable_source_label(source: &ConfigSource) -> &'static str {
    match source {
        ConfigSource::Cli => "cli",
        ConfigSource::Env => "env",
        ConfigSource::Config => "config",
        ConfigSource::Programmatic => "programmatic",
        ConfigSource::Default => "default",
    }
}

impl Config {
    /// Effective configuration as `key -> (value, source)`, sorted by key
    #[must_use]
    pub fn effective_config(&self) -> BTreeMap<String, (String, String)> {
        let mut config = BTreeMap::new();
        let mut add = |key: &str, value: String| {
            let source = stable_source_label(&self.source_of(key)).to_string();
            config.insert(key.to_string(), (value, source));
        };

        add("group_size", self.group_size().to_string());
        add("workers", self.workers().to_string());
        add(
            "load_timeout_secs",
            self.load_timeout()
                .map_or(0, |timeout| timeout.as_secs())
                .to_string(),
        );
        add("identity_column", self.identity_column().to_string());
        add("output_dir", self.output_dir().display().to_string());
        add("verbose", self.verbose().to_string());
        add("selectors_include", self.selectors.include.join(", "));
        if !self.selectors.exclude.is_empty() {
            add("selectors_exclude", self.selectors.exclude.join(", "));
        }

        config
    }
}
