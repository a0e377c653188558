use std::env;
use std::path::PathBuf;

use graphload::LoadConfig;

/// Environment variable naming the configuration file
pub const CONFIG_ENV: &str = "GRAPHLOAD_CONFIG";

/// Configuration file used when neither a flag nor GRAPHLOAD_CONFIG names one
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// Get the config path with an optional override, falling back to GRAPHLOAD_CONFIG
/// and then to `config.yaml` in the working directory
#[must_use]
pub fn get_config_path_with_override(override_path: Option<PathBuf>) -> PathBuf {
    if let Some(path) = override_path {
        return path;
    }

    env::var(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// Log level used when GRAPHLOAD_LOG is unset
#[must_use]
pub fn default_log_level(verbose: bool) -> &'static str {
    if verbose { "info" } else { "off" }
}

/// Command-line settings that take precedence over the `LOAD` section
#[derive(Debug, Clone, Default)]
pub struct LoadOverrides {
    pub batch_size: Option<usize>,
    pub label: Option<String>,
}

impl LoadOverrides {
    /// Apply to `config`; the caller re-validates afterwards
    pub fn apply(&self, config: &mut LoadConfig) {
        if let Some(batch_size) = self.batch_size {
            config.load.batch_size = batch_size;
        }
        if let Some(label) = &self.label {
            config.load.label.clone_from(label);
        }
    }
}
