// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! YAML configuration: store credentials, the source file and load tuning.

use crate::error::{LoadError, Result};
use diagnostics::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Node label used when the configuration does not name one
pub const DEFAULT_LABEL: &str = "Product";

/// Records per write transaction when the configuration does not say
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Complete configuration for one load run
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LoadConfig {
    #[serde(rename = "CREDS")]
    pub creds: Credentials,
    #[serde(rename = "LOAD", default)]
    pub load: LoadSettings,
}

/// Connection details and the CSV path
#[derive(Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Credentials {
    pub uri: String,
    pub username: String,
    pub password: String,
    pub file_path: PathBuf,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("uri", &self.uri)
            .field("username", &self.username)
            .field("password", &"***")
            .field("file_path", &self.file_path)
            .finish()
    }
}

/// Optional tuning of how rows become nodes
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct LoadSettings {
    #[serde(default = "default_label")]
    pub label: String,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    /// Target database; the server default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
}

fn default_label() -> String {
    DEFAULT_LABEL.to_string()
}
fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}
fn default_delimiter() -> char {
    ','
}

impl Default for LoadSettings {
    fn default() -> Self {
        Self {
            label: default_label(),
            batch_size: default_batch_size(),
            delimiter: default_delimiter(),
            database: None,
        }
    }
}

impl LoadConfig {
    /// Parse and validate configuration text
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: LoadConfig = serde_yaml_ng::from_str(content)
            .map_err(|e| LoadError::Config(format!("Failed to parse YAML configuration: {e}")))?;
        validate_config(&config)?;
        Ok(config)
    }

    /// The delimiter as the single byte the CSV reader expects
    #[must_use]
    pub fn delimiter_byte(&self) -> u8 {
        // validate_config guarantees an ASCII delimiter
        self.load.delimiter as u8
    }
}

/// Load configuration from a YAML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<LoadConfig> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        LoadError::Config(format!(
            "Failed to read config file {}: {e}",
            path.display()
        ))
    })?;

    let config = LoadConfig::from_yaml_str(&content)?;
    let file_path = config.creds.file_path.display().to_string();
    debug!("Loaded configuration for source {file_path}", file_path: file_path);
    Ok(config)
}

/// Validate configuration
///
/// Call again after applying command-line overrides.
pub fn validate_config(config: &LoadConfig) -> Result<()> {
    let creds = &config.creds;
    let required = [
        ("URI", creds.uri.as_str()),
        ("USERNAME", creds.username.as_str()),
        ("PASSWORD", creds.password.as_str()),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(LoadError::Config(format!("CREDS.{field} cannot be empty")));
        }
    }

    if creds.file_path.as_os_str().is_empty() {
        return Err(LoadError::Config("CREDS.FILE_PATH cannot be empty".into()));
    }

    let load = &config.load;
    if load.label.trim().is_empty() {
        return Err(LoadError::Config("LOAD.LABEL cannot be empty".into()));
    }
    if load.batch_size == 0 {
        return Err(LoadError::Config(
            "LOAD.BATCH_SIZE must be greater than 0".into(),
        ));
    }
    if !load.delimiter.is_ascii() {
        return Err(LoadError::Config(format!(
            "LOAD.DELIMITER must be a single ASCII character, got {:?}",
            load.delimiter
        )));
    }
    if let Some(database) = &load.database {
        if database.trim().is_empty() {
            return Err(LoadError::Config("LOAD.DATABASE cannot be empty".into()));
        }
    }

    Ok(())
}

/// Example configuration written by `graphload init`
#[must_use]
pub fn example_config() -> LoadConfig {
    LoadConfig {
        creds: Credentials {
            uri: "bolt://localhost:7687".to_string(),
            username: "neo4j".to_string(),
            password: "change-me".to_string(),
            file_path: PathBuf::from("products.csv"),
        },
        load: LoadSettings::default(),
    }
}

/// Write the example configuration to `path`, refusing to overwrite
pub fn create_example_config<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    if path.exists() {
        return Err(LoadError::Config(format!(
            "Configuration file already exists: {}",
            path.display()
        )));
    }

    let yaml = serde_yaml_ng::to_string(&example_config())
        .map_err(|e| LoadError::Config(format!("Failed to serialize configuration: {e}")))?;
    std::fs::write(path, yaml).map_err(|e| {
        LoadError::Config(format!(
            "Failed to write config file {}: {e}",
            path.display()
        ))
    })
}
