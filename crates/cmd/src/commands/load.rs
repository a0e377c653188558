//! Load command - reads the CSV named in the configuration into the graph
//!
//! Example:
//!   graphload load --config config.yaml --batch-size 500

use std::path::Path;

use anyhow::{Context, Result};
use diagnostics::*;
use graphload::{CsvSource, LoadOptions, LoadReport, Neo4jStore};

use crate::common::LoadOverrides;

/// Load configuration, apply overrides and run the load against Neo4j
pub async fn load_command(config_path: &Path, overrides: &LoadOverrides) -> Result<LoadReport> {
    let config = prepare_config(config_path, overrides)?;

    let source = CsvSource::from_config(&config);
    let store = Neo4jStore::new(&config);
    let options = LoadOptions::from_config(&config);

    let file = source.path().display().to_string();
    let label = options.label.clone();
    let batch_size = options.batch_size;
    info!(
        "Loading {file} as :{label} nodes in batches of {batch_size}",
        file: file,
        label: label,
        batch_size: batch_size
    );

    graphload::run(&store, &source, options)
        .await
        .with_context(|| format!("Failed to load {file}"))
}

/// Read and validate configuration; nothing touches the network or the CSV here
pub fn prepare_config(
    config_path: &Path,
    overrides: &LoadOverrides,
) -> Result<graphload::LoadConfig> {
    let path = config_path.display().to_string();
    debug!("Loading configuration from: {path}", path: path);

    let mut config = graphload::load_config(config_path)
        .with_context(|| format!("Failed to load configuration from: {path}"))?;
    overrides.apply(&mut config);
    graphload::validate_config(&config).context("Invalid command-line override")?;
    Ok(config)
}
