use std::path::Path;

use anyhow::{Context, Result};
use diagnostics::*;

/// Write an example configuration file for the user to edit
pub fn init_command(config_path: &Path) -> Result<()> {
    let path = config_path.display().to_string();
    info!("Creating example configuration at: {path}", path: path);

    graphload::create_example_config(config_path)
        .with_context(|| format!("Failed to create configuration file: {path}"))?;

    info!("Edit CREDS.URI, CREDS.USERNAME, CREDS.PASSWORD and CREDS.FILE_PATH, then run: graphload load --config {path}", path: path);
    Ok(())
}
