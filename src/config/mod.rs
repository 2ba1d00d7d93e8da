//! Configuration loading and validation

mod schema;

pub use schema::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Annotated example configuration written by `aether init`
pub const EXAMPLE_CONFIG: &str = include_str!("../../aether.example.yaml");

/// Load configuration from a YAML file
pub fn load_config(path: &Path) -> Result<AetherConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config: AetherConfig = serde_yaml::from_str(&contents)
        .with_context(|| format!("Failed to parse config {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

/// Load `path` if it exists, otherwise fall back to defaults
pub fn load_or_default(path: &Path) -> Result<AetherConfig> {
    if path.exists() {
        load_config(path)
    } else {
        tracing::info!(path = %path.display(), "config not found, using defaults");
        Ok(AetherConfig::default())
    }
}
