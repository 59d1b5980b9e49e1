//! Configuration file loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;
use xoauth2relay_core::ManagerConfig;

/// Returns `<config dir>/xoauth2relay/config.json`.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("xoauth2relay")
        .join("config.json")
}

/// Loads the manager configuration.
///
/// An explicitly given file must exist. The default file is optional and
/// falls back to [`ManagerConfig::default`].
pub fn load_config(explicit: Option<&Path>) -> Result<ManagerConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let path = default_config_path();
            if !path.exists() {
                debug!("No config at {}; using defaults", path.display());
                return Ok(ManagerConfig::default());
            }
            path
        }
    };

    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config: ManagerConfig = serde_json::from_str(&contents)
        .with_context(|| format!("invalid config {}", path.display()))?;
    debug!("Loaded config from {}", path.display());
    Ok(config)
}
