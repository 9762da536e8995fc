//! Configuration file loading.

use std::path::Path;

use super::{
    ConfigError,
    ResolverSettings,
};

/// Configuration file name looked up in the configuration root.
pub(super) const CONFIG_FILE_NAME: &str = ".message-source.json";

/// Loads settings from `.message-source.json` in `root`.
///
/// # Returns
/// - `Ok(Some(settings))`: file found and parsed
/// - `Ok(None)`: no configuration file
///
/// # Errors
/// - File read error
/// - JSON parse error
pub(super) fn load_from_dir(root: &Path) -> Result<Option<ResolverSettings>, ConfigError> {
    let config_path = root.join(CONFIG_FILE_NAME);

    if !config_path.exists() {
        tracing::debug!("Configuration file not found: {:?}", config_path);
        return Ok(None);
    }

    tracing::debug!("Loading configuration from: {:?}", config_path);

    let content = std::fs::read_to_string(&config_path)?;
    let settings: ResolverSettings = serde_json::from_str(&content)?;

    Ok(Some(settings))
}
