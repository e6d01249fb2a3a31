//! Application service: configuration use-cases.

use anyhow::{Context, Result};

use crate::application::ports::ConfigStore;
use crate::domain::config::FleetConfig;

/// Load configuration.
pub fn load_config(store: &impl ConfigStore) -> Result<FleetConfig> {
    store.load()
}

/// Save configuration.
pub fn save_config(store: &impl ConfigStore, config: &FleetConfig) -> Result<()> {
    store.save(config)
}

/// Validate and persist one `key = value` pair, returning the updated config.
///
/// # Errors
///
/// Returns an error if the key is not whitelisted, the value does not pass
/// validation, or the store cannot be read or written.
pub fn set_value(store: &impl ConfigStore, key: &str, value: &str) -> Result<FleetConfig> {
    let mut config = store.load().context("failed to load configuration")?;
    config.set(key, value)?;
    store
        .save(&config)
        .with_context(|| format!("failed to save {key}"))?;
    tracing::info!(key, "configuration updated");
    Ok(config)
}
