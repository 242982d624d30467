//! Process-wide configuration accessors.
//!
//! The resolved config is published behind a lock so that reconfiguration
//! swaps in a complete replacement; readers hold `Arc` snapshots and never
//! observe a partially merged tree.

use crate::loader::VaayuConfig;
use crate::ConfigError;
use log::debug;
use parking_lot::RwLock;
use std::env;
use std::sync::{Arc, OnceLock};

static CONFIG: OnceLock<RwLock<Arc<VaayuConfig>>> = OnceLock::new();

/// Get the process-wide configuration.
///
/// The first call resolves the bundled defaults plus any rc files found in
/// the default search locations. Later calls return the published snapshot.
pub fn get_config() -> Result<Arc<VaayuConfig>, ConfigError> {
    if let Some(slot) = CONFIG.get() {
        return Ok(slot.read().clone());
    }
    let loaded = init_from_files()?;
    Ok(publish(loaded))
}

/// Re-resolve all available rc files and atomically publish the result,
/// discarding modifications made by scripts.
pub fn reload_config() -> Result<Arc<VaayuConfig>, ConfigError> {
    Ok(publish(init_from_files()?))
}

/// Publish the library defaults without reading any rc files.
pub fn reset_default_config() -> Result<Arc<VaayuConfig>, ConfigError> {
    Ok(publish(VaayuConfig::load_defaults()?))
}

fn publish(config: VaayuConfig) -> Arc<VaayuConfig> {
    let shared = Arc::new(config);
    let slot = CONFIG.get_or_init(|| RwLock::new(shared.clone()));
    *slot.write() = shared.clone();
    shared
}

fn init_from_files() -> Result<VaayuConfig, ConfigError> {
    let cwd = env::current_dir()?;
    let layered = VaayuConfig::load_layered(cwd)?;
    let file_count = layered
        .layers
        .iter()
        .filter(|layer| layer.path.is_some())
        .count();
    if file_count == 0 {
        debug!("no configuration files found; using defaults");
    } else {
        debug!("loaded configuration from {file_count} file(s)");
    }
    Ok(layered.config)
}
