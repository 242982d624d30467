//! Public surface for the vaayu library.
//!
//! Re-exports the configuration and logging building blocks and provides a
//! small initialization helper to keep consumer setup consistent.

/// Re-export for convenience.
pub use vaayu_config as config;
/// Re-export for convenience.
pub use vaayu_logging as logging;

pub use vaayu_config::{
    ConfigError, ConfigNamespace, LoggingConfig, VaayuConfig, get_config, reload_config,
    reset_default_config,
};
pub use vaayu_logging::{LogFacility, LoggingError};

use std::sync::Arc;
use thiserror::Error;

/// Errors returned by [`init`].
#[derive(Debug, Error)]
pub enum InitError {
    /// Resolving the configuration failed.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Installing the logging handler graph failed.
    #[error(transparent)]
    Logging(#[from] LoggingError),
}

/// Resolve the process-wide configuration and wire up logging.
///
/// Scripts call this once at startup. Reinvoking after `reload_config`
/// reinstalls the handler graph without duplicating handlers.
pub fn init() -> Result<Arc<VaayuConfig>, InitError> {
    let config = vaayu_config::get_config()?;
    let logging_cfg = config.logging()?;
    vaayu_logging::install_global(&logging_cfg)?;
    log::debug!("vaayu initialized");
    Ok(config)
}
