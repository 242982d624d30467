//! Logging installation for vaayu.
//!
//! Translates the resolved `vaayu.logging` sub-namespace into a handler
//! graph (console plus an optional size-rotated file handler) and installs
//! it into an explicit [`LogFacility`] implementing the `log` facade.
//! Installation replaces the whole graph atomically, so repeated installs
//! never accumulate duplicate handlers.

mod error;
mod facility;
mod format;
mod installer;
mod rotate;

/// Public error type returned by logging installation.
pub use error::LoggingError;
/// The injectable logging facility.
pub use facility::LogFacility;
/// Handler-graph installation entry points.
pub use installer::{install, install_global};
