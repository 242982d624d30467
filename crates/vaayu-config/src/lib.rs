//! Configuration namespaces and layered rc-file loading.
//!
//! This crate owns the vaayu config namespace model, the bundled default
//! document, rc-file discovery, and the layer-merging logic used by both the
//! library and user scripts.

mod error;
mod loader;
mod manager;
mod merge;
mod model;
mod namespace;

/// Public error type returned by config loading and lookup APIs.
pub use error::ConfigError;
/// Layered config types and rc-file discovery options.
pub use loader::{ConfigLayer, ConfigLayerSource, LayeredConfig, VaayuConfig, VaayuRcOptions};
/// Process-wide configuration accessors.
pub use manager::{get_config, reload_config, reset_default_config};
/// Typed view over the `vaayu.logging` sub-namespace.
pub use model::{FormatterSpec, HandlerSpec, LoggerSpec, LoggingConfig, PyLoggerOptions};
/// The namespace tree and its reserved top-level keys.
pub use namespace::{ConfigNamespace, RESERVED_NAMESPACES};
