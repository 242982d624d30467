//! Layered rc-file loader and namespace resolution.
//!
//! Discovers configuration layers (system/home/env/cwd), validates their
//! schema, merges them over the bundled defaults, and produces a final
//! `VaayuConfig`.

mod layer_io;
mod schema;

#[cfg(test)]
mod tests;

use crate::{ConfigError, ConfigNamespace, LoggingConfig};
use log::{debug, info};
use serde_yaml::Value;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Default rc filename searched in the home and working directories.
const RC_FILE_NAME: &str = "vaayurc.yml";
/// Environment variable pointing at the system-wide rc file.
const SYSTEM_RC_ENV_VAR: &str = "VAAYURC_SYSTEM";
/// Environment variable pointing at a user-chosen rc file.
const USER_RC_ENV_VAR: &str = "VAAYURC";
/// The bundled default configuration document.
const DEFAULT_CFG: &str = include_str!("../default_cfg.yml");

/// Effective config plus metadata about which layers were loaded.
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    /// The merged, validated config.
    pub config: VaayuConfig,
    /// Metadata for each layer applied during load, in merge order.
    pub layers: Vec<ConfigLayer>,
}

/// Origin for a single config layer in the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLayerSource {
    /// The bundled default document.
    Defaults,
    /// File named by the `VAAYURC_SYSTEM` environment variable.
    System,
    /// `~/.vaayurc.yml` in the home directory.
    Home,
    /// File named by the `VAAYURC` environment variable.
    Env,
    /// `vaayurc.yml` in the working directory.
    Cwd,
    /// Script-local overrides applied last.
    Runtime,
}

/// Metadata about an applied config layer.
#[derive(Debug, Clone)]
pub struct ConfigLayer {
    /// Layer origin (defaults, home, cwd, etc).
    pub source: ConfigLayerSource,
    /// Location on disk, when the layer came from a file.
    pub path: Option<PathBuf>,
}

/// Schema validation mode for config layers.
#[derive(Debug, Clone, Copy)]
enum SchemaMode {
    /// Partial validation for override layers; reserved namespaces may be
    /// absent.
    Partial,
    /// Full validation for the effective config; all reserved namespaces
    /// must be present.
    Full,
}

/// Options controlling rc-file discovery and script-local overrides.
#[derive(Debug, Clone)]
pub struct VaayuRcOptions {
    /// Working directory used to locate the local rc file.
    pub cwd: PathBuf,
    /// Optional system rc path (defaults to the `VAAYURC_SYSTEM` contents).
    pub system_rc_path: Option<PathBuf>,
    /// Optional home rc path (defaults to `~/.vaayurc.yml`).
    pub home_rc_path: Option<PathBuf>,
    /// Optional user-chosen rc path (defaults to the `VAAYURC` contents).
    pub env_rc_path: Option<PathBuf>,
    /// Script-local override paths applied last, in order.
    pub runtime_paths: Vec<PathBuf>,
}

impl VaayuRcOptions {
    /// Create options with the default search locations for the given cwd.
    pub fn new(cwd: impl AsRef<Path>) -> Self {
        Self {
            cwd: cwd.as_ref().to_path_buf(),
            system_rc_path: layer_io::env_rc_path(SYSTEM_RC_ENV_VAR),
            home_rc_path: layer_io::default_home_rc_path(),
            env_rc_path: layer_io::env_rc_path(USER_RC_ENV_VAR),
            runtime_paths: Vec::new(),
        }
    }

    /// Add a script-local override path that is applied last.
    pub fn with_runtime_path(mut self, path: impl AsRef<Path>) -> Self {
        self.runtime_paths.push(path.as_ref().to_path_buf());
        self
    }
}

/// A fully-resolved configuration tree.
///
/// Owns the merged namespace for the lifetime of the process; downstream
/// consumers read through shared references and never observe a partially
/// merged state.
#[derive(Debug, Clone, PartialEq)]
pub struct VaayuConfig {
    namespace: ConfigNamespace,
}

impl VaayuConfig {
    /// Parse the bundled default document.
    ///
    /// A malformed or incomplete document is a packaging defect: parse and
    /// schema failures are surfaced immediately and never retried.
    pub fn load_defaults() -> Result<Self, ConfigError> {
        debug!("loading bundled default configuration");
        let namespace = ConfigNamespace::from_yaml_str(DEFAULT_CFG)?;
        schema::validate_layer_schema(&namespace, SchemaMode::Full, "defaults")?;
        Ok(Self { namespace })
    }

    /// Fold an ordered sequence of namespaces into one resolved config,
    /// starting from an empty namespace so later sources take precedence.
    ///
    /// The canonical order is: library defaults, then user overrides, then
    /// script-local overrides. Reserved namespaces are guaranteed present in
    /// the result even when no source defines them.
    pub fn resolve(sources: &[ConfigNamespace]) -> Result<Self, ConfigError> {
        let mut merged = ConfigNamespace::default();
        for source in sources {
            merged = merged.merge(source);
        }
        Self::from_namespace(merged)
    }

    /// Validate a merged namespace and wrap it as the effective config.
    pub fn from_namespace(mut namespace: ConfigNamespace) -> Result<Self, ConfigError> {
        namespace.ensure_reserved();
        schema::validate_layer_schema(&namespace, SchemaMode::Full, "effective")?;
        Ok(Self { namespace })
    }

    /// Load a layered config using the default rc-file search locations.
    pub fn load_layered(cwd: impl AsRef<Path>) -> Result<LayeredConfig, ConfigError> {
        let options = VaayuRcOptions::new(cwd);
        Self::load_layered_with_options(options)
    }

    /// Load a layered config using explicit rc-file locations and overrides.
    ///
    /// Layer precedence (low -> high): bundled defaults, system, home, env,
    /// cwd, script-local runtime overrides.
    pub fn load_layered_with_options(
        options: VaayuRcOptions,
    ) -> Result<LayeredConfig, ConfigError> {
        let mut layers = vec![ConfigLayer {
            source: ConfigLayerSource::Defaults,
            path: None,
        }];
        let mut merged = Self::load_defaults()?.namespace;
        let mut seen_paths = HashSet::new();

        let candidates = [
            (ConfigLayerSource::System, options.system_rc_path.clone()),
            (ConfigLayerSource::Home, options.home_rc_path.clone()),
            (ConfigLayerSource::Env, options.env_rc_path.clone()),
            (ConfigLayerSource::Cwd, Some(options.cwd.join(RC_FILE_NAME))),
        ];
        for (source, path) in candidates {
            let Some(path) = path else { continue };
            let Some(layer) = layer_io::load_optional_layer(source, &path, &mut seen_paths)?
            else {
                continue;
            };
            merged = merged.merge(&layer.namespace);
            layers.push(layer.meta);
        }

        for runtime_path in &options.runtime_paths {
            let layer = layer_io::load_required_layer(ConfigLayerSource::Runtime, runtime_path)?;
            debug!("loaded runtime layer (path={})", runtime_path.display());
            merged = merged.merge(&layer.namespace);
            layers.push(layer.meta);
        }

        let config = Self::from_namespace(merged)?;
        info!("layered config loaded (layers={})", layers.len());
        Ok(LayeredConfig { config, layers })
    }

    /// Read-only view of the resolved namespace.
    pub fn namespace(&self) -> &ConfigNamespace {
        &self.namespace
    }

    /// Look up a value by dotted path; errors when the path is missing.
    pub fn get(&self, path: &str) -> Result<&Value, ConfigError> {
        self.namespace.get(path)
    }

    /// Look up a value by dotted path, falling back to a default.
    pub fn get_or<'a>(&'a self, path: &str, default: &'a Value) -> &'a Value {
        self.namespace.get_or(path, default)
    }

    /// Set a value by dotted path, creating intermediate mappings.
    pub fn set(&mut self, path: &str, value: Value) {
        self.namespace.set(path, value);
    }

    /// Decode the typed `vaayu.logging` view from the resolved namespace.
    pub fn logging(&self) -> Result<LoggingConfig, ConfigError> {
        let value = self.namespace.get("vaayu.logging")?.clone();
        serde_yaml::from_value(value).map_err(|err| ConfigError::Schema {
            path: "vaayu.logging".to_string(),
            message: err.to_string(),
        })
    }
}

/// Internal representation of a loaded rc-file layer.
#[derive(Debug, Clone)]
struct LoadedLayer {
    meta: ConfigLayer,
    namespace: ConfigNamespace,
}
