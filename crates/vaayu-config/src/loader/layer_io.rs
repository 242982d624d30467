//! IO helpers for reading rc-file layers from disk.

use super::{ConfigLayer, ConfigLayerSource, LoadedLayer, RC_FILE_NAME, SchemaMode, schema};
use crate::{ConfigError, ConfigNamespace};
use directories::UserDirs;
use log::debug;
use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Load an optional layer when its path exists and was not already seen.
pub(super) fn load_optional_layer(
    source: ConfigLayerSource,
    path: &Path,
    seen_paths: &mut HashSet<PathBuf>,
) -> Result<Option<LoadedLayer>, ConfigError> {
    if !path.exists() {
        debug!(
            "optional rc file missing (source={:?}, path={})",
            source,
            path.display()
        );
        return Ok(None);
    }
    if !seen_paths.insert(unique_path(path)) {
        debug!(
            "skipping duplicate rc file (source={:?}, path={})",
            source,
            path.display()
        );
        return Ok(None);
    }
    Ok(Some(load_required_layer(source, path)?))
}

/// Load and validate a required layer from disk.
pub(super) fn load_required_layer(
    source: ConfigLayerSource,
    path: &Path,
) -> Result<LoadedLayer, ConfigError> {
    debug!(
        "loading rc file (source={:?}, path={})",
        source,
        path.display()
    );
    let contents = fs::read_to_string(path)?;
    let namespace = ConfigNamespace::from_yaml_str(&contents)?;
    let label = layer_label(source, path);
    schema::validate_layer_schema(&namespace, SchemaMode::Partial, &label)?;
    Ok(LoadedLayer {
        meta: ConfigLayer {
            source,
            path: Some(path.to_path_buf()),
        },
        namespace,
    })
}

/// Build a user-friendly label for schema validation errors.
pub(super) fn layer_label(source: ConfigLayerSource, path: &Path) -> String {
    let name = match source {
        ConfigLayerSource::Defaults => "defaults",
        ConfigLayerSource::System => "system",
        ConfigLayerSource::Home => "home",
        ConfigLayerSource::Env => "env",
        ConfigLayerSource::Cwd => "cwd",
        ConfigLayerSource::Runtime => "runtime",
    };
    format!("{name}({})", path.display())
}

/// Path named by an rc environment variable, when set.
pub(super) fn env_rc_path(var: &str) -> Option<PathBuf> {
    env::var_os(var).map(PathBuf::from)
}

/// Default rc path under the home directory (`~/.vaayurc.yml`).
pub(super) fn default_home_rc_path() -> Option<PathBuf> {
    UserDirs::new().map(|dirs| dirs.home_dir().join(format!(".{RC_FILE_NAME}")))
}

/// Produce a stable unique path used for de-duplication.
fn unique_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
