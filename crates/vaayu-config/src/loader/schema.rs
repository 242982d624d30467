//! Schema validation helpers for vaayu YAML configuration.

use super::SchemaMode;
use crate::namespace::value_kind;
use crate::{ConfigError, ConfigNamespace, RESERVED_NAMESPACES};
use serde_yaml::{Mapping, Value};

/// Validate a single config layer against the namespace schema.
pub(super) fn validate_layer_schema(
    namespace: &ConfigNamespace,
    mode: SchemaMode,
    layer: &str,
) -> Result<(), ConfigError> {
    let map = namespace.as_mapping();
    ensure_allowed_keys(map, &RESERVED_NAMESPACES, layer, "")?;

    if matches!(mode, SchemaMode::Full) {
        for name in RESERVED_NAMESPACES {
            if !map.contains_key(name) {
                return Err(ConfigError::Schema {
                    path: format!("{layer}:{name}"),
                    message: format!("missing reserved namespace '{name}'"),
                });
            }
        }
    }

    for name in RESERVED_NAMESPACES {
        if let Some(value) = map.get(name) {
            expect_mapping(value, layer, name)?;
        }
    }

    if let Some(vaayu) = map.get("vaayu").and_then(Value::as_mapping) {
        if let Some(logging) = vaayu.get("logging") {
            validate_logging(logging, layer, "vaayu.logging")?;
        }
    }

    Ok(())
}

/// Validate the `vaayu.logging` block.
fn validate_logging(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_mapping(value, layer, path)?;

    if let Some(value) = map.get("log_to_file") {
        expect_bool(value, layer, &join_path(path, "log_to_file"))?;
    }
    if let Some(value) = map.get("log_file") {
        if !matches!(value, Value::Null | Value::String(_)) {
            return Err(invalid(
                layer,
                &join_path(path, "log_file"),
                &format!("expected null or a path string, found {}", value_kind(value)),
            ));
        }
    }
    if let Some(value) = map.get("pylogger_options") {
        validate_pylogger_options(value, layer, &join_path(path, "pylogger_options"))?;
    }

    Ok(())
}

/// Validate the dictionary-style logging options.
fn validate_pylogger_options(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_mapping(value, layer, path)?;

    if let Some(version) = map.get("version") {
        if version.as_u64() != Some(1) {
            return Err(invalid(layer, &join_path(path, "version"), "must be 1"));
        }
    }
    if let Some(value) = map.get("disable_existing_loggers") {
        expect_bool(value, layer, &join_path(path, "disable_existing_loggers"))?;
    }
    for section in ["formatters", "handlers", "loggers", "root"] {
        if let Some(value) = map.get(section) {
            expect_mapping(value, layer, &join_path(path, section))?;
        }
    }
    if let Some(handlers) = map.get("handlers").and_then(Value::as_mapping) {
        for (name, handler) in handlers {
            let Some(name) = name.as_str() else { continue };
            validate_handler(handler, layer, &join_path(path, &format!("handlers.{name}")))?;
        }
    }

    Ok(())
}

/// Validate a single handler entry.
fn validate_handler(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_mapping(value, layer, path)?;
    for key in ["level", "formatter"] {
        if let Some(value) = map.get(key) {
            expect_string(value, layer, &join_path(path, key))?;
        }
    }
    for key in ["maxBytes", "backupCount"] {
        if let Some(value) = map.get(key) {
            if value.as_u64().is_none() {
                return Err(invalid(
                    layer,
                    &join_path(path, key),
                    &format!(
                        "expected a non-negative integer, found {}",
                        value_kind(value)
                    ),
                ));
            }
        }
    }
    Ok(())
}

/// Reject top-level keys outside the reserved namespaces.
fn ensure_allowed_keys(
    map: &Mapping,
    allowed: &[&str],
    layer: &str,
    path: &str,
) -> Result<(), ConfigError> {
    for key in map.keys() {
        let Some(key) = key.as_str() else {
            return Err(invalid(layer, path, "keys must be strings"));
        };
        if !allowed.contains(&key) {
            return Err(invalid(layer, path, &format!("unknown key '{key}'")));
        }
    }
    Ok(())
}

fn expect_mapping<'a>(value: &'a Value, layer: &str, path: &str) -> Result<&'a Mapping, ConfigError> {
    value.as_mapping().ok_or_else(|| {
        invalid(
            layer,
            path,
            &format!("expected a mapping, found {}", value_kind(value)),
        )
    })
}

fn expect_bool(value: &Value, layer: &str, path: &str) -> Result<bool, ConfigError> {
    value.as_bool().ok_or_else(|| {
        invalid(
            layer,
            path,
            &format!("expected a boolean, found {}", value_kind(value)),
        )
    })
}

fn expect_string<'a>(value: &'a Value, layer: &str, path: &str) -> Result<&'a str, ConfigError> {
    value.as_str().ok_or_else(|| {
        invalid(
            layer,
            path,
            &format!("expected a string, found {}", value_kind(value)),
        )
    })
}

fn join_path(base: &str, key: &str) -> String {
    if base.is_empty() {
        key.to_string()
    } else {
        format!("{base}.{key}")
    }
}

fn invalid(layer: &str, path: &str, message: &str) -> ConfigError {
    ConfigError::Schema {
        path: if path.is_empty() {
            layer.to_string()
        } else {
            format!("{layer}:{path}")
        },
        message: message.to_string(),
    }
}
