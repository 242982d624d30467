//! The config namespace tree and dotted-path access.

use crate::ConfigError;
use crate::merge;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::Path;

/// Top-level namespaces guaranteed to exist after resolution.
pub const RESERVED_NAMESPACES: [&str; 3] = ["vaayu", "vaayu_scripts", "user"];

/// A tree of string-keyed mappings holding scalars, nested namespaces, or
/// sequences.
///
/// Namespaces are plain values: `merge` returns a new tree and never mutates
/// its inputs, so a resolved namespace can be shared read-only across
/// threads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigNamespace(Mapping);

impl ConfigNamespace {
    /// Parse a namespace from YAML contents. The document root must be a
    /// mapping; an empty document yields an empty namespace.
    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_yaml::from_str(contents)?;
        match value {
            Value::Mapping(map) => Ok(Self(map)),
            Value::Null => Ok(Self::default()),
            other => Err(ConfigError::Schema {
                path: String::new(),
                message: format!("top level must be a mapping, found {}", value_kind(&other)),
            }),
        }
    }

    /// Load a namespace from a YAML file on disk.
    pub fn load_yaml(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Serialize the namespace back to YAML.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(&self.0).map_err(ConfigError::EncodeFailed)
    }

    /// Borrow the underlying mapping.
    pub fn as_mapping(&self) -> &Mapping {
        &self.0
    }

    /// Look up a value by dot-separated key path.
    pub fn get(&self, path: &str) -> Result<&Value, ConfigError> {
        let mut current: Option<&Value> = None;
        for key in split_path(path) {
            let map = match current {
                None => &self.0,
                Some(Value::Mapping(map)) => map,
                Some(_) => return Err(key_error(path)),
            };
            current = Some(map.get(key).ok_or_else(|| key_error(path))?);
        }
        current.ok_or_else(|| key_error(path))
    }

    /// Look up a value by dotted path, falling back to a default.
    pub fn get_or<'a>(&'a self, path: &str, default: &'a Value) -> &'a Value {
        self.get(path).unwrap_or(default)
    }

    /// Set a value by dotted path, creating intermediate mappings.
    ///
    /// When both the existing slot and the new value are mappings, the new
    /// entries merge into the existing ones; otherwise the slot is replaced.
    pub fn set(&mut self, path: &str, value: Value) {
        let keys: Vec<&str> = split_path(path).collect();
        let Some((last, parents)) = keys.split_last() else {
            return;
        };

        let mut map = &mut self.0;
        for key in parents {
            let key = Value::String((*key).to_string());
            if !matches!(map.get(&key), Some(Value::Mapping(_))) {
                map.insert(key.clone(), Value::Mapping(Mapping::new()));
            }
            map = match map.get_mut(&key) {
                Some(Value::Mapping(next)) => next,
                _ => return,
            };
        }

        let last = Value::String((*last).to_string());
        if map.contains_key(&last) {
            let Some(existing) = map.get_mut(&last) else {
                return;
            };
            if existing.is_mapping() && value.is_mapping() {
                merge::merge_values(existing, &value);
            } else {
                *existing = value;
            }
        } else {
            map.insert(last, value);
        }
    }

    /// Merge an overlay namespace into this one, returning a new namespace.
    /// Later values win; neither input is mutated.
    pub fn merge(&self, overlay: &ConfigNamespace) -> ConfigNamespace {
        let mut merged = self.0.clone();
        merge::merge_mappings(&mut merged, &overlay.0);
        ConfigNamespace(merged)
    }

    /// Insert empty mappings for any missing reserved namespace.
    pub fn ensure_reserved(&mut self) {
        for name in RESERVED_NAMESPACES {
            let key = Value::String(name.to_string());
            if !self.0.contains_key(&key) {
                self.0.insert(key, Value::Mapping(Mapping::new()));
            }
        }
    }

    /// Depth-first iteration over leaf entries as `(dotted_path, value)`
    /// pairs. Mappings are descended into; sequences and scalars are leaves.
    pub fn walk(&self) -> impl Iterator<Item = (String, &Value)> {
        let mut leaves = Vec::new();
        collect_leaves(&self.0, "", &mut leaves);
        leaves.into_iter()
    }
}

fn collect_leaves<'a>(map: &'a Mapping, prefix: &str, out: &mut Vec<(String, &'a Value)>) {
    for (key, value) in map {
        let Some(key) = key.as_str() else {
            continue;
        };
        let path = if prefix.is_empty() {
            key.to_string()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            Value::Mapping(inner) => collect_leaves(inner, &path, out),
            leaf => out.push((path, leaf)),
        }
    }
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.trim()
        .trim_matches('.')
        .split('.')
        .filter(|segment| !segment.is_empty())
}

fn key_error(path: &str) -> ConfigError {
    ConfigError::Key {
        path: path.to_string(),
    }
}

/// Human-readable name for a YAML value kind, used in schema errors.
pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
