//! Typed view over the `vaayu.logging` sub-namespace.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Logging configuration consumed by the logging installer.
///
/// Deserialized once from the resolved namespace at initialization and not
/// mutated afterwards except by explicit reconfiguration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Whether a rotating file handler should be attached.
    #[serde(default = "default_log_to_file")]
    pub log_to_file: bool,
    /// Target log file; `None` selects the per-user default location.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
    /// Dictionary-style logging configuration.
    #[serde(default)]
    pub pylogger_options: PyLoggerOptions,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_to_file: default_log_to_file(),
            log_file: None,
            pylogger_options: PyLoggerOptions::default(),
        }
    }
}

/// Dictionary-based logging configuration: formatters, handlers, and the
/// logger tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PyLoggerOptions {
    /// Schema version; always 1.
    #[serde(default = "default_version")]
    pub version: u64,
    #[serde(default)]
    pub disable_existing_loggers: bool,
    #[serde(default)]
    pub formatters: HashMap<String, FormatterSpec>,
    #[serde(default)]
    pub handlers: HashMap<String, HandlerSpec>,
    #[serde(default)]
    pub loggers: HashMap<String, LoggerSpec>,
    #[serde(default)]
    pub root: LoggerSpec,
}

impl Default for PyLoggerOptions {
    fn default() -> Self {
        Self {
            version: default_version(),
            disable_existing_loggers: false,
            formatters: HashMap::new(),
            handlers: HashMap::new(),
            loggers: HashMap::new(),
            root: LoggerSpec::default(),
        }
    }
}

/// A named record format, `%(field)s` style.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct FormatterSpec {
    #[serde(default)]
    pub format: String,
}

/// A single output handler: console, or rotating file when size limits are
/// present.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HandlerSpec {
    /// Minimum level this handler emits.
    #[serde(default)]
    pub level: Option<String>,
    /// Formatter name referencing `formatters`.
    #[serde(default)]
    pub formatter: Option<String>,
    /// Rotation threshold in bytes for file handlers.
    #[serde(default, rename = "maxBytes")]
    pub max_bytes: Option<u64>,
    /// Number of rotated backups kept for file handlers.
    #[serde(default, rename = "backupCount")]
    pub backup_count: Option<u32>,
    /// File path, filled in by the installer for file handlers.
    #[serde(default)]
    pub filename: Option<PathBuf>,
}

/// A node in the logger tree: level threshold plus attached handler names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggerSpec {
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub handlers: Vec<String>,
    /// Whether records continue to ancestor loggers after this node.
    #[serde(default = "default_propagate")]
    pub propagate: bool,
}

impl Default for LoggerSpec {
    fn default() -> Self {
        Self {
            level: None,
            handlers: Vec::new(),
            propagate: default_propagate(),
        }
    }
}

fn default_log_to_file() -> bool {
    true
}

fn default_version() -> u64 {
    1
}

fn default_propagate() -> bool {
    true
}
