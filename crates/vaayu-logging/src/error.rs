//! Error types for logging installation.

use std::path::PathBuf;
use thiserror::Error;

/// Errors returned while building or installing the handler graph.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// File logging was requested but the target path cannot be used.
    #[error("log file {path} is unusable: {source}")]
    FileUnusable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// No home directory is available for the default log-file location.
    #[error("no home directory available for the default log file")]
    NoDefaultLogFile,
    /// A handler or logger named an unrecognized level.
    #[error("unknown log level {0:?}")]
    UnknownLevel(String),
    /// A handler referenced a formatter that is not defined.
    #[error("handler {handler:?} references unknown formatter {formatter:?}")]
    UnknownFormatter { handler: String, formatter: String },
}
