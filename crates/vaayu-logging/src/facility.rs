//! The injectable logging facility.

use crate::installer::HandlerGraph;
use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};
use parking_lot::RwLock;

/// A `log` backend whose handler graph is swapped in atomically.
///
/// The facility is passed to the installer explicitly, so tests can run
/// against a private instance without touching process-global state. Until
/// a graph is installed every record is dropped.
#[derive(Debug, Default)]
pub struct LogFacility {
    graph: RwLock<Option<HandlerGraph>>,
}

impl LogFacility {
    /// Create an empty facility with no handlers installed.
    pub const fn new() -> Self {
        Self {
            graph: RwLock::new(None),
        }
    }

    /// The shared process-wide facility.
    pub fn global() -> &'static LogFacility {
        static GLOBAL: LogFacility = LogFacility::new();
        &GLOBAL
    }

    /// Register the shared facility as the `log` crate's logger.
    ///
    /// Fails if another logger was registered first; reinstalling a handler
    /// graph does not require re-registration.
    pub fn try_register_global() -> Result<(), SetLoggerError> {
        log::set_logger(Self::global())
    }

    /// Whether a handler graph has been installed.
    pub fn is_installed(&self) -> bool {
        self.graph.read().is_some()
    }

    /// Names of the installed handlers, in sorted order.
    pub fn installed_handlers(&self) -> Vec<String> {
        self.graph
            .read()
            .as_ref()
            .map(HandlerGraph::handler_names)
            .unwrap_or_default()
    }

    /// Swap in a new handler graph, returning its effective level bound.
    pub(crate) fn replace_graph(&self, graph: HandlerGraph) -> LevelFilter {
        let max_level = graph.max_level();
        *self.graph.write() = Some(graph);
        max_level
    }
}

impl Log for LogFacility {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.graph
            .read()
            .as_ref()
            .is_some_and(|graph| graph.enabled(metadata.target(), metadata.level()))
    }

    fn log(&self, record: &Record) {
        if let Some(graph) = self.graph.read().as_ref() {
            graph.dispatch(record);
        }
    }

    fn flush(&self) {
        if let Some(graph) = self.graph.read().as_ref() {
            graph.flush();
        }
    }
}
