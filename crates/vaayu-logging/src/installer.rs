//! Builds the handler graph from a `LoggingConfig` and installs it.

use crate::LoggingError;
use crate::facility::LogFacility;
use crate::format::RecordFormatter;
use crate::rotate::RotatingFileWriter;
use directories::UserDirs;
use log::{Level, LevelFilter, Record, debug};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use vaayu_config::{HandlerSpec, LoggerSpec, LoggingConfig};

/// Handler name reserved for the rotating file sink.
const FILE_HANDLER_NAME: &str = "log_file";
/// Logger that receives the file handler when file logging is enabled.
const LIBRARY_LOGGER_NAME: &str = "vaayu";
/// Directory under the home directory holding the default log file.
const DEFAULT_LOG_DIR: &str = ".vaayu";
/// Default log filename.
const DEFAULT_LOG_FILE: &str = "vaayu.log";

/// Build the handler graph for `cfg` and install it into `facility`.
///
/// The graph replaces whatever was installed before, so calling this twice
/// with the same configuration leaves exactly one console handler and at
/// most one file handler.
pub fn install(facility: &LogFacility, cfg: &LoggingConfig) -> Result<(), LoggingError> {
    let graph = HandlerGraph::build(cfg)?;
    facility.replace_graph(graph);
    Ok(())
}

/// Install into the shared facility and register it with the `log` facade.
///
/// Registration happens at most once per process; reinstalling only swaps
/// the handler graph and adjusts the global level filter.
pub fn install_global(cfg: &LoggingConfig) -> Result<(), LoggingError> {
    let facility = LogFacility::global();
    let graph = HandlerGraph::build(cfg)?;
    let max_level = facility.replace_graph(graph);
    let _ = LogFacility::try_register_global();
    log::set_max_level(max_level);
    if cfg.log_to_file {
        debug!("file logging enabled");
    }
    Ok(())
}

/// The installed handler/formatter/logger graph.
#[derive(Debug)]
pub(crate) struct HandlerGraph {
    handlers: BTreeMap<String, Handler>,
    loggers: BTreeMap<String, LoggerNode>,
    root: LoggerNode,
}

#[derive(Debug)]
struct Handler {
    level: LevelFilter,
    formatter: RecordFormatter,
    sink: Sink,
}

#[derive(Debug)]
enum Sink {
    Console,
    File(Mutex<RotatingFileWriter>),
}

#[derive(Debug, Clone)]
struct LoggerNode {
    level: LevelFilter,
    handlers: Vec<String>,
    propagate: bool,
}

impl LoggerNode {
    fn from_spec(spec: &LoggerSpec, default_level: LevelFilter) -> Result<Self, LoggingError> {
        let level = match &spec.level {
            Some(name) => parse_level(name)?,
            None => default_level,
        };
        Ok(Self {
            level,
            handlers: spec.handlers.clone(),
            propagate: spec.propagate,
        })
    }
}

impl HandlerGraph {
    pub(crate) fn build(cfg: &LoggingConfig) -> Result<Self, LoggingError> {
        let options = &cfg.pylogger_options;

        let mut handlers = BTreeMap::new();
        for (name, spec) in &options.handlers {
            if is_file_handler(name, spec) && !cfg.log_to_file {
                continue;
            }
            handlers.insert(name.clone(), build_handler(cfg, name, spec)?);
        }

        let mut loggers = BTreeMap::new();
        for (name, spec) in &options.loggers {
            loggers.insert(
                name.clone(),
                LoggerNode::from_spec(spec, LevelFilter::Trace)?,
            );
        }
        if cfg.log_to_file {
            let node = loggers
                .entry(LIBRARY_LOGGER_NAME.to_string())
                .or_insert_with(|| LoggerNode {
                    level: LevelFilter::Trace,
                    handlers: Vec::new(),
                    propagate: false,
                });
            if !node.handlers.iter().any(|name| name == FILE_HANDLER_NAME) {
                node.handlers.push(FILE_HANDLER_NAME.to_string());
            }
        }
        let root = LoggerNode::from_spec(&options.root, LevelFilter::Warn)?;

        Ok(Self {
            handlers,
            loggers,
            root,
        })
    }

    /// Whether any configured logger would accept a record.
    pub(crate) fn enabled(&self, target: &str, level: Level) -> bool {
        let target = normalize_target(target);
        let mut name = target.as_str();
        loop {
            if let Some(node) = self.loggers.get(name) {
                if level <= node.level {
                    return true;
                }
                if !node.propagate {
                    return false;
                }
            }
            match name.rfind('.') {
                Some(idx) => name = &name[..idx],
                None => break,
            }
        }
        level <= self.root.level
    }

    /// Route a record through the logger tree to its handlers.
    pub(crate) fn dispatch(&self, record: &Record) {
        let target = normalize_target(record.target());
        let mut name = target.as_str();
        loop {
            if let Some(node) = self.loggers.get(name) {
                if record.level() <= node.level {
                    self.emit(node, &target, record);
                }
                if !node.propagate {
                    return;
                }
            }
            match name.rfind('.') {
                Some(idx) => name = &name[..idx],
                None => break,
            }
        }
        if record.level() <= self.root.level {
            self.emit(&self.root, &target, record);
        }
    }

    pub(crate) fn flush(&self) {
        for handler in self.handlers.values() {
            if let Sink::File(writer) = &handler.sink {
                let _ = writer.lock().flush();
            }
        }
    }

    /// Names of the installed handlers, in sorted order.
    pub(crate) fn handler_names(&self) -> Vec<String> {
        self.handlers.keys().cloned().collect()
    }

    /// Most verbose level any logger accepts; used for the facade filter.
    pub(crate) fn max_level(&self) -> LevelFilter {
        self.loggers
            .values()
            .map(|node| node.level)
            .chain(std::iter::once(self.root.level))
            .max()
            .unwrap_or(LevelFilter::Warn)
    }

    fn emit(&self, node: &LoggerNode, target: &str, record: &Record) {
        for handler_name in &node.handlers {
            let Some(handler) = self.handlers.get(handler_name) else {
                continue;
            };
            if record.level() > handler.level {
                continue;
            }
            let message = record.args().to_string();
            let line = handler.formatter.render(target, record.level(), &message);
            match &handler.sink {
                Sink::Console => eprintln!("{line}"),
                // Write errors cannot be reported through the facade that
                // caused them; drop the record instead of panicking.
                Sink::File(writer) => {
                    let _ = writer.lock().write_line(&line);
                }
            }
        }
    }
}

fn build_handler(
    cfg: &LoggingConfig,
    name: &str,
    spec: &HandlerSpec,
) -> Result<Handler, LoggingError> {
    let level = match &spec.level {
        Some(name) => parse_level(name)?,
        None => LevelFilter::Trace,
    };
    let formatter = match &spec.formatter {
        Some(formatter_name) => {
            let spec = cfg
                .pylogger_options
                .formatters
                .get(formatter_name)
                .ok_or_else(|| LoggingError::UnknownFormatter {
                    handler: name.to_string(),
                    formatter: formatter_name.clone(),
                })?;
            RecordFormatter::parse(&spec.format)
        }
        None => RecordFormatter::message_only(),
    };
    let sink = if is_file_handler(name, spec) {
        let path = resolve_log_file(cfg, spec)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| LoggingError::FileUnusable {
                path: path.clone(),
                source,
            })?;
        }
        let writer = RotatingFileWriter::open(
            &path,
            spec.max_bytes.unwrap_or(0),
            spec.backup_count.unwrap_or(0),
        )
        .map_err(|source| LoggingError::FileUnusable {
            path: path.clone(),
            source,
        })?;
        Sink::File(Mutex::new(writer))
    } else {
        Sink::Console
    };
    Ok(Handler {
        level,
        formatter,
        sink,
    })
}

fn is_file_handler(name: &str, spec: &HandlerSpec) -> bool {
    name == FILE_HANDLER_NAME
        || spec.filename.is_some()
        || spec.max_bytes.is_some()
        || spec.backup_count.is_some()
}

/// The file handler target: explicit handler filename, then the configured
/// `log_file`, then the per-user default location.
fn resolve_log_file(cfg: &LoggingConfig, spec: &HandlerSpec) -> Result<PathBuf, LoggingError> {
    if let Some(path) = &spec.filename {
        return Ok(path.clone());
    }
    if let Some(path) = &cfg.log_file {
        return Ok(path.clone());
    }
    default_log_file()
}

/// `~/.vaayu/vaayu.log`, creating the directory when needed.
fn default_log_file() -> Result<PathBuf, LoggingError> {
    let dirs = UserDirs::new().ok_or(LoggingError::NoDefaultLogFile)?;
    let dir = dirs.home_dir().join(DEFAULT_LOG_DIR);
    fs::create_dir_all(&dir).map_err(|source| LoggingError::FileUnusable {
        path: dir.clone(),
        source,
    })?;
    Ok(dir.join(DEFAULT_LOG_FILE))
}

fn parse_level(name: &str) -> Result<LevelFilter, LoggingError> {
    match name.to_ascii_uppercase().as_str() {
        "CRITICAL" | "ERROR" => Ok(LevelFilter::Error),
        "WARNING" | "WARN" => Ok(LevelFilter::Warn),
        "INFO" => Ok(LevelFilter::Info),
        "DEBUG" => Ok(LevelFilter::Debug),
        "TRACE" | "NOTSET" => Ok(LevelFilter::Trace),
        _ => Err(LoggingError::UnknownLevel(name.to_string())),
    }
}

/// Map Rust module targets onto dotted logger names.
fn normalize_target(target: &str) -> String {
    target.replace("::", ".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Log;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn console_only_cfg() -> LoggingConfig {
        serde_yaml::from_str(
            r#"
            log_to_file: false
            pylogger_options:
              formatters:
                stdout:
                  format: "%(levelname)s: %(message)s"
              handlers:
                console:
                  level: INFO
                  formatter: stdout
              root:
                level: INFO
                handlers: [console]
            "#,
        )
        .expect("cfg")
    }

    fn file_cfg(log_file: &std::path::Path) -> LoggingConfig {
        let yaml = format!(
            r#"
            log_to_file: true
            log_file: {}
            pylogger_options:
              formatters:
                default:
                  format: "%(name)s:%(levelname)s: %(message)s"
              handlers:
                console:
                  level: INFO
                log_file:
                  level: DEBUG
                  formatter: default
                  maxBytes: 1048576
                  backupCount: 3
              loggers:
                vaayu:
                  level: DEBUG
                  handlers: [console]
                  propagate: false
              root:
                level: INFO
                handlers: [console]
            "#,
            log_file.display()
        );
        serde_yaml::from_str(&yaml).expect("cfg")
    }

    #[test]
    fn install_is_idempotent() {
        let facility = LogFacility::new();
        let cfg = console_only_cfg();
        install(&facility, &cfg).expect("install");
        install(&facility, &cfg).expect("reinstall");
        assert_eq!(facility.installed_handlers(), vec!["console".to_string()]);
    }

    #[test]
    fn file_handler_is_registered_when_enabled() {
        let temp = TempDir::new().expect("tmp");
        let facility = LogFacility::new();
        let cfg = file_cfg(&temp.path().join("vaayu.log"));
        install(&facility, &cfg).expect("install");
        install(&facility, &cfg).expect("reinstall");
        assert_eq!(
            facility.installed_handlers(),
            vec!["console".to_string(), "log_file".to_string()]
        );
    }

    #[test]
    fn file_handler_is_skipped_when_disabled() {
        let facility = LogFacility::new();
        let mut cfg = file_cfg(std::path::Path::new("/nonexistent/vaayu.log"));
        cfg.log_to_file = false;
        // The unusable path must not matter when file logging is off.
        install(&facility, &cfg).expect("install");
        assert_eq!(facility.installed_handlers(), vec!["console".to_string()]);
    }

    #[test]
    fn unusable_log_file_is_an_error() {
        let temp = TempDir::new().expect("tmp");
        // A directory at the target path makes the file unopenable.
        let blocked = temp.path().join("vaayu.log");
        fs::create_dir(&blocked).expect("dir");

        let facility = LogFacility::new();
        let cfg = file_cfg(&blocked);
        let err = install(&facility, &cfg).unwrap_err();
        assert!(matches!(err, LoggingError::FileUnusable { .. }));
    }

    #[test]
    fn unknown_formatter_is_an_error() {
        let mut cfg = console_only_cfg();
        cfg.pylogger_options
            .handlers
            .get_mut("console")
            .expect("console")
            .formatter = Some("missing".to_string());
        let facility = LogFacility::new();
        let err = install(&facility, &cfg).unwrap_err();
        assert!(matches!(err, LoggingError::UnknownFormatter { .. }));
    }

    #[test]
    fn records_reach_the_file_handler() {
        let temp = TempDir::new().expect("tmp");
        let log_file = temp.path().join("vaayu.log");
        let facility = LogFacility::new();
        install(&facility, &file_cfg(&log_file)).expect("install");

        facility.log(
            &Record::builder()
                .args(format_args!("resolved configuration"))
                .level(Level::Info)
                .target("vaayu.cfg")
                .build(),
        );
        facility.flush();

        let contents = fs::read_to_string(&log_file).expect("log");
        assert_eq!(contents, "vaayu.cfg:INFO: resolved configuration\n");
    }

    #[test]
    fn non_library_targets_fall_through_to_root() {
        let temp = TempDir::new().expect("tmp");
        let log_file = temp.path().join("vaayu.log");
        let facility = LogFacility::new();
        install(&facility, &file_cfg(&log_file)).expect("install");

        facility.log(
            &Record::builder()
                .args(format_args!("unrelated"))
                .level(Level::Info)
                .target("other_crate::module")
                .build(),
        );
        facility.flush();

        // Root only has the console handler, so the file stays empty.
        let contents = fs::read_to_string(&log_file).expect("log");
        assert_eq!(contents, "");
    }
}
