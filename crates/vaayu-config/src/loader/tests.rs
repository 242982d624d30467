//! Tests for namespace merging and layered rc-file loading.

use super::*;
use pretty_assertions::assert_eq;
use serde_yaml::Value;
use std::fs;
use std::path::Path;

use tempfile::TempDir;

/// Parse a namespace from inline YAML.
fn ns(contents: &str) -> ConfigNamespace {
    ConfigNamespace::from_yaml_str(contents).expect("namespace")
}

/// Write rc contents to a path, creating parent directories if needed.
fn write_rc(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("dir");
    }
    fs::write(path, contents).expect("write");
}

#[test]
fn defaults_contain_reserved_namespaces() {
    let config = VaayuConfig::load_defaults().expect("defaults");
    for name in crate::RESERVED_NAMESPACES {
        assert!(config.get(name).expect("namespace").is_mapping());
    }
}

#[test]
fn defaults_expose_documented_values() {
    let config = VaayuConfig::load_defaults().expect("defaults");
    assert_eq!(
        config.get("vaayu.conda.vaayu_env").expect("env").as_str(),
        Some("vaayu-env")
    );
    assert_eq!(
        config.get("vaayu.conda.conda_bin").expect("bin").as_str(),
        Some("~/anaconda/bin")
    );
    assert_eq!(
        config
            .get("vaayu.logging.log_to_file")
            .expect("flag")
            .as_bool(),
        Some(true)
    );
    assert!(config.get("vaayu.logging.log_file").expect("path").is_null());
    assert_eq!(
        config
            .get("vaayu.logging.pylogger_options.version")
            .expect("version")
            .as_u64(),
        Some(1)
    );
    assert_eq!(
        config
            .get("vaayu.logging.pylogger_options.handlers.log_file.maxBytes")
            .expect("maxBytes")
            .as_u64(),
        Some(10_485_760)
    );
}

#[test]
fn merge_is_right_biased() {
    let base = ns("vaayu:\n  conda:\n    vaayu_env: one\n    conda_bin: keep");
    let overlay = ns("vaayu:\n  conda:\n    vaayu_env: two");
    let merged = base.merge(&overlay);
    assert_eq!(
        merged.get("vaayu.conda.vaayu_env").expect("env").as_str(),
        Some("two")
    );
    assert_eq!(
        merged.get("vaayu.conda.conda_bin").expect("bin").as_str(),
        Some("keep")
    );
}

#[test]
fn merge_adds_keys_missing_from_base() {
    let base = ns("vaayu: {}");
    let overlay = ns("user:\n  site: denmark");
    let merged = base.merge(&overlay);
    assert_eq!(merged.get("user.site").expect("site").as_str(), Some("denmark"));
    assert!(merged.get("vaayu").expect("vaayu").is_mapping());
}

#[test]
fn merge_replaces_sequences_wholesale() {
    let base = ns("vaayu:\n  turbines: [a, b, c]");
    let overlay = ns("vaayu:\n  turbines: [d]");
    let merged = base.merge(&overlay);
    let turbines = merged
        .get("vaayu.turbines")
        .expect("turbines")
        .as_sequence()
        .expect("sequence")
        .clone();
    assert_eq!(turbines, vec![Value::String("d".to_string())]);
}

#[test]
fn merge_does_not_mutate_inputs() {
    let base = ns("vaayu:\n  conda:\n    vaayu_env: one");
    let overlay = ns("vaayu:\n  conda:\n    vaayu_env: two");
    let base_before = base.clone();
    let overlay_before = overlay.clone();
    let _ = base.merge(&overlay);
    assert_eq!(base, base_before);
    assert_eq!(overlay, overlay_before);
}

#[test]
fn merge_is_idempotent() {
    let source = ns("vaayu:\n  logging:\n    log_to_file: true\n  tags: [x, y]");
    assert_eq!(source.merge(&source), source);
}

#[test]
fn resolve_empty_returns_reserved_namespaces() {
    let config = VaayuConfig::resolve(&[]).expect("resolve");
    let expected = ns("vaayu: {}\nvaayu_scripts: {}\nuser: {}");
    assert_eq!(config.namespace(), &expected);
}

#[test]
fn resolve_single_source_is_identity() {
    let defaults = VaayuConfig::load_defaults().expect("defaults");
    let resolved = VaayuConfig::resolve(&[defaults.namespace().clone()]).expect("resolve");
    assert_eq!(resolved, defaults);
}

/// Overrides nested under `user` stay in the user namespace; they do not
/// reach into `vaayu` unless applied at the matching path.
#[test]
fn user_namespace_overrides_do_not_leak_into_vaayu() {
    let defaults = VaayuConfig::load_defaults().expect("defaults");
    let overlay = ns("user:\n  vaayu:\n    logging:\n      log_to_file: false");
    let resolved =
        VaayuConfig::resolve(&[defaults.namespace().clone(), overlay]).expect("resolve");
    assert_eq!(
        resolved
            .get("vaayu.logging.log_to_file")
            .expect("flag")
            .as_bool(),
        Some(true)
    );
    assert_eq!(
        resolved
            .get("user.vaayu.logging.log_to_file")
            .expect("user flag")
            .as_bool(),
        Some(false)
    );
}

#[test]
fn override_at_matching_path_takes_effect() {
    let defaults = VaayuConfig::load_defaults().expect("defaults");
    let overlay = ns("vaayu:\n  logging:\n    log_to_file: false");
    let resolved =
        VaayuConfig::resolve(&[defaults.namespace().clone(), overlay]).expect("resolve");
    assert_eq!(
        resolved
            .get("vaayu.logging.log_to_file")
            .expect("flag")
            .as_bool(),
        Some(false)
    );
}

#[test]
fn get_missing_path_is_a_key_error() {
    let config = VaayuConfig::load_defaults().expect("defaults");
    let err = config.get("vaayu.nonexistent.key").unwrap_err();
    assert!(matches!(err, ConfigError::Key { .. }));
}

#[test]
fn get_or_returns_the_default() {
    let config = VaayuConfig::load_defaults().expect("defaults");
    let fallback = Value::String("fallback".to_string());
    assert_eq!(
        config.get_or("vaayu.nonexistent.key", &fallback).as_str(),
        Some("fallback")
    );
}

#[test]
fn set_creates_intermediate_mappings() {
    let mut namespace = ns("vaayu: {}");
    namespace.set("vaayu.site.location", Value::String("bergen".to_string()));
    assert_eq!(
        namespace
            .get("vaayu.site.location")
            .expect("location")
            .as_str(),
        Some("bergen")
    );
}

#[test]
fn set_merges_into_existing_mappings() {
    let mut namespace = ns("vaayu:\n  site:\n    location: bergen");
    namespace.set("vaayu.site", serde_yaml::from_str("altitude: 12").expect("value"));
    assert_eq!(
        namespace
            .get("vaayu.site.location")
            .expect("location")
            .as_str(),
        Some("bergen")
    );
    assert_eq!(
        namespace.get("vaayu.site.altitude").expect("altitude").as_u64(),
        Some(12)
    );
}

#[test]
fn walk_yields_dotted_leaf_paths() {
    let namespace = ns("vaayu:\n  a: 1\n  nested:\n    b: 2\nuser: {}");
    let leaves: Vec<String> = namespace.walk().map(|(path, _)| path).collect();
    assert_eq!(leaves, vec!["vaayu.a".to_string(), "vaayu.nested.b".to_string()]);
}

#[test]
fn malformed_yaml_is_a_parse_error() {
    let err = ConfigNamespace::from_yaml_str("vaayu: [unclosed").unwrap_err();
    assert!(matches!(err, ConfigError::ParseFailed(_)));
}

#[test]
fn missing_reserved_namespace_is_a_schema_error() {
    // from_namespace repairs missing namespaces, so exercise the validator
    // through a scalar-valued reserved key instead.
    let err = VaayuConfig::from_namespace(ns("vaayu: 42")).unwrap_err();
    assert!(matches!(err, ConfigError::Schema { .. }));
}

#[test]
fn unknown_top_level_key_is_rejected() {
    let temp = TempDir::new().expect("tmp");
    let rc = temp.path().join("vaayurc.yml");
    write_rc(&rc, "unexpected: true");
    let err = layer_io::load_required_layer(ConfigLayerSource::Runtime, &rc).unwrap_err();
    let message = format!("{err}");
    assert!(message.contains("unknown key"));
}

#[test]
fn pylogger_version_must_be_one() {
    let temp = TempDir::new().expect("tmp");
    let rc = temp.path().join("vaayurc.yml");
    write_rc(
        &rc,
        "vaayu:\n  logging:\n    pylogger_options:\n      version: 2",
    );
    let err = layer_io::load_required_layer(ConfigLayerSource::Runtime, &rc).unwrap_err();
    assert!(matches!(err, ConfigError::Schema { .. }));
}

#[test]
fn layered_rc_files_apply_in_search_order() {
    let temp = TempDir::new().expect("tmp");
    let root = temp.path();
    let cwd = root.join("work");
    fs::create_dir_all(&cwd).expect("cwd");

    let system_rc = root.join("system-vaayurc.yml");
    write_rc(&system_rc, "vaayu:\n  conda:\n    vaayu_env: system");
    let home_rc = root.join("home-vaayurc.yml");
    write_rc(&home_rc, "vaayu:\n  conda:\n    vaayu_env: home");
    write_rc(&cwd.join(RC_FILE_NAME), "vaayu:\n  conda:\n    vaayu_env: cwd");

    let mut options = VaayuRcOptions::new(&cwd);
    options.system_rc_path = Some(system_rc);
    options.home_rc_path = Some(home_rc);
    options.env_rc_path = None;

    let layered = VaayuConfig::load_layered_with_options(options).expect("layered");
    assert_eq!(
        layered
            .config
            .get("vaayu.conda.vaayu_env")
            .expect("env")
            .as_str(),
        Some("cwd")
    );
    let sources: Vec<ConfigLayerSource> =
        layered.layers.iter().map(|layer| layer.source).collect();
    assert_eq!(
        sources,
        vec![
            ConfigLayerSource::Defaults,
            ConfigLayerSource::System,
            ConfigLayerSource::Home,
            ConfigLayerSource::Cwd,
        ]
    );
}

#[test]
fn runtime_overrides_apply_last() {
    let temp = TempDir::new().expect("tmp");
    let cwd = temp.path().join("work");
    fs::create_dir_all(&cwd).expect("cwd");
    write_rc(&cwd.join(RC_FILE_NAME), "vaayu:\n  conda:\n    vaayu_env: cwd");

    let runtime_rc = temp.path().join("script-overrides.yml");
    write_rc(&runtime_rc, "vaayu:\n  conda:\n    vaayu_env: script");

    let mut options = VaayuRcOptions::new(&cwd).with_runtime_path(&runtime_rc);
    options.system_rc_path = None;
    options.home_rc_path = None;
    options.env_rc_path = None;

    let layered = VaayuConfig::load_layered_with_options(options).expect("layered");
    assert_eq!(
        layered
            .config
            .get("vaayu.conda.vaayu_env")
            .expect("env")
            .as_str(),
        Some("script")
    );
}

#[test]
fn duplicate_rc_paths_are_loaded_once() {
    let temp = TempDir::new().expect("tmp");
    let cwd = temp.path().join("work");
    fs::create_dir_all(&cwd).expect("cwd");
    let rc = cwd.join(RC_FILE_NAME);
    write_rc(&rc, "vaayu:\n  conda:\n    vaayu_env: local");

    let mut options = VaayuRcOptions::new(&cwd);
    // Point the env layer at the same file the cwd layer will discover.
    options.system_rc_path = None;
    options.home_rc_path = None;
    options.env_rc_path = Some(rc);

    let layered = VaayuConfig::load_layered_with_options(options).expect("layered");
    let file_layers = layered
        .layers
        .iter()
        .filter(|layer| layer.path.is_some())
        .count();
    assert_eq!(file_layers, 1);
}

#[test]
fn typed_logging_view_matches_defaults() {
    let config = VaayuConfig::load_defaults().expect("defaults");
    let logging = config.logging().expect("logging");
    assert!(logging.log_to_file);
    assert!(logging.log_file.is_none());

    let options = &logging.pylogger_options;
    assert_eq!(options.version, 1);
    assert!(!options.disable_existing_loggers);
    assert_eq!(
        options.formatters.get("stdout").expect("stdout").format,
        "%(levelname)s: %(message)s"
    );
    let log_file = options.handlers.get("log_file").expect("handler");
    assert_eq!(log_file.max_bytes, Some(10_485_760));
    assert_eq!(log_file.backup_count, Some(10));
    let vaayu = options.loggers.get("vaayu").expect("logger");
    assert!(!vaayu.propagate);
    assert_eq!(vaayu.handlers, vec!["console".to_string()]);
}

#[test]
fn namespace_round_trips_through_yaml() {
    let config = VaayuConfig::load_defaults().expect("defaults");
    let dumped = config.namespace().to_yaml().expect("dump");
    let reparsed = ConfigNamespace::from_yaml_str(&dumped).expect("reparse");
    assert_eq!(&reparsed, config.namespace());
}
