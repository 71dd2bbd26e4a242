use std::ffi::OsString;
use std::sync::Mutex;

use pretty_assertions::assert_eq;
use protoscope_config::{
    discover_config_path, load_for_workspace, ConfigError, ProtoscopeConfig,
    PROTOSCOPE_CONFIG_ENV_VAR,
};
use tempfile::tempdir;

static ENV_LOCK: Mutex<()> = Mutex::new(());

struct EnvVarGuard {
    key: &'static str,
    prev: Option<OsString>,
}

impl EnvVarGuard {
    fn set(key: &'static str, value: impl Into<OsString>) -> Self {
        let prev = std::env::var_os(key);
        std::env::set_var(key, value.into());
        Self { key, prev }
    }

    fn unset(key: &'static str) -> Self {
        let prev = std::env::var_os(key);
        std::env::remove_var(key);
        Self { key, prev }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        match &self.prev {
            Some(value) => std::env::set_var(self.key, value),
            None => std::env::remove_var(self.key),
        }
    }
}

#[test]
fn discovers_workspace_root_file() {
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK mutex poisoned");
    let _env = EnvVarGuard::unset(PROTOSCOPE_CONFIG_ENV_VAR);

    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join(".protoscope.toml"), "").unwrap();
    let config_path = dir.path().join("protoscope.toml");
    std::fs::write(&config_path, "[features]\nbracketless_methods = false\n").unwrap();

    let discovered = discover_config_path(dir.path()).expect("config should be discovered");
    assert_eq!(discovered, config_path.canonicalize().unwrap());

    let (config, _) = load_for_workspace(dir.path()).unwrap();
    assert!(!config.features.bracketless_methods);
    assert!(config.features.annotation_inheritance);
}

#[test]
fn env_override_wins_over_workspace_file() {
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK mutex poisoned");

    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("protoscope.toml"), "").unwrap();
    let override_path = dir.path().join("override.toml");
    std::fs::write(
        &override_path,
        "[discovery]\ngenerated_markers = [\"a.Generated\", \"b.Generated\"]\n",
    )
    .unwrap();

    let _env = EnvVarGuard::set(PROTOSCOPE_CONFIG_ENV_VAR, "override.toml");

    let (config, path) = load_for_workspace(dir.path()).unwrap();
    assert_eq!(
        config.discovery.generated_markers,
        vec!["a.Generated".to_string(), "b.Generated".to_string()]
    );
    assert_eq!(config.discovery.manifest_path, "binis/annotations");
    assert_eq!(path, Some(override_path.canonicalize().unwrap()));
}

#[test]
fn missing_config_returns_defaults() {
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK mutex poisoned");
    let _env = EnvVarGuard::unset(PROTOSCOPE_CONFIG_ENV_VAR);

    let dir = tempdir().unwrap();
    let (config, path) = load_for_workspace(dir.path()).unwrap();
    assert_eq!(path, None);
    assert_eq!(config, ProtoscopeConfig::default());
}

#[test]
fn unknown_keys_are_rejected() {
    let err = ProtoscopeConfig::load_from_str("[features]\nbracketles_methods = false\n")
        .expect_err("typo should be rejected");
    match err {
        ConfigError::Toml(message) => assert!(message.contains("bracketles_methods"), "{message}"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn unreadable_path_reports_io_error() {
    let dir = tempdir().unwrap();
    let err = ProtoscopeConfig::load_from_path(dir.path().join("missing.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}
