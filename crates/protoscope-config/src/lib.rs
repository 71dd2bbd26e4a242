//! Workspace configuration for protoscope (`protoscope.toml`) and logging
//! initialisation.

use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Once};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Layer};

mod schema;

pub use schema::json_schema;

/// Default location of the template manifest inside dependency archives.
pub const DEFAULT_MANIFEST_PATH: &str = "binis/annotations";

/// Default "this declaration was machine-generated" marker.
pub const DEFAULT_GENERATED_MARKER: &str = "javax.annotation.processing.Generated";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
#[schemars(deny_unknown_fields)]
pub struct ProtoscopeConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub features: FeaturesConfig,

    #[serde(default)]
    pub discovery: DiscoveryConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
#[schemars(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level for all protoscope crates.
    ///
    /// Either a simple level (`info`, `debug`, ...) or a full
    /// `tracing_subscriber::EnvFilter` directive string.
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,

    /// Emit logs in JSON format.
    #[serde(default)]
    pub json: bool,

    /// Mirror logs to stderr.
    #[serde(default = "LoggingConfig::default_stderr")]
    pub stderr: bool,

    /// Append logs to the given file path.
    ///
    /// If the file cannot be opened, file logging is disabled while other sinks
    /// remain active.
    #[serde(default)]
    #[schemars(with = "Option<String>")]
    pub file: Option<PathBuf>,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_owned()
    }

    fn default_stderr() -> bool {
        true
    }

    /// `level` as filter directives: a bare level name in any case
    /// (`warning` is accepted for `warn`), or a directive string as is.
    pub(crate) fn directives(&self) -> String {
        let level = self.level.trim();
        match level.to_ascii_lowercase().as_str() {
            "" => Self::default_level(),
            "warning" => "warn".to_owned(),
            name @ ("trace" | "debug" | "info" | "warn" | "error") => name.to_owned(),
            _ => level.to_owned(),
        }
    }

    /// The configured level with `RUST_LOG` layered on top. Falls back to the
    /// configured level alone, then to `info`, when directives do not parse.
    pub fn env_filter(&self) -> EnvFilter {
        let configured = self.directives();
        let from_env = std::env::var("RUST_LOG")
            .ok()
            .filter(|value| !value.trim().is_empty());
        let combined = match from_env {
            Some(env) => format!("{configured},{}", env.trim()),
            None => configured.clone(),
        };
        EnvFilter::try_new(combined)
            .or_else(|_| EnvFilter::try_new(configured))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            json: false,
            stderr: Self::default_stderr(),
            file: None,
        }
    }
}

/// Toggles for the optional augmentation and editor features.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
#[schemars(deny_unknown_fields)]
pub struct FeaturesConfig {
    /// Copy members of annotation types listed in an annotation's `extends` clause.
    #[serde(default = "default_true")]
    pub annotation_inheritance: bool,

    /// Expose zero-argument methods of prototypes as fields.
    #[serde(default = "default_true")]
    pub bracketless_methods: bool,

    /// Highlight query keywords inside fluent chains.
    #[serde(default = "default_true")]
    pub fluent_highlighting: bool,

    /// Warn when a prototype is referenced from non-prototype code.
    #[serde(default = "default_true")]
    pub prototype_usage_inspection: bool,
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            annotation_inheritance: true,
            bracketless_methods: true,
            fluent_highlighting: true,
            prototype_usage_inspection: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
#[schemars(deny_unknown_fields)]
pub struct DiscoveryConfig {
    /// Path of the template manifest inside dependency archives.
    #[serde(default = "DiscoveryConfig::default_manifest_path")]
    pub manifest_path: String,

    /// Annotations whose `value` attribute names the prototype a declaration
    /// was generated from.
    #[serde(default = "DiscoveryConfig::default_generated_markers")]
    #[schemars(length(min = 1))]
    pub generated_markers: Vec<String>,
}

impl DiscoveryConfig {
    fn default_manifest_path() -> String {
        DEFAULT_MANIFEST_PATH.to_owned()
    }

    fn default_generated_markers() -> Vec<String> {
        vec![DEFAULT_GENERATED_MARKER.to_owned()]
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            manifest_path: Self::default_manifest_path(),
            generated_markers: Self::default_generated_markers(),
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse toml config: {0}")]
    Toml(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        // The default `Display` includes a source snippet; keep only the message.
        ConfigError::Toml(err.message().to_owned())
    }
}

impl ProtoscopeConfig {
    pub fn load_from_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::load_from_str(&text)
    }
}

pub const PROTOSCOPE_CONFIG_ENV_VAR: &str = "PROTOSCOPE_CONFIG_PATH";

/// Discover the configuration file for a workspace root.
///
/// Search order:
/// 1) `PROTOSCOPE_CONFIG_PATH` (absolute or relative to `workspace_root`)
/// 2) `protoscope.toml` in `workspace_root`
/// 3) `.protoscope.toml` in `workspace_root`
pub fn discover_config_path(workspace_root: &Path) -> Option<PathBuf> {
    if let Some(value) = std::env::var_os(PROTOSCOPE_CONFIG_ENV_VAR) {
        let candidate = PathBuf::from(value);
        let path = if candidate.is_absolute() {
            candidate
        } else {
            workspace_root.join(candidate)
        };
        return Some(path.canonicalize().unwrap_or(path));
    }

    ["protoscope.toml", ".protoscope.toml"]
        .into_iter()
        .map(|name| workspace_root.join(name))
        .find(|path| path.is_file())
        .map(|path| path.canonicalize().unwrap_or(path))
}

/// Load the configuration for a workspace root.
///
/// If no config is present, returns [`ProtoscopeConfig::default`] and `None`.
pub fn load_for_workspace(
    workspace_root: &Path,
) -> Result<(ProtoscopeConfig, Option<PathBuf>), ConfigError> {
    let Some(path) = discover_config_path(workspace_root) else {
        return Ok((ProtoscopeConfig::default(), None));
    };

    let config = ProtoscopeConfig::load_from_path(&path)?;
    tracing::debug!(target: "protoscope.config", path = %path.display(), "loaded configuration");
    Ok((config, Some(path)))
}

/// Stderr and/or the configured log file. Returns the error that kept the
/// file from opening, if any; the other sinks stay active.
fn log_writer(config: &LoggingConfig) -> (BoxMakeWriter, Option<io::Error>) {
    let mut writer = BoxMakeWriter::new(io::sink);
    if config.stderr {
        writer = BoxMakeWriter::new(writer.and(io::stderr));
    }
    let mut file_error = None;
    if let Some(path) = &config.file {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => writer = BoxMakeWriter::new(writer.and(Arc::new(file))),
            Err(err) => file_error = Some(err),
        }
    }
    (writer, file_error)
}

static TRACING_INIT: Once = Once::new();

/// Installs the global `tracing` subscriber described by `[logging]`.
///
/// Only the first call in a process has an effect.
pub fn init_tracing(config: &LoggingConfig) {
    TRACING_INIT.call_once(|| {
        let (writer, file_error) = log_writer(config);
        let layer: Box<dyn Layer<_> + Send + Sync> = if config.json {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(writer)
                .with_ansi(false)
                .boxed()
        } else {
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .boxed()
        };

        let subscriber = tracing_subscriber::registry()
            .with(config.env_filter())
            .with(layer);
        if tracing::subscriber::set_global_default(subscriber).is_err() {
            return;
        }
        tracing::debug!(target: "protoscope.config", level = %config.directives(), json = config.json, "logging initialised");
        if let (Some(path), Some(err)) = (&config.file, file_error) {
            tracing::warn!(
                target: "protoscope.config",
                path = %path.display(),
                err = %err,
                "log file unavailable, logging to the other sinks only"
            );
        }
    });
}
