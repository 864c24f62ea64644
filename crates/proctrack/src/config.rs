use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;

use serde::Deserialize;
use thiserror::Error;

use crate::scheduler::DEFAULT_TICK_INTERVAL;

// ============================================================================
// Config (root)
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Yaml(#[from] serde_saphyr::Error),

    #[error("environment variable '{0}' is not set")]
    MissingEnvVar(String),

    #[error("environment variable '{name}' has invalid value '{value}'")]
    InvalidEnvVar { name: String, value: String },

    #[error("unclosed variable reference '${{' (missing '}}')")]
    UnclosedVarReference,
}

impl Config {
    /// Load config from a YAML file. A missing file yields defaults.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = match fs::read_to_string(path).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(ConfigError::Io(e)),
        };
        let expanded = expand_env_vars(&contents)?;
        Ok(serde_saphyr::from_str(&expanded)?)
    }

    /// Apply `PORT` and `DB_NAME` from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply `PORT` and `DB_NAME` using `lookup` to read variables.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup(ENV_PORT) {
            self.server.port = port.trim().parse().map_err(|_| ConfigError::InvalidEnvVar {
                name: ENV_PORT.to_string(),
                value: port.clone(),
            })?;
        }
        if let Some(name) = lookup(ENV_DB_NAME)
            && !name.is_empty()
        {
            self.database.name = name;
        }
        Ok(())
    }
}

/// Anchor a relative `path` at the directory holding the config file.
pub fn resolve_path(config_path: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }

    let config_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    config_dir.join(path)
}

// ============================================================================
// Defaults
// ============================================================================

/// Default config file name.
pub const DEFAULT_CONFIG_FILE: &str = "proctrack.yaml";
/// Default data directory (relative to config file).
pub const DEFAULT_DATA_DIR: &str = ".proctrack";
/// Default database name.
pub const DEFAULT_DATABASE_NAME: &str = "processes";

/// Environment variable overriding `server.port`.
pub const ENV_PORT: &str = "PORT";
/// Environment variable overriding `database.name`.
pub const ENV_DB_NAME: &str = "DB_NAME";

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_tick_interval_ms() -> u64 {
    DEFAULT_TICK_INTERVAL.as_millis() as u64
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

fn default_database_name() -> String {
    DEFAULT_DATABASE_NAME.to_string()
}

// ============================================================================
// Environment Variable Expansion
// ============================================================================

/// Substitute environment variables into raw config text before parsing.
///
/// `${VAR}` must be set, `${VAR:-fallback}` uses `fallback` when it is not,
/// and `$$` is a literal `$`. Any other `$` passes through unchanged.
/// Fallbacks are taken verbatim and are not expanded again.
///
/// ```yaml
/// server:
///   port: ${PORT:-5000}
/// database:
///   name: ${DB_NAME:-processes}
/// ```
fn expand_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        if let Some(tail) = after.strip_prefix('$') {
            out.push('$');
            rest = tail;
        } else if let Some(body) = after.strip_prefix('{') {
            let end = body.find('}').ok_or(ConfigError::UnclosedVarReference)?;
            out.push_str(&lookup_var(&body[..end])?);
            rest = &body[end + 1..];
        } else {
            out.push('$');
            rest = after;
        }
    }

    out.push_str(rest);
    Ok(out)
}

/// Resolve the inside of one `${...}` reference.
fn lookup_var(reference: &str) -> Result<String, ConfigError> {
    let (name, fallback) = match reference.split_once(":-") {
        Some((name, fallback)) => (name, Some(fallback)),
        None => (reference, None),
    };

    match (std::env::var(name), fallback) {
        (Ok(value), _) => Ok(value),
        (Err(_), Some(fallback)) => Ok(fallback.to_string()),
        (Err(_), None) => Err(ConfigError::MissingEnvVar(name.to_string())),
    }
}

// ============================================================================
// ServerConfig
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

// ============================================================================
// SchedulerConfig
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SchedulerConfig {
    /// Period between log entries of one process.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

impl SchedulerConfig {
    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.tick_interval_ms)
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

// ============================================================================
// DatabaseConfig
// ============================================================================

/// Storage backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// JSONL collections under `path/name`.
    #[default]
    File,
    /// Process memory only; everything is lost on exit.
    Memory,
}

#[derive(Debug, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    /// Data directory (relative paths resolve against the config file).
    #[serde(default = "default_data_dir")]
    pub path: PathBuf,
    /// Database name; one subdirectory of `path`.
    #[serde(default = "default_database_name")]
    pub name: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            path: default_data_dir(),
            name: default_database_name(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
