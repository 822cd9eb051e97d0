//! Runtime configuration shared by the server and the interactive clients.
//!
//! # Responsibility
//! - Load settings from an optional JSON file, then apply environment overrides.
//! - Refuse to start without an externally supplied database location.
//!
//! # Invariants
//! - Store location and credentials are never compiled in.
//! - Environment values win over file values.

use crate::logging::default_log_level;
use crate::service::employee_service::FailurePolicy;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

pub const ENV_DB_PATH: &str = "STAFFROLL_DB_PATH";
pub const ENV_DB_BUSY_TIMEOUT_MS: &str = "STAFFROLL_DB_BUSY_TIMEOUT_MS";
pub const ENV_HTTP_HOST: &str = "STAFFROLL_HTTP_HOST";
pub const ENV_HTTP_PORT: &str = "STAFFROLL_HTTP_PORT";
pub const ENV_LOG_LEVEL: &str = "STAFFROLL_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "STAFFROLL_LOG_DIR";
pub const ENV_ON_STORE_ERROR: &str = "STAFFROLL_ON_STORE_ERROR";

#[derive(Debug)]
pub enum ConfigError {
    Read { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: serde_json::Error },
    MissingDatabasePath,
    InvalidValue { key: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse config `{}`: {source}", path.display())
            }
            Self::MissingDatabasePath => write!(
                f,
                "database path is not configured; set {ENV_DB_PATH} or `store.path`"
            ),
            Self::InvalidValue { key, value } => write!(f, "invalid value `{value}` for {key}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::MissingDatabasePath | Self::InvalidValue { .. } => None,
        }
    }
}

/// Store connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// SQLite database file. Required.
    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl StoreConfig {
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: None,
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl HttpConfig {
    /// `host:port`, with IPv6 literals bracketed.
    pub fn socket_addr(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,

    /// Absolute directory for rolling log files. Unset means no file logging.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            dir: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub on_store_error: FailurePolicy,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub clients: ClientConfig,
}

fn default_busy_timeout_ms() -> u64 {
    5_000
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_level() -> String {
    default_log_level().to_string()
}

impl AppConfig {
    /// Loads configuration from `file` (when given) and the process environment.
    ///
    /// Does not require the database path; call [`AppConfig::database_path`]
    /// once every override (including command-line flags) has been applied.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Applies `STAFFROLL_*` overrides resolved through `lookup`.
    ///
    /// Empty values are treated as unset.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(path) = get(ENV_DB_PATH) {
            self.store.path = Some(PathBuf::from(path));
        }
        if let Some(value) = get(ENV_DB_BUSY_TIMEOUT_MS) {
            self.store.busy_timeout_ms = parse_value(ENV_DB_BUSY_TIMEOUT_MS, &value)?;
        }
        if let Some(host) = get(ENV_HTTP_HOST) {
            self.http.host = host;
        }
        if let Some(value) = get(ENV_HTTP_PORT) {
            self.http.port = parse_value(ENV_HTTP_PORT, &value)?;
        }
        if let Some(level) = get(ENV_LOG_LEVEL) {
            self.logging.level = level;
        }
        if let Some(dir) = get(ENV_LOG_DIR) {
            self.logging.dir = Some(PathBuf::from(dir));
        }
        if let Some(value) = get(ENV_ON_STORE_ERROR) {
            self.clients.on_store_error = parse_value(ENV_ON_STORE_ERROR, &value)?;
        }
        Ok(())
    }

    /// Returns the configured database path, or an error when none was supplied.
    pub fn database_path(&self) -> Result<&Path, ConfigError> {
        self.store
            .path
            .as_deref()
            .filter(|path| !path.as_os_str().is_empty())
            .ok_or(ConfigError::MissingDatabasePath)
    }
}

fn parse_value<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}
