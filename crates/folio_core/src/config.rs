//! Runtime configuration.
//!
//! # Responsibility
//! - Describe every tunable of the store, notifier, editor and logging.
//! - Load overrides from an optional JSON file; missing fields use defaults.
//!
//! # Invariants
//! - `poll_interval_ms` and `quota_bytes` are strictly positive after load.

use crate::logging::default_log_level;
use crate::model::seed::SeedSource;
use crate::service::gate::{AdminGate, DEFAULT_ADMIN_PASSPHRASE};
use crate::store::DEFAULT_QUOTA_BYTES;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_DB_FILE_NAME: &str = "folio.sqlite3";

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse config `{}`: {source}", path.display())
            }
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Invalid(_) => None,
        }
    }
}

/// Folio runtime settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FolioConfig {
    /// SQLite file holding the content slots.
    pub db_path: PathBuf,
    pub log_level: String,
    /// Absolute directory for rolling logs; `None` disables file logging.
    pub log_dir: Option<PathBuf>,
    /// Re-read interval of mounted views.
    pub poll_interval_ms: u64,
    pub quota_bytes: usize,
    /// Cosmetic editor passphrase; see `service::gate`.
    pub admin_passphrase: String,
    /// Static JSON used instead of the built-in seed projects.
    pub seed_projects_path: Option<PathBuf>,
}

impl Default for FolioConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: None,
            poll_interval_ms: 1_000,
            quota_bytes: DEFAULT_QUOTA_BYTES,
            admin_passphrase: DEFAULT_ADMIN_PASSPHRASE.to_string(),
            seed_projects_path: None,
        }
    }
}

impl FolioConfig {
    /// Reads and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path` when given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "poll_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.quota_bytes == 0 {
            return Err(ConfigError::Invalid(
                "quota_bytes must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn seed_source(&self) -> SeedSource {
        match &self.seed_projects_path {
            Some(path) => SeedSource::JsonFile(path.clone()),
            None => SeedSource::Builtin,
        }
    }

    pub fn admin_gate(&self) -> AdminGate {
        AdminGate::new(self.admin_passphrase.clone())
    }
}
