//! Runtime configuration.
//!
//! Resolution order per field: environment variable, then
//! `<config_dir>/daymark/config.toml`, then built-in defaults.

use crate::logging::{default_log_level, normalize_level};
use crate::persist::{
    JsonFileAdapter, PersistResult, PersistenceAdapter, SqliteBlobAdapter, DEFAULT_STORAGE_KEY,
};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const ENV_DATA_DIR: &str = "DAYMARK_DATA_DIR";
pub const ENV_LOG_LEVEL: &str = "DAYMARK_LOG_LEVEL";
pub const ENV_STORE: &str = "DAYMARK_STORE";

const APP_DIR_NAME: &str = "daymark";
const CONFIG_FILE_NAME: &str = "config.toml";
const SQLITE_FILE_NAME: &str = "daymark.sqlite3";
const JSON_FILE_NAME: &str = "calendar-data.json";
const LOG_DIR_NAME: &str = "logs";

#[derive(Debug)]
pub enum ConfigError {
    Read { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: toml::de::Error },
    InvalidValue { field: &'static str, value: String },
    NoDataDir,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "invalid config `{}`: {source}", path.display())
            }
            Self::InvalidValue { field, value } => {
                write!(f, "invalid value `{value}` for `{field}`")
            }
            Self::NoDataDir => write!(f, "no data directory available; set {ENV_DATA_DIR}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Where the annotation blob lives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Sqlite,
    #[serde(alias = "json")]
    File,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "file" | "json" => Ok(Self::File),
            other => Err(ConfigError::InvalidValue {
                field: "storage_backend",
                value: other.to_string(),
            }),
        }
    }
}

impl Display for StorageBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite => write!(f, "sqlite"),
            Self::File => write!(f, "file"),
        }
    }
}

/// Optional overrides read from `config.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub data_dir: Option<PathBuf>,
    pub log_level: Option<String>,
    pub storage_backend: Option<StorageBackend>,
    pub storage_key: Option<String>,
}

/// Resolved runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub data_dir: PathBuf,
    pub log_level: &'static str,
    pub storage_backend: StorageBackend,
    pub storage_key: String,
}

impl CoreConfig {
    /// Defaults rooted at `data_dir`.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            log_level: default_log_level(),
            storage_backend: StorageBackend::default(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }

    /// Resolves configuration from the environment and the user config file.
    pub fn load() -> Result<Self, ConfigError> {
        let file = match config_file_path() {
            Some(path) if path.exists() => read_file_config(&path)?,
            _ => FileConfig::default(),
        };
        Self::resolve(file, |name| std::env::var(name).ok())
    }

    /// Merges file values, environment values and defaults.
    pub fn resolve(
        file: FileConfig,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let lookup = |name: &str| env(name).filter(|value| !value.trim().is_empty());

        let data_dir = lookup(ENV_DATA_DIR)
            .map(PathBuf::from)
            .or(file.data_dir)
            .or_else(|| dirs::data_dir().map(|dir| dir.join(APP_DIR_NAME)))
            .ok_or(ConfigError::NoDataDir)?;

        let mut config = Self::with_data_dir(data_dir);

        if let Some(level) = lookup(ENV_LOG_LEVEL).or(file.log_level) {
            config.log_level = normalize_level(&level).map_err(|_| ConfigError::InvalidValue {
                field: "log_level",
                value: level.clone(),
            })?;
        }
        if let Some(backend) = lookup(ENV_STORE) {
            config.storage_backend = backend.parse()?;
        } else if let Some(backend) = file.storage_backend {
            config.storage_backend = backend;
        }
        if let Some(key) = file.storage_key.filter(|key| !key.trim().is_empty()) {
            config.storage_key = key;
        }

        Ok(config)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join(LOG_DIR_NAME)
    }

    /// Blob location for the configured backend.
    pub fn storage_path(&self) -> PathBuf {
        match self.storage_backend {
            StorageBackend::Sqlite => self.data_dir.join(SQLITE_FILE_NAME),
            StorageBackend::File => self.data_dir.join(JSON_FILE_NAME),
        }
    }

    /// Opens the configured adapter, creating the data directory if needed.
    pub fn open_adapter(&self) -> PersistResult<Box<dyn PersistenceAdapter>> {
        std::fs::create_dir_all(&self.data_dir)?;
        let path = self.storage_path();
        let adapter: Box<dyn PersistenceAdapter> = match self.storage_backend {
            StorageBackend::Sqlite => {
                Box::new(SqliteBlobAdapter::open(path, self.storage_key.clone())?)
            }
            StorageBackend::File => Box::new(JsonFileAdapter::new(path)),
        };
        Ok(adapter)
    }
}

/// `<config_dir>/daymark/config.toml`, when the platform has a config dir.
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}

pub fn read_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::{
        read_file_config, ConfigError, CoreConfig, FileConfig, StorageBackend, ENV_DATA_DIR,
        ENV_LOG_LEVEL, ENV_STORE,
    };
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn environment_overrides_file_values() {
        let file = FileConfig {
            data_dir: Some(PathBuf::from("/from/file")),
            log_level: Some("error".to_string()),
            storage_backend: Some(StorageBackend::File),
            storage_key: Some("custom".to_string()),
        };
        let config = CoreConfig::resolve(
            file,
            env_of(&[
                (ENV_DATA_DIR, "/from/env"),
                (ENV_LOG_LEVEL, "Warning"),
                (ENV_STORE, "sqlite"),
            ]),
        )
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/from/env"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.storage_backend, StorageBackend::Sqlite);
        assert_eq!(config.storage_key, "custom");
        assert_eq!(
            config.storage_path(),
            PathBuf::from("/from/env/daymark.sqlite3")
        );
    }

    #[test]
    fn file_values_apply_when_environment_is_silent() {
        let file = FileConfig {
            data_dir: Some(PathBuf::from("/from/file")),
            storage_backend: Some(StorageBackend::File),
            ..FileConfig::default()
        };
        let config = CoreConfig::resolve(file, env_of(&[(ENV_STORE, "  ")])).unwrap();

        assert_eq!(config.storage_backend, StorageBackend::File);
        assert_eq!(config.storage_key, "calendarData");
        assert_eq!(
            config.storage_path(),
            PathBuf::from("/from/file/calendar-data.json")
        );
        assert_eq!(config.log_dir(), PathBuf::from("/from/file/logs"));
    }

    #[test]
    fn invalid_values_are_reported() {
        let err = CoreConfig::resolve(
            FileConfig::default(),
            env_of(&[(ENV_DATA_DIR, "/tmp/x"), (ENV_STORE, "redis")]),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { field: "storage_backend", .. }
        ));

        let err = CoreConfig::resolve(
            FileConfig::default(),
            env_of(&[(ENV_DATA_DIR, "/tmp/x"), (ENV_LOG_LEVEL, "loud")]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { field: "log_level", .. }));
    }

    #[test]
    fn toml_file_is_parsed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "data_dir = \"/srv/daymark\"\nstorage_backend = \"json\"\nlog_level = \"debug\"\n",
        )
        .unwrap();

        let file = read_file_config(&path).unwrap();
        assert_eq!(file.data_dir, Some(PathBuf::from("/srv/daymark")));
        assert_eq!(file.storage_backend, Some(StorageBackend::File));
        assert_eq!(file.log_level.as_deref(), Some("debug"));

        std::fs::write(&path, "storage_backend = 3\n").unwrap();
        assert!(matches!(
            read_file_config(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
