use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracker_engine::{ClientSettings, StorageKey, DEFAULT_BACKEND_BASE, DEFAULT_STORAGE_KEY};
use tracker_logging::tracker_info;

use super::logging::LogDestination;

pub const DEFAULT_CONFIG_FILE: &str = "parcel_tracker.ron";
pub const BACKEND_ENV_VAR: &str = "PARCEL_TRACKER_BACKEND";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Settings read from `parcel_tracker.ron`. Every field may be omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub backend_base_url: String,
    pub storage_key: String,
    pub poll_interval_minutes: u64,
    /// How often `watch` looks for writes made by other processes.
    pub change_check_secs: u64,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    /// Platform storage directory; `None` forces the local document.
    pub data_dir: Option<PathBuf>,
    pub local_store_path: PathBuf,
    pub log_destination: LogDestination,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_base_url: DEFAULT_BACKEND_BASE.to_string(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            poll_interval_minutes: 180,
            change_check_secs: 2,
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
            data_dir: dirs::data_dir().map(|dir| dir.join("parcel-tracker")),
            local_store_path: PathBuf::from("./parcel_tracker_local.json"),
            log_destination: LogDestination::File,
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Loads `explicit` if given (it must exist), otherwise
    /// `./parcel_tracker.ron` if present, otherwise defaults. The
    /// backend environment variable wins over the file.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => Self::from_optional_file(Path::new(DEFAULT_CONFIG_FILE))?,
        };
        config.apply_backend_override(std::env::var(BACKEND_ENV_VAR).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron(path, &text)
    }

    fn from_optional_file(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(text) => Self::from_ron(path, &text),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    fn from_ron(path: &Path, text: &str) -> Result<Self, ConfigError> {
        let config = ron::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracker_info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn apply_backend_override(&mut self, value: Option<String>) {
        if let Some(url) = value.map(|url| url.trim().to_string()) {
            if !url.is_empty() {
                self.backend_base_url = url;
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_minutes == 0 {
            return Err(ConfigError::Invalid(
                "poll_interval_minutes must be at least 1".to_string(),
            ));
        }
        if self.change_check_secs == 0 {
            return Err(ConfigError::Invalid(
                "change_check_secs must be at least 1".to_string(),
            ));
        }
        if self.backend_base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("backend_base_url is empty".to_string()));
        }
        self.storage_key()?;
        Ok(())
    }

    pub fn storage_key(&self) -> Result<StorageKey, ConfigError> {
        StorageKey::new(self.storage_key.clone())
            .map_err(|err| ConfigError::Invalid(err.to_string()))
    }

    pub fn poll_period(&self) -> Duration {
        Duration::from_secs(self.poll_interval_minutes.saturating_mul(60))
    }

    pub fn change_check_period(&self) -> Duration {
        Duration::from_secs(self.change_check_secs)
    }

    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            base_url: self.backend_base_url.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            ..ClientSettings::default()
        }
    }
}
