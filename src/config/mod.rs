//! Configuration module for vidshelf
//!
//! Holds the server address, paging and request settings of the client.
//! Stored as TOML in the user's config directory; `VIDSHELF_*` environment
//! variables override file values.

mod setup;

pub use setup::first_time_setup;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::query::DEFAULT_PAGE_SIZE;

/// Server used when nothing else is configured
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000/api";

/// Application configuration structure
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct VidshelfConfig {
    /// Base URL of the library server's API
    pub server_url: String,

    /// Items per page shared by every list view
    pub page_size: u32,

    pub request_timeout_secs: u64,

    /// Restore the last list query when no query is given
    pub remember_search: bool,

    /// Location of the preference store; the data directory when unset
    pub prefs_path: Option<PathBuf>,

    /// Suppress informational output by default
    pub quiet: bool,
}

impl Default for VidshelfConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout_secs: 10,
            remember_search: true,
            prefs_path: None,
            quiet: false,
        }
    }
}

impl VidshelfConfig {
    /// Get the path to the config file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the system config directory cannot be determined.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| {
                ConfigError::Message("Could not determine config directory".to_string())
            })?;

        Ok(config_dir.join("vidshelf").join("config.toml"))
    }

    /// Load configuration from file, creating default if it doesn't exist
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the config file cannot be read, parsed, or created.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            let default_config = Self::default();
            default_config.save_to(&config_path)?;
            return Ok(default_config);
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from `path`, then apply environment overrides
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing or cannot be parsed.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml))
            .add_source(Environment::with_prefix("VIDSHELF").try_parsing(true))
            .build()?;

        let mut config: Self = settings.try_deserialize()?;
        config.page_size = config.page_size.max(1);
        Ok(config)
    }

    /// Save configuration to the default location
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be written.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to `path`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the config directory cannot be created, the configuration
    /// cannot be serialized to TOML, or the file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| {
                    ConfigError::Message(format!("Failed to create config directory: {e}"))
                })?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Message(format!("Failed to serialize config: {e}")))?;

        fs::write(path, toml_string)
            .map_err(|e| ConfigError::Message(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// Load configuration, running first-time setup if config doesn't exist
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if loading or creating the configuration fails.
    pub fn load_or_setup() -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            first_time_setup()
        }
    }

    /// Where the preference store lives
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if no path is configured and the system data
    /// directory cannot be determined.
    pub fn prefs_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.prefs_path {
            return Ok(path.clone());
        }
        let data_dir = dirs::data_local_dir()
            .ok_or_else(|| ConfigError::Message("Could not determine data directory".to_string()))?;
        Ok(data_dir.join("vidshelf").join("prefs"))
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
