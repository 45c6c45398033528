//! Configuration for the progression engine and the CLI
//!
//! ```toml
//! data_dir = "/home/me/.local/share/kotoba"
//! catalog_path = "/home/me/vocab.json"
//!
//! [progression]
//! auto_unlock = true
//! review_intervals_hours = [2, 12, 24, 72, 168, 336]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::srs::DEFAULT_INTERVAL_HOURS;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("Config directory not found")]
    ConfigDirNotFound,

    #[error("Data directory not found")]
    DataDirNotFound,
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Longest accepted review interval: one hundred years
pub const MAX_INTERVAL_HOURS: i64 = 24 * 365 * 100;

fn default_auto_unlock() -> bool {
    true
}

fn default_review_intervals_hours() -> Vec<i64> {
    DEFAULT_INTERVAL_HOURS.to_vec()
}

/// Learner-facing settings the engine reacts to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Unlock the next level as soon as the current one is completed
    #[serde(default = "default_auto_unlock")]
    pub auto_unlock: bool,
    /// Review interval per mastery tier, in hours
    #[serde(default = "default_review_intervals_hours")]
    pub review_intervals_hours: Vec<i64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_unlock: default_auto_unlock(),
            review_intervals_hours: default_review_intervals_hours(),
        }
    }
}

impl Settings {
    /// Review intervals as durations. An empty table or an entry outside
    /// `1..=MAX_INTERVAL_HOURS` falls back to the default table.
    pub fn review_intervals(&self) -> Vec<Duration> {
        let valid = !self.review_intervals_hours.is_empty()
            && self
                .review_intervals_hours
                .iter()
                .all(|h| (1..=MAX_INTERVAL_HOURS).contains(h));
        if !valid {
            log::warn!(
                "Invalid review intervals {:?}, using defaults",
                self.review_intervals_hours
            );
            return DEFAULT_INTERVAL_HOURS.iter().map(|h| Duration::hours(*h)).collect();
        }
        self.review_intervals_hours
            .iter()
            .map(|h| Duration::hours(*h))
            .collect()
    }
}

/// Contents of `config.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where progress is stored (default: platform data dir)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    /// Word catalog JSON file (default: bundled sample catalog)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<PathBuf>,
    #[serde(default)]
    pub progression: Settings,
}

impl AppConfig {
    /// Get the default config file location
    pub fn default_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join("kotoba").join("config.toml"))
            .ok_or(ConfigError::ConfigDirNotFound)
    }

    /// Load a config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Configured data directory, or the platform default
    pub fn resolve_data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => dirs::data_local_dir()
                .map(|p| p.join("kotoba"))
                .ok_or(ConfigError::DataDirNotFound),
        }
    }
}
