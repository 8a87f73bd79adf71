//! Application configuration
//!
//! Settings come from an optional TOML file and are then overridden by
//! `WAYMARK_*` environment variables.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

use crate::error::Result;
use crate::session::DEFAULT_ZOOM_LEVEL;
use crate::storage::DEFAULT_KEY;
use crate::workout::Coordinates;

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "waymark", "waymark")
}

/// Directory holding persisted workouts when nothing else is configured
pub fn default_data_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".waymark"))
}

/// Location of `config.toml` in the platform config directory
pub fn default_config_path() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.config_dir().join("config.toml"))
        .unwrap_or_else(|| PathBuf::from(".waymark").join("config.toml"))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub storage_key: String,
    pub map_zoom_level: u8,
    /// Reported as the current position; `[lat, lng]`
    pub home_position: Option<Coordinates>,
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            storage_key: DEFAULT_KEY.to_string(),
            map_zoom_level: DEFAULT_ZOOM_LEVEL,
            home_position: None,
            log_level: None,
        }
    }
}

impl AppConfig {
    /// Load the config file at `path` (or the default location) and apply
    /// environment overrides. A missing file yields the defaults.
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(default_config_path);

        let mut config = if fs::try_exists(&path).await? {
            debug!("Loading configuration from {}", path.display());
            let content = fs::read_to_string(&path).await?;
            Self::from_toml(&content)?
        } else {
            debug!("No configuration at {}, using defaults", path.display());
            Self::default()
        };

        config.merge_env_vars();
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn merge_env_vars(&mut self) {
        self.merge_from(|name| std::env::var(name).ok());
    }

    /// Apply overrides from `lookup`. Values that don't parse are skipped.
    pub fn merge_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("WAYMARK_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }

        if let Some(key) = lookup("WAYMARK_STORAGE_KEY") {
            self.storage_key = key;
        }

        if let Some(zoom) = lookup("WAYMARK_ZOOM") {
            match zoom.parse::<u8>() {
                Ok(value) => self.map_zoom_level = value,
                Err(e) => warn!("Ignoring WAYMARK_ZOOM={:?}: {}", zoom, e),
            }
        }

        if let Some(home) = lookup("WAYMARK_HOME") {
            match home.parse::<Coordinates>() {
                Ok(position) => self.home_position = Some(position),
                Err(e) => warn!("Ignoring WAYMARK_HOME={:?}: {}", home, e),
            }
        }

        if let Some(level) = lookup("WAYMARK_LOG_LEVEL") {
            self.log_level = Some(level);
        }
    }
}
