//! TOML configuration for the trainlog client.
//!
//! The file lives at `<config_dir>/trainlog/config.toml`. A missing file is
//! not an error: every key has a default, and a few keys can be overridden
//! from the environment.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::TrainlogError;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000/api";
pub const DEFAULT_SESSIONS_ROUTE: &str = "/session/training";

pub const ENV_API_URL: &str = "TRAINLOG_API_URL";
pub const ENV_USER_ID: &str = "TRAINLOG_USER_ID";
pub const ENV_TOKEN: &str = "TRAINLOG_TOKEN";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    /// Identifier of the signed-in user; sessions owned by anyone else are refused.
    pub user_id: Option<i64>,
    pub log_filter: String,
    /// Page size sent with the catalog request. The server treats 0 as "all entries".
    pub catalog_page_size: u32,
    pub sessions_route: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: 30,
            user_id: None,
            log_filter: "info".to_string(),
            catalog_page_size: 0,
            sessions_route: DEFAULT_SESSIONS_ROUTE.to_string(),
        }
    }
}

impl Config {
    /// Default location of the config file, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("trainlog").join("config.toml"))
    }

    /// Load the config from `path`, falling back to defaults when the file is absent.
    pub fn load(path: &Path) -> Result<Self, TrainlogError> {
        if !path.exists() {
            debug!("No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| TrainlogError::Config(format!("Failed to read {:?}: {}", path, e)))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| TrainlogError::Config(format!("Invalid config {:?}: {}", path, e)))?;

        info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Write the config to `path`, creating the parent directory if needed.
    pub fn save(&self, path: &Path) -> Result<(), TrainlogError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                TrainlogError::Config(format!("Failed to create config dir: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| TrainlogError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)
            .map_err(|e| TrainlogError::Config(format!("Failed to write {:?}: {}", path, e)))?;

        info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Apply `TRAINLOG_API_URL` and `TRAINLOG_USER_ID` overrides.
    pub fn with_env_overrides(self) -> Result<Self, TrainlogError> {
        self.with_overrides(
            std::env::var(ENV_API_URL).ok(),
            std::env::var(ENV_USER_ID).ok(),
        )
    }

    fn with_overrides(
        mut self,
        api_url: Option<String>,
        user_id: Option<String>,
    ) -> Result<Self, TrainlogError> {
        if let Some(url) = api_url.filter(|s| !s.trim().is_empty()) {
            self.api_base_url = url.trim().to_string();
        }
        if let Some(raw) = user_id.filter(|s| !s.trim().is_empty()) {
            let id = raw.trim().parse::<i64>().map_err(|_| {
                TrainlogError::Config(format!("{} must be an integer, got '{}'", ENV_USER_ID, raw))
            })?;
            self.user_id = Some(id);
        }
        Ok(self)
    }
}
