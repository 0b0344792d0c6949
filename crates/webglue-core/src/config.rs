//! Application configuration management.
//!
//! Configuration is stored at `~/.config/webglue/config.json`. Every field
//! has a default, so a missing file means "talk to a local backend".

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::auth::{DEFAULT_BASE_URL, USERS_COLLECTION};
use crate::fragment::{FOOTER_FRAGMENT_PATH, HEADER_FRAGMENT_PATH};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "webglue";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Cookie jar file name in the cache directory
const COOKIE_FILE: &str = "cookies.json";

/// Environment variable overriding `base_url`
pub const BASE_URL_ENV: &str = "WEBGLUE_BASE_URL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub auth_collection: String,
    pub header_path: String,
    pub footer_path: String,
    pub request_timeout_secs: u64,
    pub cookie_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            auth_collection: USERS_COLLECTION.to_string(),
            header_path: HEADER_FRAGMENT_PATH.to_string(),
            footer_path: FOOTER_FRAGMENT_PATH.to_string(),
            request_timeout_secs: crate::auth::client::REQUEST_TIMEOUT_SECS,
            cookie_file: None,
        }
    }
}

impl Config {
    /// Load from the default location, then apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_env();
        Ok(config)
    }

    /// Load from `path`, falling back to defaults when it does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            if !url.trim().is_empty() {
                self.base_url = url.trim().to_string();
            }
        }
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Where the file cookie jar lives.
    pub fn cookie_path(&self) -> Result<PathBuf> {
        if let Some(ref path) = self.cookie_file {
            return Ok(path.clone());
        }
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME).join(COOKIE_FILE))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
