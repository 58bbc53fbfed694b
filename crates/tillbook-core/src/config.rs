//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which controls where local data is kept and how long backend requests
//! may take. Endpoint and staff name are not configuration; they live in
//! the local store.
//!
//! Configuration is stored at `~/.config/tillbook/config.json`.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::client::REQUEST_TIMEOUT_SECS;

/// Application name used for config/data directory paths
const APP_NAME: &str = "tillbook";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "TILLBOOK_DATA_DIR";

/// Environment variable overriding the backend endpoint for one run
pub const ENDPOINT_ENV: &str = "TILLBOOK_ENDPOINT";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub data_dir: Option<PathBuf>,
    pub request_timeout_secs: Option<u64>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Where the local store lives: `$TILLBOOK_DATA_DIR`, then the
    /// configured directory, then the platform data directory.
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
            return Ok(PathBuf::from(dir));
        }
        if let Some(ref dir) = self.data_dir {
            return Ok(dir.clone());
        }
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    pub fn store_dir(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join("store"))
    }

    pub fn log_dir(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join("logs"))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(REQUEST_TIMEOUT_SECS))
    }

    /// One-shot endpoint override from the environment, if set.
    pub fn endpoint_override() -> Option<String> {
        std::env::var(ENDPOINT_ENV).ok().filter(|v| !v.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.request_timeout(), Duration::from_secs(REQUEST_TIMEOUT_SECS));
    }

    #[test]
    fn test_parse_partial_config() {
        let config: Config =
            serde_json::from_str(r#"{"request_timeout_secs": 10}"#).expect("config should parse");
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn test_configured_data_dir_derives_subdirs() {
        let config = Config {
            data_dir: Some(PathBuf::from("/srv/till")),
            request_timeout_secs: None,
        };
        // The env override takes precedence when set in the test environment.
        if std::env::var_os(DATA_DIR_ENV).is_none() {
            assert_eq!(config.store_dir().expect("store dir"), PathBuf::from("/srv/till/store"));
            assert_eq!(config.log_dir().expect("log dir"), PathBuf::from("/srv/till/logs"));
        }
    }
}
