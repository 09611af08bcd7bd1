//! Application configuration management.
//!
//! Configuration is stored at `~/.config/userlist/config.json`. Every field
//! has a default, so a partial or missing file is fine. `USERLIST_API_URL`
//! and `USERLIST_RENDER_STRATEGY` override the file.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::api::DEFAULT_API_URL;
use crate::controller::{ControllerOptions, DEFAULT_TITLE};
use crate::render::RenderStrategy;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "userlist";

/// Config file name
const CONFIG_FILE: &str = "config.json";

pub const ENV_API_URL: &str = "USERLIST_API_URL";
pub const ENV_RENDER_STRATEGY: &str = "USERLIST_RENDER_STRATEGY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    pub cache_ttl_secs: u64,
    /// Whole-request timeout for the users fetch.
    pub request_timeout_secs: u64,
    pub watchdog_settle_ms: u64,
    pub retry_delay_ms: u64,
    pub render_strategy: RenderStrategy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            cache_ttl_secs: 24 * 60 * 60,
            request_timeout_secs: 30,
            watchdog_settle_ms: 100,
            retry_delay_ms: 2000,
            render_strategy: RenderStrategy::FullReplace,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            Self::from_json(&contents)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        serde_json::from_str(contents).context("Failed to parse config")
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Apply environment overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_API_URL).filter(|u| !u.trim().is_empty()) {
            self.api_url = url;
        }

        if let Some(value) = lookup(ENV_RENDER_STRATEGY) {
            match value.parse() {
                Ok(strategy) => self.render_strategy = strategy,
                Err(e) => warn!(error = %e, "Ignoring {}", ENV_RENDER_STRATEGY),
            }
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn controller_options(&self) -> ControllerOptions {
        ControllerOptions {
            title: DEFAULT_TITLE.to_string(),
            render_strategy: self.render_strategy,
            watchdog_settle: Duration::from_millis(self.watchdog_settle_ms),
            retry_delay: Duration::from_millis(self.retry_delay_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api_url, "https://jsonplaceholder.typicode.com/users");
        assert_eq!(config.cache_ttl(), Duration::from_millis(86_400_000));
        assert_eq!(config.render_strategy, RenderStrategy::FullReplace);

        let options = config.controller_options();
        assert_eq!(options.watchdog_settle, Duration::from_millis(100));
        assert_eq!(options.retry_delay, Duration::from_secs(2));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config = Config::from_json(r#"{"render_strategy": "in_place", "cache_ttl_secs": 60}"#)
            .expect("Failed to parse config test JSON");
        assert_eq!(config.render_strategy, RenderStrategy::InPlace);
        assert_eq!(config.cache_ttl(), Duration::from_secs(60));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_broken_file_is_error() {
        assert!(Config::from_json("{oops").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_env_with(|key| match key {
            ENV_API_URL => Some("http://localhost:8080/users".to_string()),
            ENV_RENDER_STRATEGY => Some("in_place".to_string()),
            _ => None,
        });
        assert_eq!(config.api_url, "http://localhost:8080/users");
        assert_eq!(config.render_strategy, RenderStrategy::InPlace);
    }

    #[test]
    fn test_bad_env_values_are_ignored() {
        let mut config = Config::default();
        config.apply_env_with(|key| match key {
            ENV_API_URL => Some("  ".to_string()),
            ENV_RENDER_STRATEGY => Some("sideways".to_string()),
            _ => None,
        });
        assert_eq!(config, Config::default());
    }
}
