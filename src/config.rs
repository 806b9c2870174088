//! Application configuration
//!
//! Every field has a default, so a partial (or missing) JSON file is fine.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_POST_DELAY_MS: u64 = 2000;
pub const DEFAULT_MIME_TYPE: &str = "video/mp4";
pub const DEFAULT_CONFIRM_MESSAGE: &str = "Are you sure you want to post this video?";
pub const DEFAULT_LOCATOR_ORIGIN: &str = "localhost";
pub const DEFAULT_LOG_FILTER: &str = "open_testimonials_lib=debug";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    pub api: ApiConfig,
    pub recorder: RecorderConfig,
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            recorder: RecorderConfig::default(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApiConfig {
    pub base_url: String,
    /// None waits indefinitely
    pub request_timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: None,
        }
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RecorderConfig {
    /// Delay between confirming a post and closing the widget
    pub post_delay_ms: u64,
    pub mime_type: String,
    pub confirm_message: String,
    pub locator_origin: String,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            post_delay_ms: DEFAULT_POST_DELAY_MS,
            mime_type: DEFAULT_MIME_TYPE.to_string(),
            confirm_message: DEFAULT_CONFIRM_MESSAGE.to_string(),
            locator_origin: DEFAULT_LOCATOR_ORIGIN.to_string(),
        }
    }
}

impl RecorderConfig {
    pub fn post_delay(&self) -> Duration {
        Duration::from_millis(self.post_delay_ms)
    }
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: AppConfig = serde_json::from_str(&content)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Load configuration, falling back to defaults on any error
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Using default configuration: {:#}", e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.api.base_url, DEFAULT_API_BASE_URL);
        assert!(config.api.request_timeout().is_none());
        assert_eq!(config.recorder.post_delay(), Duration::from_secs(2));
        assert_eq!(config.recorder.mime_type, "video/mp4");
    }

    #[test]
    fn test_default_log_filter_targets_this_crate() {
        let target = module_path!().split("::").next().unwrap();
        assert_eq!(target, env!("CARGO_CRATE_NAME"));
        assert_eq!(DEFAULT_LOG_FILTER, format!("{}=debug", target));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{ "api": { "baseUrl": "https://love.example.com", "requestTimeoutSecs": 15 } }"#,
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.api.base_url, "https://love.example.com");
        assert_eq!(config.api.request_timeout(), Some(Duration::from_secs(15)));
        assert_eq!(config.recorder, RecorderConfig::default());
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn test_invalid_file_falls_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();

        assert!(AppConfig::load(&path).is_err());
        assert_eq!(AppConfig::load_or_default(Some(path.as_path())), AppConfig::default());
        assert_eq!(
            AppConfig::load_or_default(Some(dir.path().join("missing.json").as_path())),
            AppConfig::default()
        );
    }
}
