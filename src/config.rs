use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::media::DEFAULT_MAX_IMAGE_BYTES;

pub const DEFAULT_CONFIG_PATH: &str = "config/medibot.json";
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub max_image_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }
}

impl AppConfig {
    /// Layer CLI/environment values over the file-backed config.
    pub fn with_overrides(mut self, api_base_url: Option<String>, timeout_secs: Option<u64>) -> Self {
        if let Some(url) = api_base_url.filter(|url| !url.trim().is_empty()) {
            self.api_base_url = url;
        }
        if let Some(secs) = timeout_secs {
            self.request_timeout_secs = secs;
        }
        self
    }

    pub fn request_timeout(&self) -> Duration {
        // A zero timeout would fail every request immediately.
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

pub fn load_config(path: &str) -> AppConfig {
    let path = Path::new(path);
    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Failed to parse config file {}: {err}", path.display());
                AppConfig::default()
            }
        },
        Err(err) => {
            log::info!(
                "Config file {} not found ({err}); using defaults",
                path.display()
            );
            AppConfig::default()
        }
    }
}
