//! Runtime configuration.
//!
//! Defaults cover everything except the API base URL, which differs per
//! deployment and is read from `GALLERY_API_BASE_URL`.

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use crate::utils::{GalleryError, GalleryResult};

pub const ENV_API_BASE_URL: &str = "GALLERY_API_BASE_URL";
pub const ENV_PAGE_SIZE: &str = "GALLERY_PAGE_SIZE";
pub const ENV_REQUEST_TIMEOUT_MS: &str = "GALLERY_REQUEST_TIMEOUT_MS";
pub const ENV_MAX_UPLOAD_BYTES: &str = "GALLERY_MAX_UPLOAD_BYTES";
pub const ENV_PRELOAD_AHEAD: &str = "GALLERY_PRELOAD_AHEAD";
pub const ENV_PRELOAD_BEHIND: &str = "GALLERY_PRELOAD_BEHIND";
pub const ENV_PRELOAD_MAX_BYTES: &str = "GALLERY_PRELOAD_MAX_BYTES";
pub const ENV_SEARCH_DEBOUNCE_MS: &str = "GALLERY_SEARCH_DEBOUNCE_MS";

/// Preload window around the focused image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreloadConfig {
    pub ahead: usize,
    pub behind: usize,
    /// Byte budget of the preload cache; least recently used images go first
    pub max_bytes: usize,
}

impl Default for PreloadConfig {
    fn default() -> Self {
        Self {
            ahead: 3,
            behind: 2,
            max_bytes: 64 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GalleryConfig {
    /// Base URL of the image API, without trailing slash
    pub api_base_url: String,
    /// Number of records requested per list call
    pub page_size: usize,
    /// Per-request timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Largest payload accepted for upload
    pub max_upload_bytes: u64,
    pub preload: PreloadConfig,
    pub search_debounce_ms: u64,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            api_base_url: String::new(),
            page_size: 100,
            request_timeout_ms: 30_000,
            max_upload_bytes: 10 * 1024 * 1024,
            preload: PreloadConfig::default(),
            search_debounce_ms: 300,
        }
    }
}

impl GalleryConfig {
    /// Defaults overlaid with whatever `GALLERY_*` variables are set.
    pub fn from_env() -> Self {
        Self::default().with_env()
    }

    /// Parses a JSON config document, e.g. one shipped with the host build.
    pub fn from_json(json: &str) -> GalleryResult<Self> {
        let mut config: Self = serde_json::from_str(json)
            .map_err(|e| GalleryError::config(format!("invalid config: {}", e)))?;
        config.api_base_url = normalize_base_url(&config.api_base_url);
        Ok(config)
    }

    /// Overlays environment variables on top of `self`.
    pub fn with_env(mut self) -> Self {
        if let Ok(url) = env::var(ENV_API_BASE_URL) {
            self.api_base_url = normalize_base_url(&url);
        }
        self.page_size = env_usize(ENV_PAGE_SIZE, self.page_size);
        self.request_timeout_ms = env_u64(ENV_REQUEST_TIMEOUT_MS, self.request_timeout_ms);
        self.max_upload_bytes = env_u64(ENV_MAX_UPLOAD_BYTES, self.max_upload_bytes);
        self.preload.ahead = env_usize(ENV_PRELOAD_AHEAD, self.preload.ahead);
        self.preload.behind = env_usize(ENV_PRELOAD_BEHIND, self.preload.behind);
        self.preload.max_bytes = env_usize(ENV_PRELOAD_MAX_BYTES, self.preload.max_bytes);
        self.search_debounce_ms = env_u64(ENV_SEARCH_DEBOUNCE_MS, self.search_debounce_ms);
        self
    }

    pub fn with_api_base_url(mut self, url: &str) -> Self {
        self.api_base_url = normalize_base_url(url);
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    /// Checks the settings the HTTP client depends on.
    pub fn validate(&self) -> GalleryResult<()> {
        if self.api_base_url.is_empty() {
            return Err(GalleryError::config(format!("{} is not set", ENV_API_BASE_URL)));
        }
        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://")) {
            return Err(GalleryError::config(format!(
                "API base URL must start with http:// or https://: {}",
                self.api_base_url
            )));
        }
        if self.page_size == 0 {
            return Err(GalleryError::config("page size cannot be 0"));
        }
        Ok(())
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(default)
}
