use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use anyhow::{Context, Result};

use crate::core::constants::*;
use crate::SharedError;

/// Browser window and viewport size used for navigation and screenshots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

impl Default for ViewportSize {
    fn default() -> Self {
        Self {
            width: VIEWPORT_WIDTH,
            height: VIEWPORT_HEIGHT,
        }
    }
}

/// Everything the verifier needs to know about where to look and what to expect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifierConfig {
    /// Origin of the site under test, without a trailing slash
    pub base_url: String,
    pub homepage_path: String,
    pub products_path: String,
    pub expected_canonical_url: String,
    /// Value the JSON-LD `@type` field must equal
    pub target_schema_type: String,
    /// Upper bound for a navigation or a DOM query
    pub navigation_timeout_secs: u64,
    /// Directory screenshots are written into
    pub output_dir: PathBuf,
    pub homepage_screenshot: String,
    pub products_screenshot: String,
    pub headless: bool,
    /// Chrome/Chromium binary; auto-detected when unset
    pub chrome_executable: Option<PathBuf>,
    pub viewport: ViewportSize,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            homepage_path: HOMEPAGE_PATH.to_string(),
            products_path: PRODUCTS_PATH.to_string(),
            expected_canonical_url: EXPECTED_CANONICAL_URL.to_string(),
            target_schema_type: TARGET_SCHEMA_TYPE.to_string(),
            navigation_timeout_secs: NAVIGATION_TIMEOUT_SECS,
            output_dir: PathBuf::new(),
            homepage_screenshot: HOMEPAGE_SCREENSHOT.to_string(),
            products_screenshot: PRODUCTS_SCREENSHOT.to_string(),
            headless: true,
            chrome_executable: None,
            viewport: ViewportSize::default(),
        }
    }
}

impl VerifierConfig {
    /// Loads the fixed run configuration. Targets are hardcoded; there is no
    /// file or environment lookup.
    pub fn load() -> Result<Self> {
        let config = Self::default();
        config.validate().context("Default verifier configuration is invalid")?;
        Ok(config)
    }

    /// Same defaults, pointed at a different origin.
    pub fn for_base_url(base_url: &str) -> Result<Self, SharedError> {
        let config = Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SharedError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(SharedError::InvalidConfig(format!(
                "base_url must be an http(s) origin, got '{}'",
                self.base_url
            )));
        }
        for (name, path) in [("homepage_path", &self.homepage_path), ("products_path", &self.products_path)] {
            if !path.starts_with('/') {
                return Err(SharedError::InvalidConfig(format!(
                    "{} must start with '/', got '{}'",
                    name, path
                )));
            }
        }
        if self.navigation_timeout_secs == 0 {
            return Err(SharedError::InvalidConfig(
                "navigation_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Err(SharedError::InvalidConfig(format!(
                "viewport must be non-empty, got {}x{}",
                self.viewport.width, self.viewport.height
            )));
        }
        Ok(())
    }

    pub fn homepage_url(&self) -> String {
        format!("{}{}", self.base_url, self.homepage_path)
    }

    pub fn products_url(&self) -> String {
        format!("{}{}", self.base_url, self.products_path)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    pub fn homepage_screenshot_path(&self) -> PathBuf {
        self.screenshot_path(&self.homepage_screenshot)
    }

    pub fn products_screenshot_path(&self) -> PathBuf {
        self.screenshot_path(&self.products_screenshot)
    }

    fn screenshot_path(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(file_name)
    }

    /// Redirects screenshots into `dir`.
    pub fn with_output_dir(mut self, dir: &Path) -> Self {
        self.output_dir = dir.to_path_buf();
        self
    }
}
