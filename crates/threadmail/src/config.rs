//! Runtime settings for mirror runs
//!
//! Loaded from (in order of priority):
//! 1. Runtime environment variables
//! 2. JSON file (~/.config/post2mail/settings.json)
//! 3. Built-in defaults

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::record::DEFAULT_RECIPIENT;
use crate::source::HnClient;

/// Application directory under the platform config dir
const APP_DIR: &str = "post2mail";

/// Settings filename in the post2mail config directory
const SETTINGS_FILE: &str = "settings.json";

const ENV_API_URL: &str = "POST2MAIL_API_URL";
const ENV_RECIPIENT: &str = "POST2MAIL_RECIPIENT";

/// Settings for fetching and writing a thread
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Base URL of the Hacker News API
    pub api_base_url: String,
    /// Value of the To header of every record
    pub recipient: String,
    /// Per-request HTTP timeout
    pub timeout: Duration,
}

/// On-disk settings file; every field is optional
#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    api_base_url: Option<String>,
    recipient: Option<String>,
    timeout_secs: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: HnClient::BASE_URL.to_string(),
            recipient: DEFAULT_RECIPIENT.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl Settings {
    /// Load settings from the default file (if present), then apply
    /// environment overrides
    pub fn load() -> Result<Self> {
        let settings = match Self::default_settings_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        Ok(settings.with_env())
    }

    /// Load settings from a specific JSON file, without env overrides
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
        Self::from_json(&json)
            .with_context(|| format!("Invalid settings file: {}", path.display()))
    }

    /// Parse settings from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let file: SettingsFile =
            serde_json::from_str(json).context("Failed to parse settings JSON")?;
        Ok(Self::from_settings_file(file))
    }

    fn from_settings_file(file: SettingsFile) -> Self {
        let defaults = Self::default();
        Self {
            api_base_url: file.api_base_url.unwrap_or(defaults.api_base_url),
            recipient: file.recipient.unwrap_or(defaults.recipient),
            timeout: file
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        }
    }

    fn with_env(mut self) -> Self {
        if let Ok(url) = std::env::var(ENV_API_URL)
            && !url.is_empty()
        {
            self.api_base_url = url;
        }
        if let Ok(recipient) = std::env::var(ENV_RECIPIENT)
            && !recipient.is_empty()
        {
            self.recipient = recipient;
        }
        self
    }

    /// Get the default settings file path (~/.config/post2mail/settings.json)
    pub fn default_settings_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(SETTINGS_FILE))
    }

    /// Build the API client these settings describe
    pub fn client(&self) -> HnClient {
        HnClient::new(&self.api_base_url, self.timeout)
    }
}
