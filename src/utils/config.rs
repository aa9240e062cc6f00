//! Application configuration module.
//!
//! Configuration is loaded from a JSON file and cached in a process-wide
//! instance.

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::error::ConfigError;

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "config/app_config.json";

/// Global configuration instance
static CONFIG_INSTANCE: OnceCell<AppConfig> = OnceCell::new();

/// Application configuration structure.
///
/// String fields use `Box<str>` for memory efficiency since they are set
/// once and never modified.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Maximum allowed source document size in bytes
    pub max_file_size: u64,

    /// Path to the regular font face used for glyph compositing
    pub font_path: Box<str>,

    /// Path to the bold font face; falls back to the regular face when unset
    pub bold_font_path: Option<Box<str>>,

    /// Language hint handed to the text recognizer
    pub ocr_language: Box<str>,
}

impl AppConfig {
    /// Load configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from the default path.
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::from_file(DEFAULT_CONFIG_PATH)
    }

    /// Initialize the global configuration instance.
    ///
    /// This should be called once at application startup. If not called,
    /// `get()` will initialize with default values.
    pub fn init() -> Result<&'static Self, ConfigError> {
        CONFIG_INSTANCE.get_or_try_init(Self::load_default)
    }

    /// Get the global configuration instance.
    ///
    /// If the configuration hasn't been initialized, returns default values.
    #[must_use]
    pub fn get() -> &'static Self {
        CONFIG_INSTANCE.get_or_init(Self::default)
    }

    /// Create a new configuration with default values.
    #[must_use]
    pub fn default_config() -> Self {
        Self {
            max_file_size: 50 * 1024 * 1024, // 50 MB
            font_path: "fonts/NotoSansTC-Regular.otf".into(),
            bold_font_path: None,
            ocr_language: "chi_tra+eng".into(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::default_config()
    }
}
