//! Client settings management
//!
//! Stores non-sensitive configuration in a plain JSON file. No key material,
//! password or plaintext ever goes here.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Result, SnippetError};
use crate::view::DEFAULT_MAX_ATTEMPTS;

/// Environment variable overriding the API base URL
pub const API_URL_ENV: &str = "SECURE_SNIPPET_API_URL";

const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_APP_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_EXPIRY: &str = "15 minutes";

/// Client settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Settings file version
    pub version: u32,
    /// Snippet API base URL
    pub api_base_url: String,
    /// Origin used when building share links
    pub app_base_url: String,
    /// Expiry applied when none is given (e.g. "15 minutes", "7 days")
    pub default_expiry: String,
    /// View limit applied when none is given
    pub default_max_views: u32,
    /// Password attempts before the viewer blocks
    pub max_password_attempts: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: 1,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            app_base_url: DEFAULT_APP_BASE_URL.to_string(),
            default_expiry: DEFAULT_EXPIRY.to_string(),
            default_max_views: 1,
            max_password_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl Settings {
    /// API base URL, honouring the environment override
    pub fn effective_api_base_url(&self) -> String {
        std::env::var(API_URL_ENV)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| self.api_base_url.clone())
    }
}

/// Loads and persists [`Settings`] in the user config directory
pub struct SettingsManager {
    settings_file: PathBuf,
    settings: Settings,
}

impl SettingsManager {
    /// Create a settings manager in the platform config directory
    pub fn new() -> Result<Self> {
        Ok(Self::with_dir(&Self::get_config_dir()?))
    }

    /// Create a settings manager for a custom directory (for testing)
    pub fn with_dir(config_dir: &Path) -> Self {
        let settings_file = config_dir.join("settings.json");
        let settings = Self::load_from_file(&settings_file).unwrap_or_else(|e| {
            debug!("Unreadable settings file, using defaults: {}", e);
            Settings::default()
        });

        Self {
            settings_file,
            settings,
        }
    }

    /// Get the default config directory
    fn get_config_dir() -> Result<PathBuf> {
        ProjectDirs::from("", "", "secure-snippet")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .ok_or_else(|| {
                SnippetError::StorageError("Could not determine config directory".to_string())
            })
    }

    /// Read the settings file, treating a missing file as defaults
    fn load_from_file(path: &Path) -> Result<Settings> {
        if !path.exists() {
            debug!("No settings file found, using defaults");
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&contents)?;
        debug!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Persist settings as pretty JSON
    pub async fn save(&self) -> Result<()> {
        let contents = serde_json::to_string_pretty(&self.settings)?;

        if let Some(parent) = self.settings_file.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Atomic replace via temp file
        let temp_path = self.settings_file.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents).await?;
        tokio::fs::rename(&temp_path, &self.settings_file).await?;

        debug!("Saved settings to {:?}", self.settings_file);
        Ok(())
    }

    /// Current settings
    pub fn get(&self) -> &Settings {
        &self.settings
    }

    /// Mutable access; call [`save`](Self::save) to persist
    pub fn get_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Replace the settings and persist them
    pub async fn update(&mut self, settings: Settings) -> Result<()> {
        self.settings = settings;
        self.save().await
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.settings_file
    }

    /// Restore defaults and remove the backing file
    pub async fn reset(&mut self) -> Result<()> {
        self.settings = Settings::default();

        if self.settings_file.exists() {
            tokio::fs::remove_file(&self.settings_file)
                .await
                .map_err(|e| SnippetError::StorageError(e.to_string()))?;
        }

        Ok(())
    }
}
