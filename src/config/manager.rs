//! Configuration manager for loading and saving settings
//!
//! Settings live in %APPDATA%\AoE4_Overlay\config.json. Writes go through a
//! temporary file in the same directory that is renamed over the target, so a crash
//! mid-save never leaves a truncated file behind.

use crate::config::models::Settings;
use crate::error::{OverlayError, Result, StringError};
use parking_lot::Mutex;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Settings shared between the window, the content controller and the crash hook
pub type SharedSettings = Arc<Mutex<Settings>>;

/// Name of the folder holding settings and logs
pub const CONFIG_FOLDER_NAME: &str = "AoE4_Overlay";

/// Destination settings are persisted to
pub trait SettingsStore: Send + Sync {
    /// Persist `settings`
    fn save(&self, settings: &Settings) -> Result<()>;
}

/// `SettingsStore` writing JSON to a file through `ConfigManager`
#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    /// Store writing to `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Target file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for FileSettingsStore {
    fn save(&self, settings: &Settings) -> Result<()> {
        ConfigManager::save_to(&self.path, settings)
    }
}

/// Configuration manager
pub struct ConfigManager;

impl ConfigManager {
    /// Folder holding `config.json` and the log files
    ///
    /// Returns: %APPDATA%\AoE4_Overlay
    pub fn get_config_dir() -> PathBuf {
        let appdata = std::env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(appdata).join(CONFIG_FOLDER_NAME)
    }

    /// Get the path to the configuration file
    pub fn get_config_path() -> PathBuf {
        Self::get_config_dir().join("config.json")
    }

    /// Load settings from the default location
    pub fn load() -> Result<Settings> {
        Self::load_from(&Self::get_config_path())
    }

    /// Load settings from `path`
    ///
    /// A missing or corrupt file yields default settings. The result is always normalized.
    pub fn load_from(path: &Path) -> Result<Settings> {
        if !path.exists() {
            info!("Configuration file not found, using defaults");
            return Ok(Settings::default());
        }

        let json = std::fs::read_to_string(path)?;

        let mut settings = match serde_json::from_str::<Settings>(&json) {
            Ok(settings) => {
                info!("Configuration loaded from {}", path.display());
                settings
            }
            Err(e) => {
                warn!("Failed to parse configuration, using defaults: {}", e);
                Settings::default()
            }
        };
        settings.normalize();
        Ok(settings)
    }

    /// Save settings to the default location
    pub fn save(settings: &Settings) -> Result<()> {
        Self::save_to(&Self::get_config_path(), settings)
    }

    /// Save settings to `path` with an atomic write
    pub fn save_to(path: &Path, settings: &Settings) -> Result<()> {
        let config_dir = path.parent().ok_or_else(|| {
            OverlayError::ConfigError(StringError::new(format!(
                "Invalid config path: {}",
                path.display()
            )))
        })?;
        std::fs::create_dir_all(config_dir)?;

        let mut normalized = settings.clone();
        normalized.normalize();
        let json = serde_json::to_string_pretty(&normalized)?;

        let mut temp = tempfile::NamedTempFile::new_in(config_dir)?;
        temp.write_all(json.as_bytes())?;
        temp.as_file().sync_all()?;
        temp.persist(path)
            .map_err(|e| OverlayError::ConfigError(Box::new(e.error)))?;

        debug!("Configuration written to {}", path.display());
        info!("Configuration saved successfully");
        Ok(())
    }
}
