//! Configuration management module
//!
//! Handles loading and saving the settings record. Settings are stored in
//! %APPDATA%\AoE4_Overlay\config.json with atomic writes to prevent corruption.

pub mod manager;
pub mod models;

pub use manager::{
    CONFIG_FOLDER_NAME, ConfigManager, FileSettingsStore, SettingsStore, SharedSettings,
};
pub use models::{GRAPH_KEYS, Settings};
