//! `AoE IV: Overlay` - live match and rating statistics for Age of Empires IV
//!
//! The application polls a public stats service on a background thread and shows
//! the current match and rating graphs in a small window next to the game.
//! `ContentController` owns the poller and graph model, `MainWindowModel` owns the
//! window lifecycle, and `CrashGuard` turns any unhandled panic into an orderly
//! shutdown.

// Module declarations
pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod monitor;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_utils;

// Re-export commonly used types
pub use error::{OverlayError, Result};

/// Application version shown in the window title
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
