//! Utility modules
//!
//! Provides logging setup, system navigation helpers and the update checker.

pub mod logging;
pub mod navigation;
pub mod update_checker;

pub use logging::init_logging;
pub use navigation::{html_dir, open_folder, open_url};
pub use update_checker::{AvailableUpdate, UpdateChecker};
