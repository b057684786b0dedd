//! GUI module
//!
//! Provides the Slint-based main window: menu strip, match and graph tabs, and the
//! refresh loop that keeps them in sync with the content controller.

pub mod gui_controller;
pub mod view;

pub use gui_controller::GuiController;
