//! `AoE IV: Overlay` - live match and rating statistics for Age of Empires IV
//!
//! Loads the settings, installs the crash handler, starts background polling and
//! runs the main window until the user closes it.

// Set Windows subsystem to hide console window
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]
#![expect(
    missing_docs,
    reason = "Slint-generated code from include_modules! lacks doc comments"
)]
#![allow(clippy::unwrap_used)] // Slint-generated code from include_modules! uses .unwrap() extensively

// GUI module is only in the binary, not the library
mod gui;

use anyhow::{Context, Result};
use aoe4_overlay::{
    api::StatsClient,
    config::{ConfigManager, FileSettingsStore, SharedSettings},
    controller::{
        ContentController, CrashGuard, MainWindowModel, ProcessTeardown, SystemNavigator,
        WindowServices,
    },
    error::{OverlayError, get_user_friendly_error},
    utils,
};
use gui::GuiController;
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

// Include Slint-generated code
slint::include_modules!();

/// Main entry point for the application
fn main() -> Result<()> {
    let config_dir = ConfigManager::get_config_dir();
    utils::init_logging(&config_dir).context("Failed to initialize logging system")?;

    info!("AoE IV: Overlay v{} starting...", aoe4_overlay::VERSION);

    let settings = ConfigManager::load().context("Failed to load settings")?;
    info!(
        "Settings loaded: {}x{}, profile {:?}",
        settings.app_width, settings.app_height, settings.profile_id
    );
    let settings: SharedSettings = Arc::new(Mutex::new(settings));

    let gui_controller = match initialize_components(&settings, &config_dir)
        .context("Failed to initialize core components")
    {
        Ok(gui_controller) => gui_controller,
        Err(e) => {
            error!("Failed to initialize components: {:#}", e);

            let error_message = if let Some(overlay_error) = e.downcast_ref::<OverlayError>() {
                get_user_friendly_error(overlay_error)
            } else {
                format!("{e:#}")
            };

            show_error_and_exit(&format!(
                "Failed to start AoE IV: Overlay:\n\n{error_message}"
            ));
            return Err(e);
        }
    };

    info!("Starting GUI event loop");
    let outcome = gui_controller
        .run()
        .context("GUI event loop terminated with error")?;

    info!("AoE IV: Overlay shutting down (poller: {:?})", outcome);

    Ok(())
}

/// Creates the stats client, content controller and main window, and installs the
/// crash handler before anything can panic on the GUI thread.
fn initialize_components(settings: &SharedSettings, config_dir: &Path) -> Result<GuiController> {
    let api_base_url = settings.lock().api_base_url.clone();
    info!("Creating stats client for {}", api_base_url);
    let client = StatsClient::new(api_base_url).context("Failed to create stats client")?;

    let content =
        ContentController::new(Arc::clone(settings), Arc::new(client)).with_update_checks(true);

    let config_path = ConfigManager::get_config_path();

    info!("Installing crash handler");
    CrashGuard::install(Arc::new(ProcessTeardown::new(
        Arc::clone(settings),
        Arc::new(FileSettingsStore::new(config_path.clone())),
        content.stop_handle(),
    )));

    info!("Creating main window");
    let services = WindowServices {
        store: Box::new(FileSettingsStore::new(config_path)),
        navigator: Box::new(SystemNavigator),
        html_dir: utils::html_dir(),
        config_dir: config_dir.to_path_buf(),
    };
    let model = MainWindowModel::new(Arc::clone(settings), services, content)
        .context("Failed to build main window")?;

    GuiController::new(model).context("Failed to create GUI controller")
}

/// Shows an error dialog and exits the application.
fn show_error_and_exit(message: &str) {
    use rfd::MessageDialog;

    MessageDialog::new()
        .set_title("AoE IV: Overlay - Error")
        .set_description(message)
        .set_buttons(rfd::MessageButtons::Ok)
        .set_level(rfd::MessageLevel::Error)
        .show();

    std::process::exit(1);
}
