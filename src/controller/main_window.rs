//! Main window lifecycle
//!
//! `MainWindowModel` is everything the main window does apart from drawing: it
//! builds its initial state from the settings, starts the content, executes menu
//! commands and performs the shutdown sequence in `finish`.
//!
//! Lifecycle: `Constructing -> Running -> Finishing -> Terminated`.

use crate::config::{SettingsStore, SharedSettings};
use crate::controller::commands::{CommandTable, FolderTarget, MenuAction, Navigator};
use crate::controller::content::Content;
use crate::error::{OverlayError, Result};
use crate::monitor::StopOutcome;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Phase of the main window lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowPhase {
    /// Building geometry, menus and content
    Constructing,
    /// Event loop owns control
    Running,
    /// Persisting settings and stopping the poller
    Finishing,
    /// Shutdown sequence done, process may exit
    Terminated,
}

impl WindowPhase {
    fn name(self) -> &'static str {
        match self {
            Self::Constructing => "Constructing",
            Self::Running => "Running",
            Self::Finishing => "Finishing",
            Self::Terminated => "Terminated",
        }
    }
}

/// What the GUI should do after a command ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Nothing further
    Handled,
    /// Quit the event loop
    Quit,
}

/// Collaborators of the main window that talk to the outside world
pub struct WindowServices {
    /// Where settings are persisted
    pub store: Box<dyn SettingsStore>,
    /// Opens folders and links
    pub navigator: Box<dyn Navigator>,
    /// Folder opened by "Html files"
    pub html_dir: PathBuf,
    /// Folder opened by "Config/logs"
    pub config_dir: PathBuf,
}

/// Main window state
pub struct MainWindowModel<C: Content> {
    settings: SharedSettings,
    services: WindowServices,
    commands: CommandTable,
    content: C,
    phase: WindowPhase,
    width: u32,
    height: u32,
    graph_actions: [bool; 4],
    last_day: bool,
    title: String,
}

impl<C: Content> MainWindowModel<C> {
    /// Build the window from `settings` and start the content's polling
    pub fn new(settings: SharedSettings, services: WindowServices, mut content: C) -> Result<Self> {
        let (width, height, graph_actions) = {
            let settings = settings.lock();
            let mut actions = [true; 4];
            for (index, checked) in actions.iter_mut().enumerate() {
                *checked = settings.graph_visible(index);
            }
            (settings.app_width, settings.app_height, actions)
        };

        for (index, checked) in graph_actions.iter().enumerate() {
            content.graph_tab().change_plot_visibility(index, *checked)?;
        }

        let mut window = Self {
            settings,
            services,
            commands: CommandTable::default(),
            content,
            phase: WindowPhase::Constructing,
            width,
            height,
            graph_actions,
            last_day: false,
            title: base_title(),
        };

        window.content.start()?;
        window.transition(WindowPhase::Constructing, WindowPhase::Running)?;
        info!("Main window ready ({}x{})", width, height);
        Ok(window)
    }

    fn transition(&mut self, from: WindowPhase, to: WindowPhase) -> Result<()> {
        if self.phase != from {
            return Err(OverlayError::InvalidTransition {
                from: self.phase.name(),
                to: to.name(),
            });
        }
        debug!("Window phase {} -> {}", from.name(), to.name());
        self.phase = to;
        Ok(())
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> WindowPhase {
        self.phase
    }

    /// Window size as (width, height)
    pub fn geometry(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Record a new window size
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// Checked state of the four "Show NvN" actions
    pub fn graph_actions(&self) -> [bool; 4] {
        self.graph_actions
    }

    /// Checked state of "Last 24h"
    pub fn last_day(&self) -> bool {
        self.last_day
    }

    /// Window title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Append the tracked player's name to the title
    pub fn update_title(&mut self, name: &str) {
        self.title = format!("{} – {name}", base_title());
    }

    /// Content widget
    pub fn content(&self) -> &C {
        &self.content
    }

    /// Content widget, mutably
    pub fn content_mut(&mut self) -> &mut C {
        &mut self.content
    }

    /// Execute the menu command `id`; `checked` is the new state of checkable entries
    pub fn trigger(&mut self, id: &str, checked: bool) -> Result<CommandOutcome> {
        let action = self
            .commands
            .lookup(id)
            .ok_or_else(|| OverlayError::UnknownCommand(id.to_string()))?;
        debug!("Menu command {} ({:?})", id, action);

        match action {
            MenuAction::OpenFolder(FolderTarget::Html) => {
                self.services.navigator.open_folder(&self.services.html_dir);
            }
            MenuAction::OpenFolder(FolderTarget::Config) => {
                self.services.navigator.open_folder(&self.services.config_dir);
            }
            MenuAction::OpenUrl(url) => self.services.navigator.open_url(url),
            MenuAction::Exit => return Ok(CommandOutcome::Quit),
            MenuAction::ShowGraph(index) => self.set_graph_action(index, checked)?,
            MenuAction::LastDay => {
                self.last_day = checked;
                self.content.graph_tab().limit_to_day(checked);
            }
        }
        Ok(CommandOutcome::Handled)
    }

    fn set_graph_action(&mut self, index: usize, checked: bool) -> Result<()> {
        let slot = self
            .graph_actions
            .get_mut(index)
            .ok_or(OverlayError::GraphIndexOutOfRange(index))?;
        *slot = checked;
        self.content.graph_tab().change_plot_visibility(index, checked)?;
        self.settings.lock().set_graph_visible(index, checked);
        Ok(())
    }

    /// Shutdown sequence: capture window state, persist settings, stop the poller
    ///
    /// Settings are saved before the stop signal. A failed save still stops the poller
    /// and is then returned to the caller.
    pub fn finish(&mut self) -> Result<StopOutcome> {
        self.transition(WindowPhase::Running, WindowPhase::Finishing)?;

        let snapshot = {
            let mut settings = self.settings.lock();
            settings.app_width = self.width;
            settings.app_height = self.height;
            for (index, checked) in self.graph_actions.iter().enumerate() {
                settings.set_graph_visible(index, *checked);
            }
            settings.clone()
        };

        let saved = self.services.store.save(&snapshot);
        if let Err(e) = &saved {
            warn!("Failed to save settings on shutdown: {}", e);
        }

        let outcome = self.content.stop_checking_api();
        info!("Background polling stopped: {:?}", outcome);

        self.transition(WindowPhase::Finishing, WindowPhase::Terminated)?;
        saved.map(|()| outcome)
    }
}

fn base_title() -> String {
    format!("AoE IV: Overlay ({})", crate::VERSION)
}
