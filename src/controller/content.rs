//! Content controller
//!
//! Backs the window's tab widget: owns the API poller, folds its events into the
//! current match, rating graphs and update notice, and exposes the start/stop entry
//! points the main window drives.

use crate::api::{PlayerMatch, StatsSource};
use crate::config::SharedSettings;
use crate::controller::graph::{GraphState, GraphTab};
use crate::error::Result;
use crate::monitor::{ApiPoller, PollEvent, PollerConfig, StopHandle, StopOutcome};
use crate::utils::{AvailableUpdate, UpdateChecker};
use std::sync::{Arc, mpsc};
use std::time::Duration;
use tracing::{debug, info, warn};

/// How long shutdown waits for the poller thread
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

/// Capacity of the poller event queue
const EVENT_QUEUE_CAPACITY: usize = 32;

/// Operations the main window needs from its content widget
pub trait Content {
    /// Begin background polling; calling it while polling is a no-op
    fn start(&mut self) -> Result<()>;

    /// Halt background polling, waiting a bounded time; calling it while stopped is a no-op
    fn stop_checking_api(&mut self) -> StopOutcome;

    /// Graph sub-component
    fn graph_tab(&mut self) -> &mut dyn GraphTab;
}

/// Content widget state
pub struct ContentController {
    settings: SharedSettings,
    poller: ApiPoller,
    events: mpsc::Receiver<PollEvent>,
    graph: GraphState,
    current_match: Option<PlayerMatch>,
    last_error: Option<String>,
    update: Option<AvailableUpdate>,
    check_updates: bool,
}

impl ContentController {
    /// Create a stopped controller reading its poll parameters from `settings`
    pub fn new(settings: SharedSettings, source: Arc<dyn StatsSource + Sync>) -> Self {
        let (tx, rx) = mpsc::sync_channel(EVENT_QUEUE_CAPACITY);
        Self {
            settings,
            poller: ApiPoller::new(source, tx),
            events: rx,
            graph: GraphState::default(),
            current_match: None,
            last_error: None,
            update: None,
            check_updates: false,
        }
    }

    /// Also check GitHub for a newer release when polling starts
    #[must_use]
    pub fn with_update_checks(mut self, enabled: bool) -> Self {
        self.check_updates = enabled;
        self
    }

    /// Handle the crash hook uses to stop polling
    pub fn stop_handle(&self) -> StopHandle {
        self.poller.stop_handle()
    }

    /// Whether the poller thread is alive
    pub fn is_polling(&self) -> bool {
        self.poller.is_running()
    }

    /// Profile currently tracked
    pub fn profile_id(&self) -> Option<u64> {
        self.settings.lock().profile_id
    }

    /// Track another player, restarting the poller if it was running
    pub fn set_profile_id(&mut self, profile_id: Option<u64>) -> Result<()> {
        {
            let mut settings = self.settings.lock();
            if settings.profile_id == profile_id {
                return Ok(());
            }
            settings.profile_id = profile_id;
        }
        info!("Tracked profile changed to {:?}", profile_id);

        self.current_match = None;
        self.last_error = None;
        self.graph.clear_series();

        if self.poller.is_running() {
            self.poller.stop(SHUTDOWN_GRACE);
            // Events still queued belong to the previous profile
            while self.events.try_recv().is_ok() {}
            self.start()?;
        }
        Ok(())
    }

    /// Apply all pending poller events; returns how many were applied
    pub fn process_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events.try_recv() {
            self.apply(event);
            applied += 1;
        }
        applied
    }

    fn apply(&mut self, event: PollEvent) {
        match event {
            PollEvent::NewMatch(player_match) => {
                debug!("Showing match {}", player_match.last_match.match_id);
                self.last_error = None;
                self.current_match = Some(player_match);
            }
            PollEvent::Ratings(series) => {
                for (team_size, points) in series {
                    self.graph.set_series(team_size, points);
                }
            }
            PollEvent::Error(message) => {
                self.last_error = Some(message);
            }
            PollEvent::UpdateChecked { at, update } => {
                self.settings.lock().last_update_check = at;
                if let Some(update) = &update {
                    info!("New version {} available", update.version);
                }
                self.update = update;
            }
        }
    }

    /// Most recent match of the tracked player
    pub fn current_match(&self) -> Option<&PlayerMatch> {
        self.current_match.as_ref()
    }

    /// Name of the tracked player, once known
    pub fn player_name(&self) -> Option<&str> {
        self.current_match.as_ref().and_then(|m| m.name.as_deref())
    }

    /// Message of the last failed poll, cleared by the next successful one
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Newer release, if the update check found one
    pub fn available_update(&self) -> Option<&AvailableUpdate> {
        self.update.as_ref()
    }

    /// Rating graphs
    pub fn graph(&self) -> &GraphState {
        &self.graph
    }
}

impl Content for ContentController {
    fn start(&mut self) -> Result<()> {
        let (profile_id, interval, last_update_check) = {
            let settings = self.settings.lock();
            (
                settings.profile_id,
                Duration::from_secs(settings.poll_interval_secs),
                settings.last_update_check,
            )
        };

        let update_checker = if self.check_updates {
            match UpdateChecker::for_this_build() {
                Ok(checker) => Some(checker),
                Err(e) => {
                    warn!("Update checks disabled: {}", e);
                    None
                }
            }
        } else {
            None
        };

        self.poller.start(PollerConfig {
            profile_id,
            interval,
            update_checker,
            last_update_check,
        })
    }

    fn stop_checking_api(&mut self) -> StopOutcome {
        self.poller.stop(SHUTDOWN_GRACE)
    }

    fn graph_tab(&mut self) -> &mut dyn GraphTab {
        &mut self.graph
    }
}
