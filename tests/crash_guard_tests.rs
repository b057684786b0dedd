//! Crash handler tests
//!
//! Live in their own test binary because they replace the process-wide panic hook.
//! `HOOK_LOCK` keeps them from installing hooks concurrently, and the exit function
//! is swapped for a recorder so the test process survives.

use aoe4_overlay::{
    api::{PlayerMatch, RatingPoint, StatsSource, TeamSize},
    config::{ConfigManager, FileSettingsStore, Settings, SharedSettings},
    controller::{CRASH_EXIT_CODE, CrashGuard, ProcessTeardown, Teardown},
    error::Result,
    monitor::{ApiPoller, PollerConfig},
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, mpsc};
use std::time::Duration;

/// Serializes tests that install a panic hook
static HOOK_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

struct PanickingSource;

impl StatsSource for PanickingSource {
    fn fetch_last_match(&self, _profile_id: u64) -> Result<PlayerMatch> {
        panic!("malformed response");
    }

    fn fetch_rating_history(&self, _profile_id: u64, _team_size: TeamSize) -> Result<Vec<RatingPoint>> {
        Ok(Vec::new())
    }
}

/// A panic on the poller thread saves the latest settings and exits with a failure code
#[test]
fn test_panic_on_poller_thread_runs_teardown() {
    let _lock = HOOK_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.json");

    let mut initial = Settings {
        app_width: 1280,
        app_height: 720,
        ..Settings::default()
    };
    initial.set_graph_visible(2, false);
    let settings: SharedSettings = Arc::new(Mutex::new(initial));

    let (event_tx, _event_rx) = mpsc::sync_channel(8);
    let mut poller = ApiPoller::new(Arc::new(PanickingSource), event_tx);

    let (exit_tx, exit_rx) = mpsc::channel();
    let exit_tx = Mutex::new(exit_tx);
    let teardown = ProcessTeardown::new(
        Arc::clone(&settings),
        Arc::new(FileSettingsStore::new(config_path.clone())),
        poller.stop_handle(),
    )
    .with_exit(move |code| {
        let _ = exit_tx.lock().send(code);
    });
    CrashGuard::install(Arc::new(teardown));

    poller
        .start(PollerConfig {
            profile_id: Some(1),
            interval: Duration::from_secs(60),
            update_checker: None,
            last_update_check: 0,
        })
        .unwrap();

    let code = exit_rx.recv_timeout(Duration::from_secs(5)).unwrap();
    let _ = std::panic::take_hook();

    assert_ne!(code, 0);
    assert_eq!(code, CRASH_EXIT_CODE);

    let saved = ConfigManager::load_from(&config_path).unwrap();
    assert_eq!((saved.app_width, saved.app_height), (1280, 720));
    assert!(!saved.graph_visible(2));
    assert!(saved.graph_visible(0));

    poller.stop(Duration::from_secs(1));
    assert!(!poller.is_running());
}

/// Save step that panics, recording the steps that still ran
struct ExplodingSave {
    stopped: AtomicBool,
    exit: Mutex<mpsc::Sender<i32>>,
}

impl Teardown for ExplodingSave {
    fn save_settings(&self) -> Result<()> {
        panic!("disk on fire");
    }

    fn stop_background(&self) -> bool {
        self.stopped.store(true, Ordering::SeqCst);
        true
    }

    fn terminate(&self, code: i32) {
        let _ = self.exit.lock().send(code);
    }
}

fn crash() {
    panic!("unexpected state");
}

/// Inside the installed hook a panicking save neither aborts the process nor skips
/// the stop and exit steps
#[test]
fn test_panicking_save_inside_hook_still_stops_and_exits() {
    let _lock = HOOK_LOCK.lock().unwrap_or_else(PoisonError::into_inner);

    let (exit_tx, exit_rx) = mpsc::channel();
    let teardown = Arc::new(ExplodingSave {
        stopped: AtomicBool::new(false),
        exit: Mutex::new(exit_tx),
    });
    CrashGuard::install(teardown.clone());

    let crashed = std::thread::spawn(crash).join();
    let _ = std::panic::take_hook();

    assert!(crashed.is_err());
    assert!(teardown.stopped.load(Ordering::SeqCst));
    assert_eq!(
        exit_rx.recv_timeout(Duration::from_secs(5)).unwrap(),
        CRASH_EXIT_CODE
    );
}
