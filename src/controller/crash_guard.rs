//! Process-wide crash handling
//!
//! `CrashGuard::install` replaces the panic hook. Whatever thread panics, the hook
//! logs the panic, tries to save the settings, tries to stop the poller and then
//! exits the process. A failing save does not skip the stop, and a failing stop does
//! not skip the exit.
//!
//! A panic raised inside a panic hook aborts the process, so the save and stop steps
//! run on short-lived helper threads that the hook joins. A panic in a step unwinds
//! its helper thread, re-enters the hook (which only logs it) and shows up as a
//! failed join. Locks are only ever taken with a timeout, so a panic raised while the
//! settings lock is held cannot hang the hook.

use crate::config::{SettingsStore, SharedSettings};
use crate::error::{OverlayError, Result, StringError};
use crate::monitor::StopHandle;
use std::backtrace::Backtrace;
use std::panic::{self, PanicHookInfo};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use tracing::error;

/// Exit code after an unhandled panic
pub const CRASH_EXIT_CODE: i32 = 1;

/// Longest the hook waits for any lock
const LOCK_TIMEOUT: Duration = Duration::from_millis(250);

/// The cleanup steps run after an unhandled panic
pub trait Teardown: Send + Sync {
    /// Persist the in-memory settings
    fn save_settings(&self) -> Result<()>;

    /// Ask the background poller to stop; `false` if that could not be done
    fn stop_background(&self) -> bool;

    /// End the process
    fn terminate(&self, code: i32);
}

/// What `run_teardown` managed to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeardownReport {
    /// Settings were written
    pub saved: bool,
    /// The poller was signalled
    pub stopped: bool,
}

/// Run the crash sequence for a panic described by `report`
pub fn run_teardown(teardown: &dyn Teardown, report: &str) -> TeardownReport {
    error!("Unhandled exception!\n{report}");

    let saved = match isolated("crash-save", || teardown.save_settings()) {
        Some(Ok(())) => true,
        Some(Err(e)) => {
            error!("Failed to save settings: {e}");
            false
        }
        None => {
            error!("Failed to save settings: save panicked");
            false
        }
    };

    let stopped = isolated("crash-stop", || teardown.stop_background()).unwrap_or(false);

    teardown.terminate(CRASH_EXIT_CODE);

    TeardownReport { saved, stopped }
}

/// Run `step` on its own thread and wait for it; `None` if it panicked
fn isolated<T: Send>(name: &str, step: impl FnOnce() -> T + Send) -> Option<T> {
    thread::scope(|scope| {
        match thread::Builder::new()
            .name(name.to_string())
            .spawn_scoped(scope, step)
        {
            Ok(handle) => handle.join().ok(),
            Err(e) => {
                error!("Failed to spawn {name} thread: {e}");
                None
            }
        }
    })
}

/// Describe a panic with its location, message and a backtrace
pub fn describe_panic(info: &PanicHookInfo<'_>) -> String {
    let payload = info.payload();
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "<non-string panic payload>".to_string());

    let location = info
        .location()
        .map_or_else(|| "<unknown>".to_string(), ToString::to_string);

    let thread = std::thread::current();
    let thread_name = thread.name().unwrap_or("<unnamed>");

    format!(
        "thread '{thread_name}' panicked at {location}:\n{message}\n{}",
        Backtrace::force_capture()
    )
}

/// `Teardown` acting on the running application
pub struct ProcessTeardown {
    settings: SharedSettings,
    store: Arc<dyn SettingsStore>,
    stop: StopHandle,
    exit: Box<dyn Fn(i32) + Send + Sync>,
}

impl ProcessTeardown {
    /// Teardown that exits the process with `std::process::exit`
    pub fn new(settings: SharedSettings, store: Arc<dyn SettingsStore>, stop: StopHandle) -> Self {
        Self {
            settings,
            store,
            stop,
            exit: Box::new(|code| std::process::exit(code)),
        }
    }

    /// Replace how the process is ended
    #[must_use]
    pub fn with_exit(mut self, exit: impl Fn(i32) + Send + Sync + 'static) -> Self {
        self.exit = Box::new(exit);
        self
    }
}

impl Teardown for ProcessTeardown {
    fn save_settings(&self) -> Result<()> {
        let snapshot = self
            .settings
            .try_lock_for(LOCK_TIMEOUT)
            .ok_or_else(|| OverlayError::ConfigError(StringError::new("Settings are locked")))?
            .clone();
        self.store.save(&snapshot)
    }

    fn stop_background(&self) -> bool {
        self.stop.request_stop(LOCK_TIMEOUT)
    }

    fn terminate(&self, code: i32) {
        (self.exit)(code);
    }
}

/// Installs the crash hook
pub struct CrashGuard;

impl CrashGuard {
    /// Replace the process panic hook with the crash sequence
    ///
    /// Only the first panic runs the sequence. Later panics, including one raised by
    /// a teardown step, are logged and left to unwind their thread.
    pub fn install(teardown: Arc<dyn Teardown>) {
        let in_teardown = AtomicBool::new(false);
        panic::set_hook(Box::new(move |info| {
            let report = describe_panic(info);
            if in_teardown.swap(true, Ordering::SeqCst) {
                error!("Panic during crash teardown\n{report}");
                return;
            }
            run_teardown(teardown.as_ref(), &report);
        }));
    }
}
