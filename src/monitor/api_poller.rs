//! Background polling of the stats service
//!
//! One thread per run. The thread waits on a `CancelToken` between polls, so a stop
//! request wakes it immediately instead of after the next interval. Stopping joins
//! the thread with a deadline; a thread stuck in a request past the deadline is
//! detached and reported.

use crate::api::{PlayerMatch, RatingPoint, StatsSource, TeamSize};
use crate::error::{OverlayError, Result};
use crate::utils::update_checker::{self, AvailableUpdate, UpdateChecker};
use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, TrySendError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Events published by the poller thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollEvent {
    /// The tracked player has a match that was not seen before
    NewMatch(PlayerMatch),
    /// Fresh rating histories, one entry per queue that answered
    Ratings(Vec<(TeamSize, Vec<RatingPoint>)>),
    /// A poll failed; polling continues
    Error(String),
    /// The update check ran at unix time `at`
    UpdateChecked {
        /// Unix timestamp of the check
        at: u64,
        /// Newer release, if any
        update: Option<AvailableUpdate>,
    },
}

/// How the poller runs
pub struct PollerConfig {
    /// Player to track; the poller idles without one
    pub profile_id: Option<u64>,
    /// Time between two polls
    pub interval: Duration,
    /// Checked once when the thread starts
    pub update_checker: Option<UpdateChecker>,
    /// Unix time of the previous update check, used for rate limiting
    pub last_update_check: u64,
}

/// Result of a bounded stop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// The thread exited within the grace period
    Joined,
    /// The thread was still busy when the grace period ran out and was detached
    TimedOut,
    /// Nothing was running
    NotRunning,
}

/// Interruptible stop flag shared with the poller thread
#[derive(Debug, Default)]
pub struct CancelToken {
    cancelled: AtomicBool,
    lock: Mutex<()>,
    cvar: Condvar,
}

impl CancelToken {
    /// Request cancellation and wake any waiter
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        let _guard = self.lock.lock();
        self.cvar.notify_all();
    }

    /// Request cancellation without blocking for more than `timeout`
    ///
    /// The flag is always set; only the wake-up is skipped when the lock is busy, in
    /// which case the waiter notices on its next check.
    pub fn cancel_within(&self, timeout: Duration) {
        self.cancelled.store(true, Ordering::SeqCst);
        if let Some(_guard) = self.lock.try_lock_for(timeout) {
            self.cvar.notify_all();
        }
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Sleep up to `timeout`; returns `true` if cancelled
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut guard = self.lock.lock();
        while !self.is_cancelled() {
            if self.cvar.wait_until(&mut guard, deadline).timed_out() {
                break;
            }
        }
        self.is_cancelled()
    }
}

/// Handle that can stop the current run from anywhere, including the crash hook
#[derive(Clone, Default)]
pub struct StopHandle {
    current: Arc<Mutex<Option<Arc<CancelToken>>>>,
}

impl StopHandle {
    /// Signal the running poller thread, if any, to stop
    ///
    /// Never blocks longer than `timeout`; returns `false` if the handle could not
    /// be inspected in time.
    pub fn request_stop(&self, timeout: Duration) -> bool {
        match self.current.try_lock_for(timeout) {
            Some(current) => {
                if let Some(token) = current.as_ref() {
                    token.cancel_within(timeout);
                }
                true
            }
            None => false,
        }
    }
}

struct RunningPoller {
    token: Arc<CancelToken>,
    done: mpsc::Receiver<()>,
    handle: JoinHandle<()>,
}

/// Owner of the polling thread
pub struct ApiPoller {
    source: Arc<dyn StatsSource + Sync>,
    events: mpsc::SyncSender<PollEvent>,
    stop_handle: StopHandle,
    running: Option<RunningPoller>,
}

impl ApiPoller {
    /// Create a stopped poller publishing to `events`
    pub fn new(source: Arc<dyn StatsSource + Sync>, events: mpsc::SyncSender<PollEvent>) -> Self {
        Self {
            source,
            events,
            stop_handle: StopHandle::default(),
            running: None,
        }
    }

    /// Handle for stopping the poller without owning it
    pub fn stop_handle(&self) -> StopHandle {
        self.stop_handle.clone()
    }

    /// Whether a poller thread is alive
    pub fn is_running(&self) -> bool {
        self.running
            .as_ref()
            .is_some_and(|r| !r.handle.is_finished())
    }

    /// Start polling; does nothing if a thread is already running
    pub fn start(&mut self, config: PollerConfig) -> Result<()> {
        if self.is_running() {
            debug!("Poller already running");
            return Ok(());
        }
        if let Some(finished) = self.running.take() {
            let _ = finished.handle.join();
        }

        let token = Arc::new(CancelToken::default());
        *self.stop_handle.current.lock() = Some(Arc::clone(&token));

        let (done_tx, done_rx) = mpsc::channel::<()>();
        let worker = PollWorker {
            source: Arc::clone(&self.source),
            events: self.events.clone(),
            token: Arc::clone(&token),
            last_match_id: None,
        };

        let handle = thread::Builder::new()
            .name("api-poller".to_string())
            .spawn(move || {
                // Dropped when the thread ends, even by unwinding
                let _done = done_tx;
                worker.run(config);
            })
            .map_err(|e| OverlayError::PollerError(Box::new(e)))?;

        info!("API poller started");
        self.running = Some(RunningPoller {
            token,
            done: done_rx,
            handle,
        });
        Ok(())
    }

    /// Stop polling and wait at most `grace` for the thread to exit
    pub fn stop(&mut self, grace: Duration) -> StopOutcome {
        let Some(running) = self.running.take() else {
            return StopOutcome::NotRunning;
        };

        running.token.cancel();
        match running.done.recv_timeout(grace) {
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    "API poller did not stop within {:?}, detaching it",
                    grace
                );
                StopOutcome::TimedOut
            }
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                if running.handle.join().is_err() {
                    error!("API poller thread panicked");
                }
                info!("API poller stopped");
                StopOutcome::Joined
            }
        }
    }
}

struct PollWorker {
    source: Arc<dyn StatsSource + Sync>,
    events: mpsc::SyncSender<PollEvent>,
    token: Arc<CancelToken>,
    last_match_id: Option<String>,
}

impl PollWorker {
    fn run(mut self, config: PollerConfig) {
        if let Some(checker) = &config.update_checker
            && checker.should_check(config.last_update_check)
        {
            self.check_for_updates(checker);
        }

        loop {
            if self.token.is_cancelled() {
                break;
            }

            match config.profile_id {
                Some(profile_id) => self.poll_once(profile_id),
                None => debug!("No profile configured, skipping poll"),
            }

            if self.token.wait_timeout(config.interval) {
                break;
            }
        }

        debug!("Poller loop exited");
    }

    fn check_for_updates(&self, checker: &UpdateChecker) {
        let update = match checker.check_for_updates() {
            Ok(update) => update,
            Err(e) => {
                warn!("Update check failed: {}", e);
                None
            }
        };
        self.publish(PollEvent::UpdateChecked {
            at: update_checker::current_timestamp(),
            update,
        });
    }

    fn poll_once(&mut self, profile_id: u64) {
        let player_match = match self.source.fetch_last_match(profile_id) {
            Ok(m) => m,
            Err(e) => {
                warn!("Failed to fetch last match: {}", e);
                self.publish(PollEvent::Error(e.to_string()));
                return;
            }
        };

        // A stop that timed out detaches the thread mid-request
        if self.token.is_cancelled() {
            debug!("Poller cancelled during request, discarding match");
            return;
        }

        let match_id = player_match.last_match.match_id.clone();
        if self.last_match_id.as_deref() == Some(match_id.as_str()) {
            debug!("Match {} unchanged", match_id);
            return;
        }

        info!("New match detected: {}", match_id);
        self.last_match_id = Some(match_id);
        self.publish(PollEvent::NewMatch(player_match));

        let mut ratings = Vec::with_capacity(TeamSize::ALL.len());
        for team_size in TeamSize::ALL {
            if self.token.is_cancelled() {
                return;
            }
            match self.source.fetch_rating_history(profile_id, team_size) {
                Ok(points) => ratings.push((team_size, points)),
                Err(e) => warn!("Failed to fetch {} rating history: {}", team_size.label(), e),
            }
        }
        if !ratings.is_empty() {
            self.publish(PollEvent::Ratings(ratings));
        }
    }

    fn publish(&self, event: PollEvent) {
        if self.token.is_cancelled() {
            debug!("Poller cancelled, dropping {:?}", event);
            return;
        }
        match self.events.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => warn!("Event queue full, dropping {:?}", event),
            Err(TrySendError::Disconnected(_)) => {
                debug!("Event receiver gone, stopping poller");
                self.token.cancel();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MatchInfo;
    use std::sync::atomic::AtomicUsize;

    /// Serves a fixed match id and counts requests
    struct FakeSource {
        match_id: Mutex<String>,
        match_calls: AtomicUsize,
        fail: bool,
    }

    impl FakeSource {
        fn new(match_id: &str) -> Self {
            Self {
                match_id: Mutex::new(match_id.to_string()),
                match_calls: AtomicUsize::new(0),
                fail: false,
            }
        }
    }

    impl StatsSource for FakeSource {
        fn fetch_last_match(&self, profile_id: u64) -> Result<PlayerMatch> {
            self.match_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(OverlayError::ApiStatus(500));
            }
            Ok(PlayerMatch {
                profile_id,
                name: Some("Tester".to_string()),
                last_match: MatchInfo {
                    match_id: self.match_id.lock().clone(),
                    ..MatchInfo::default()
                },
            })
        }

        fn fetch_rating_history(
            &self,
            _profile_id: u64,
            team_size: TeamSize,
        ) -> Result<Vec<RatingPoint>> {
            if team_size == TeamSize::FourVsFour {
                return Err(OverlayError::ApiStatus(404));
            }
            Ok(vec![RatingPoint {
                rating: 1000 + i32::try_from(team_size.index()).unwrap(),
                timestamp: 1,
            }])
        }
    }

    fn config(profile_id: Option<u64>, interval_ms: u64) -> PollerConfig {
        PollerConfig {
            profile_id,
            interval: Duration::from_millis(interval_ms),
            update_checker: None,
            last_update_check: 0,
        }
    }

    #[test]
    fn test_cancel_token_wakes_waiter() {
        let token = Arc::new(CancelToken::default());
        let waiter = Arc::clone(&token);
        let handle = thread::spawn(move || {
            let started = Instant::now();
            let cancelled = waiter.wait_timeout(Duration::from_secs(30));
            (cancelled, started.elapsed())
        });

        thread::sleep(Duration::from_millis(50));
        token.cancel();
        let (cancelled, elapsed) = handle.join().unwrap();
        assert!(cancelled);
        assert!(elapsed < Duration::from_secs(5));
    }

    #[test]
    fn test_cancel_token_times_out() {
        let token = CancelToken::default();
        assert!(!token.wait_timeout(Duration::from_millis(10)));
    }

    #[test]
    fn test_new_match_and_ratings_published_once() {
        let (tx, rx) = mpsc::sync_channel(32);
        let source = Arc::new(FakeSource::new("m-1"));
        let mut poller = ApiPoller::new(source.clone(), tx);

        poller.start(config(Some(5), 10)).unwrap();

        let first = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(matches!(first, PollEvent::NewMatch(ref m) if m.last_match.match_id == "m-1"));

        let second = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        match second {
            PollEvent::Ratings(series) => {
                // 4v4 failed and is skipped
                assert_eq!(series.len(), 3);
                assert_eq!(series[0].0, TeamSize::OneVsOne);
            }
            other => panic!("unexpected event {other:?}"),
        }

        // Wait for a few more polls; the unchanged match must not be republished
        while source.match_calls.load(Ordering::SeqCst) < 4 {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(rx.try_recv().is_err());

        *source.match_id.lock() = "m-2".to_string();
        let third = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(matches!(third, PollEvent::NewMatch(ref m) if m.last_match.match_id == "m-2"));

        assert_eq!(poller.stop(Duration::from_secs(5)), StopOutcome::Joined);
    }

    #[test]
    fn test_errors_are_published_and_polling_continues() {
        let (tx, rx) = mpsc::sync_channel(32);
        let source = Arc::new(FakeSource {
            fail: true,
            ..FakeSource::new("m-1")
        });
        let mut poller = ApiPoller::new(source.clone(), tx);
        poller.start(config(Some(5), 5)).unwrap();

        for _ in 0..2 {
            let event = rx.recv_timeout(Duration::from_secs(5)).unwrap();
            assert_eq!(event, PollEvent::Error("Stats API returned status 500".to_string()));
        }
        assert_eq!(poller.stop(Duration::from_secs(5)), StopOutcome::Joined);
    }

    #[test]
    fn test_start_is_idempotent_and_stop_interrupts_sleep() {
        let (tx, _rx) = mpsc::sync_channel(32);
        let mut poller = ApiPoller::new(Arc::new(FakeSource::new("m")), tx);

        poller.start(config(None, 60_000)).unwrap();
        poller.start(config(None, 60_000)).unwrap();
        assert!(poller.is_running());

        let started = Instant::now();
        assert_eq!(poller.stop(Duration::from_secs(5)), StopOutcome::Joined);
        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(!poller.is_running());

        assert_eq!(poller.stop(Duration::from_secs(1)), StopOutcome::NotRunning);
    }

    #[test]
    fn test_poller_can_restart_after_stop() {
        let (tx, _rx) = mpsc::sync_channel(32);
        let mut poller = ApiPoller::new(Arc::new(FakeSource::new("m")), tx);

        poller.start(config(None, 60_000)).unwrap();
        poller.stop(Duration::from_secs(5));
        poller.start(config(None, 60_000)).unwrap();
        assert!(poller.is_running());
        assert_eq!(poller.stop(Duration::from_secs(5)), StopOutcome::Joined);
    }

    #[test]
    fn test_stop_handle_stops_current_run() {
        let (tx, _rx) = mpsc::sync_channel(32);
        let mut poller = ApiPoller::new(Arc::new(FakeSource::new("m")), tx);
        let handle = poller.stop_handle();

        poller.start(config(None, 60_000)).unwrap();
        assert!(handle.request_stop(Duration::from_millis(100)));

        let deadline = Instant::now() + Duration::from_secs(5);
        while poller.is_running() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(!poller.is_running());
    }

    /// Answers after `delay`, reporting when each request starts and returns
    struct SlowSource {
        delay: Duration,
        progress: Mutex<mpsc::Sender<&'static str>>,
    }

    impl StatsSource for SlowSource {
        fn fetch_last_match(&self, profile_id: u64) -> Result<PlayerMatch> {
            let _ = self.progress.lock().send("started");
            thread::sleep(self.delay);
            let _ = self.progress.lock().send("returned");
            Ok(PlayerMatch {
                profile_id,
                ..PlayerMatch::default()
            })
        }

        fn fetch_rating_history(
            &self,
            _profile_id: u64,
            _team_size: TeamSize,
        ) -> Result<Vec<RatingPoint>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_detached_poller_publishes_nothing_after_stop() {
        let (tx, rx) = mpsc::sync_channel(32);
        let (progress_tx, progress_rx) = mpsc::channel();
        let source = Arc::new(SlowSource {
            delay: Duration::from_millis(300),
            progress: Mutex::new(progress_tx),
        });
        let mut poller = ApiPoller::new(source, tx);

        poller.start(config(Some(5), 60_000)).unwrap();
        assert_eq!(progress_rx.recv_timeout(Duration::from_secs(5)).unwrap(), "started");

        // Grace shorter than the request, so the thread is detached mid-fetch
        assert_eq!(poller.stop(Duration::from_millis(20)), StopOutcome::TimedOut);
        assert_eq!(progress_rx.recv_timeout(Duration::from_secs(5)).unwrap(), "returned");

        assert!(rx.recv_timeout(Duration::from_millis(300)).is_err());
    }

    #[test]
    fn test_stop_handle_without_run_is_harmless() {
        assert!(StopHandle::default().request_stop(Duration::from_millis(10)));
    }
}
