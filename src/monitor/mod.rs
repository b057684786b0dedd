//! Background monitoring
//!
//! # Overview
//!
//! - `ApiPoller` owns a single background thread that polls the stats service for
//!   the tracked player's last match and rating history.
//! - Results are published as `PollEvent`s on a bounded `mpsc` channel which the UI
//!   drains on a timer.
//! - `StopHandle` lets the crash hook stop the thread without owning the poller.
//!
//! # Example Usage
//!
//! ```no_run
//! use aoe4_overlay::api::StatsClient;
//! use aoe4_overlay::monitor::{ApiPoller, PollerConfig};
//! use std::sync::{Arc, mpsc};
//! use std::time::Duration;
//!
//! let (tx, rx) = mpsc::sync_channel(32);
//! let client = StatsClient::new("https://aoeiv.net")?;
//! let mut poller = ApiPoller::new(Arc::new(client), tx);
//!
//! poller.start(PollerConfig {
//!     profile_id: Some(4_635_035),
//!     interval: Duration::from_secs(15),
//!     update_checker: None,
//!     last_update_check: 0,
//! })?;
//!
//! if let Ok(event) = rx.recv_timeout(Duration::from_secs(30)) {
//!     println!("{event:?}");
//! }
//!
//! poller.stop(Duration::from_secs(1));
//! # Ok::<(), aoe4_overlay::OverlayError>(())
//! ```

pub mod api_poller;

pub use api_poller::{ApiPoller, CancelToken, PollEvent, PollerConfig, StopHandle, StopOutcome};
