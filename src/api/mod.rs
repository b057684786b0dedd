//! Stats service access
//!
//! `StatsSource` abstracts the service so the poller can be driven by canned data,
//! `StatsClient` is the HTTP implementation used by the application.

pub mod client;
pub mod models;

pub use client::{StatsClient, StatsSource};
pub use models::{MatchInfo, MatchPlayer, PlayerMatch, RatingPoint, TeamSize};
