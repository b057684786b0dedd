//! Blocking HTTP client for the stats service

use crate::api::models::{PlayerMatch, RatingPoint, TeamSize};
use crate::error::{OverlayError, Result};
use std::time::Duration;
use tracing::{debug, warn};

/// Number of rating history entries requested per queue
const HISTORY_COUNT: u32 = 1000;

/// Source of match and rating data
///
/// The poller only talks to this trait, so tests can feed it canned data.
pub trait StatsSource: Send {
    /// Most recent match of `profile_id`
    fn fetch_last_match(&self, profile_id: u64) -> Result<PlayerMatch>;

    /// Rating history of `profile_id` in one queue, newest first
    fn fetch_rating_history(&self, profile_id: u64, team_size: TeamSize)
    -> Result<Vec<RatingPoint>>;
}

/// `StatsSource` backed by an aoeiv.net compatible HTTP API
pub struct StatsClient {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl StatsClient {
    /// Create a client for the service rooted at `base_url`
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(format!("AoE4_Overlay/{}", crate::VERSION))
            .build()
            .map_err(|e| {
                warn!("Failed to create HTTP client: {}", e);
                OverlayError::ApiError(Box::new(e))
            })?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Root URL requests are made against
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!("GET {}", url);

        let response = self.client.get(url).send().map_err(|e| {
            warn!("Request to {} failed: {}", url, e);
            OverlayError::ApiError(Box::new(e))
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!("Stats API returned error status: {}", status);
            return Err(OverlayError::ApiStatus(status.as_u16()));
        }

        response.json::<T>().map_err(|e| {
            warn!("Failed to parse stats API response: {}", e);
            OverlayError::ApiError(Box::new(e))
        })
    }
}

impl StatsSource for StatsClient {
    fn fetch_last_match(&self, profile_id: u64) -> Result<PlayerMatch> {
        let url = format!(
            "{}/api/player/lastmatch?game=aoe4&profile_id={profile_id}",
            self.base_url
        );
        self.get_json(&url)
    }

    fn fetch_rating_history(
        &self,
        profile_id: u64,
        team_size: TeamSize,
    ) -> Result<Vec<RatingPoint>> {
        let url = format!(
            "{}/api/player/ratinghistory?game=aoe4&leaderboard_id={}&profile_id={profile_id}&count={HISTORY_COUNT}",
            self.base_url,
            team_size.leaderboard_id()
        );
        self.get_json(&url)
    }
}
