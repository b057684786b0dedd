//! Configuration data models
//!
//! This module defines the persisted settings record.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Graph identifiers, one per team size ("1" = 1v1 ... "4" = 4v4)
pub const GRAPH_KEYS: [&str; 4] = ["1", "2", "3", "4"];

/// Smallest accepted window dimension in pixels
pub const MIN_DIMENSION: u32 = 200;

/// Largest accepted window dimension in pixels
pub const MAX_DIMENSION: u32 = 10_000;

/// Accepted polling interval range in seconds
pub const POLL_INTERVAL_RANGE: std::ops::RangeInclusive<u64> = 5..=300;

/// Default root of the stats service
pub const DEFAULT_API_BASE_URL: &str = "https://aoeiv.net";

/// Persisted application settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Main window width
    pub app_width: u32,
    /// Main window height
    pub app_height: u32,
    /// Visibility of each rating graph keyed by team size ("1".."4")
    pub show_graph: BTreeMap<String, bool>,
    /// Profile tracked by the poller
    pub profile_id: Option<u64>,
    /// Seconds between two polls of the stats service
    pub poll_interval_secs: u64,
    /// Root URL of the stats service
    pub api_base_url: String,
    /// Unix timestamp of the last update check (0 if never checked)
    pub last_update_check: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_width: 1000,
            app_height: 540,
            show_graph: GRAPH_KEYS.iter().map(|k| ((*k).to_string(), true)).collect(),
            profile_id: None,
            poll_interval_secs: 15,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            last_update_check: 0,
        }
    }
}

impl Settings {
    /// Bring a freshly deserialized record back to a valid state
    ///
    /// Width and height are reset as a pair when either is out of range,
    /// `show_graph` ends up with exactly the keys "1".."4" (missing keys are shown),
    /// and the poll interval is clamped.
    pub fn normalize(&mut self) {
        let defaults = Self::default();
        let valid = |d: u32| (MIN_DIMENSION..=MAX_DIMENSION).contains(&d);
        if !valid(self.app_width) || !valid(self.app_height) {
            self.app_width = defaults.app_width;
            self.app_height = defaults.app_height;
        }

        let graphs = GRAPH_KEYS
            .iter()
            .map(|k| ((*k).to_string(), self.show_graph.get(*k).copied().unwrap_or(true)))
            .collect();
        self.show_graph = graphs;

        self.poll_interval_secs = self
            .poll_interval_secs
            .clamp(*POLL_INTERVAL_RANGE.start(), *POLL_INTERVAL_RANGE.end());

        if self.api_base_url.trim().is_empty() {
            self.api_base_url = defaults.api_base_url;
        }
    }

    /// Whether the graph at `index` (0-based) is shown
    pub fn graph_visible(&self, index: usize) -> bool {
        GRAPH_KEYS
            .get(index)
            .and_then(|k| self.show_graph.get(*k))
            .copied()
            .unwrap_or(true)
    }

    /// Set the visibility of the graph at `index` (0-based); out-of-range indices are ignored
    pub fn set_graph_visible(&mut self, index: usize, visible: bool) {
        if let Some(key) = GRAPH_KEYS.get(index) {
            self.show_graph.insert((*key).to_string(), visible);
        }
    }
}
