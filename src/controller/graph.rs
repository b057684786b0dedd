//! Rating graph model
//!
//! Holds one rating series per team size together with the plot visibility toggles
//! and the "Last 24h" filter. The GUI only renders what `visible_series` returns.

use crate::api::{RatingPoint, TeamSize};
use crate::error::{OverlayError, Result};

/// Seconds in the "Last 24h" window
pub const DAY_SECS: i64 = 24 * 60 * 60;

/// Graph operations the main window drives from its menu
pub trait GraphTab {
    /// Show or hide the plot at `index` (0 = 1v1 ... 3 = 4v4)
    fn change_plot_visibility(&mut self, index: usize, visible: bool) -> Result<()>;

    /// Restrict plots to the last 24 hours
    fn limit_to_day(&mut self, enabled: bool);
}

/// A visible, filtered series ready to draw
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesView {
    /// Queue of the series
    pub team_size: TeamSize,
    /// Points in ascending time order
    pub points: Vec<RatingPoint>,
    /// Lowest rating in `points`
    pub min: i32,
    /// Highest rating in `points`
    pub max: i32,
    /// Most recent rating
    pub latest: i32,
}

/// Rating graphs state
#[derive(Debug, Clone)]
pub struct GraphState {
    series: [Vec<RatingPoint>; 4],
    visible: [bool; 4],
    last_day_only: bool,
}

impl Default for GraphState {
    fn default() -> Self {
        Self {
            series: Default::default(),
            visible: [true; 4],
            last_day_only: false,
        }
    }
}

impl GraphState {
    /// Replace the series of `team_size`
    pub fn set_series(&mut self, team_size: TeamSize, mut points: Vec<RatingPoint>) {
        points.sort_by_key(|p| p.timestamp);
        self.series[team_size.index()] = points;
    }

    /// Drop all series, keeping the toggles
    pub fn clear_series(&mut self) {
        for series in &mut self.series {
            series.clear();
        }
    }

    /// Whether the plot at `index` is shown
    pub fn is_visible(&self, index: usize) -> bool {
        self.visible.get(index).copied().unwrap_or(false)
    }

    /// Whether only the last 24 hours are shown
    pub fn is_limited_to_day(&self) -> bool {
        self.last_day_only
    }

    /// Visible, non-empty series after the day filter, relative to unix time `now`
    pub fn visible_series(&self, now: i64) -> Vec<SeriesView> {
        TeamSize::ALL
            .iter()
            .filter(|ts| self.visible[ts.index()])
            .filter_map(|&team_size| {
                let points: Vec<RatingPoint> = self.series[team_size.index()]
                    .iter()
                    .filter(|p| !self.last_day_only || p.timestamp >= now - DAY_SECS)
                    .copied()
                    .collect();

                let min = points.iter().map(|p| p.rating).min()?;
                let max = points.iter().map(|p| p.rating).max()?;
                let latest = points.last()?.rating;
                Some(SeriesView {
                    team_size,
                    points,
                    min,
                    max,
                    latest,
                })
            })
            .collect()
    }
}

impl GraphTab for GraphState {
    fn change_plot_visibility(&mut self, index: usize, visible: bool) -> Result<()> {
        let slot = self
            .visible
            .get_mut(index)
            .ok_or(OverlayError::GraphIndexOutOfRange(index))?;
        *slot = visible;
        Ok(())
    }

    fn limit_to_day(&mut self, enabled: bool) {
        self.last_day_only = enabled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(rating: i32, timestamp: i64) -> RatingPoint {
        RatingPoint { rating, timestamp }
    }

    #[test]
    fn test_series_sorted_and_summarized() {
        let mut graph = GraphState::default();
        graph.set_series(
            TeamSize::OneVsOne,
            vec![point(1100, 30), point(1000, 10), point(1050, 20)],
        );

        let views = graph.visible_series(100);
        assert_eq!(views.len(), 1);
        let view = &views[0];
        assert_eq!(view.points.first().unwrap().timestamp, 10);
        assert_eq!((view.min, view.max, view.latest), (1000, 1100, 1100));
    }

    #[test]
    fn test_hidden_plots_are_skipped() {
        let mut graph = GraphState::default();
        graph.set_series(TeamSize::OneVsOne, vec![point(1000, 1)]);
        graph.set_series(TeamSize::TwoVsTwo, vec![point(900, 1)]);

        graph.change_plot_visibility(0, false).unwrap();
        let views = graph.visible_series(10);
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].team_size, TeamSize::TwoVsTwo);
    }

    #[test]
    fn test_limit_to_day_filters_old_points() {
        let now = 1_000_000;
        let mut graph = GraphState::default();
        graph.set_series(
            TeamSize::ThreeVsThree,
            vec![point(1000, now - DAY_SECS - 1), point(1020, now - 60)],
        );

        graph.limit_to_day(true);
        let views = graph.visible_series(now);
        assert_eq!(views[0].points.len(), 1);
        assert_eq!(views[0].latest, 1020);

        graph.limit_to_day(false);
        assert_eq!(graph.visible_series(now)[0].points.len(), 2);
    }

    #[test]
    fn test_series_empty_after_filter_is_dropped() {
        let mut graph = GraphState::default();
        graph.set_series(TeamSize::FourVsFour, vec![point(1000, 0)]);
        graph.limit_to_day(true);
        assert!(graph.visible_series(DAY_SECS * 10).is_empty());
    }

    #[test]
    fn test_out_of_range_index() {
        let mut graph = GraphState::default();
        assert!(matches!(
            graph.change_plot_visibility(4, true),
            Err(OverlayError::GraphIndexOutOfRange(4))
        ));
    }
}
