//! Text and geometry shown by the main window
//!
//! Pure functions from controller state to display values, kept apart from the
//! Slint glue so they can be tested without a window.

use aoe4_overlay::api::{PlayerMatch, RatingPoint, TeamSize};
use aoe4_overlay::controller::SeriesView;
use std::fmt::Write as _;

/// Side length of the square viewbox plot paths are drawn in
pub const VIEWBOX: f64 = 1000.0;

/// Vertical margin kept free above and below the plotted ratings
const MARGIN: f64 = 50.0;

/// Common time and rating range of all plotted series
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlotBounds {
    t_min: i64,
    t_max: i64,
    r_min: i32,
    r_max: i32,
}

impl PlotBounds {
    /// Bounds covering every point of `views`; `None` if there are no points
    pub fn of(views: &[SeriesView]) -> Option<Self> {
        let mut points = views.iter().flat_map(|v| v.points.iter());
        let first = points.next()?;
        let init = Self {
            t_min: first.timestamp,
            t_max: first.timestamp,
            r_min: first.rating,
            r_max: first.rating,
        };
        Some(points.fold(init, |b, p| Self {
            t_min: b.t_min.min(p.timestamp),
            t_max: b.t_max.max(p.timestamp),
            r_min: b.r_min.min(p.rating),
            r_max: b.r_max.max(p.rating),
        }))
    }

    #[expect(
        clippy::cast_precision_loss,
        reason = "timestamps and ratings are far below 2^52"
    )]
    fn project(&self, point: RatingPoint) -> (f64, f64) {
        let t_span = (self.t_max - self.t_min) as f64;
        let x = if t_span > 0.0 {
            (point.timestamp - self.t_min) as f64 / t_span * VIEWBOX
        } else {
            VIEWBOX / 2.0
        };

        let r_span = f64::from(self.r_max - self.r_min);
        let usable = VIEWBOX - 2.0 * MARGIN;
        let y = if r_span > 0.0 {
            VIEWBOX - MARGIN - f64::from(point.rating - self.r_min) / r_span * usable
        } else {
            VIEWBOX / 2.0
        };
        (x, y)
    }
}

/// SVG-style path commands drawing `points` inside the viewbox
pub fn path_commands(points: &[RatingPoint], bounds: &PlotBounds) -> String {
    let mut commands = String::new();
    match points {
        [] => {}
        [single] => {
            let (x, y) = bounds.project(*single);
            let _ = write!(commands, "M {:.1} {y:.1} L {:.1} {y:.1}", x - 5.0, x + 5.0);
        }
        [first, rest @ ..] => {
            let (x, y) = bounds.project(*first);
            let _ = write!(commands, "M {x:.1} {y:.1}");
            for point in rest {
                let (x, y) = bounds.project(*point);
                let _ = write!(commands, " L {x:.1} {y:.1}");
            }
        }
    }
    commands
}

/// Legend text of a series, e.g. "1150 (min 1000, max 1200)"
pub fn series_summary(view: &SeriesView) -> String {
    format!("{} (min {}, max {})", view.latest, view.min, view.max)
}

/// Line colour of a queue as RGB
pub fn series_rgb(team_size: TeamSize) -> (u8, u8, u8) {
    match team_size {
        TeamSize::OneVsOne => (0xe0, 0x5a, 0x47),
        TeamSize::TwoVsTwo => (0x4a, 0x90, 0xd9),
        TeamSize::ThreeVsThree => (0x6c, 0xc0, 0x4a),
        TeamSize::FourVsFour => (0xe8, 0xb7, 0x3a),
    }
}

/// Placeholder shown on the graph tab when nothing is plotted
pub fn empty_graphs_text(has_profile: bool) -> &'static str {
    if has_profile {
        "No rating data for the selected queues"
    } else {
        "Enter a profile id on the Match tab to see rating graphs"
    }
}

/// Multi-line description of a match grouped by team
pub fn match_summary(player_match: &PlayerMatch) -> String {
    let info = &player_match.last_match;
    let map = if info.map_type.is_empty() {
        "Unknown map"
    } else {
        info.map_type.as_str()
    };
    let state = if info.is_ongoing() { "in progress" } else { "finished" };

    let mut text = format!("{map} ({state})\n");
    for (team, players) in info.teams() {
        let _ = writeln!(text, "\nTeam {team}");
        for player in players {
            let name = player.name.as_deref().unwrap_or("?");
            let rating = player
                .rating
                .map_or_else(|| "-".to_string(), |r| r.to_string());
            let _ = writeln!(text, "  {name:<24} {:<16} {rating:>6}", player.civ);
        }
    }
    text
}

/// Top-left position that centers a window of `window` size on a screen area
/// starting at `origin`; a window larger than the area is pinned to its origin
pub fn centered_position(
    origin: (i32, i32),
    screen: (u32, u32),
    window: (u32, u32),
) -> (i32, i32) {
    let axis = |origin: i32, screen: u32, window: u32| {
        let offset = ((i64::from(screen) - i64::from(window)) / 2).max(0);
        i32::try_from(i64::from(origin) + offset).unwrap_or(origin)
    };
    (
        axis(origin.0, screen.0, window.0),
        axis(origin.1, screen.1, window.1),
    )
}

/// Parse the profile id typed by the user; blank input clears the profile
pub fn parse_profile_id(text: &str) -> Result<Option<u64>, String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<u64>()
        .map(Some)
        .map_err(|_| format!("'{trimmed}' is not a valid profile id"))
}
