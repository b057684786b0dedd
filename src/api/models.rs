//! Stats service response models
//!
//! Parsing is deliberately lenient: every field has a default, and ids that the
//! service sometimes sends as numbers and sometimes as strings are read as strings.

use serde::{Deserialize, Deserializer, Serialize};

/// Ranked queue, identified by the number of players per team
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TeamSize {
    /// 1v1
    OneVsOne,
    /// 2v2
    TwoVsTwo,
    /// 3v3
    ThreeVsThree,
    /// 4v4
    FourVsFour,
}

impl TeamSize {
    /// All queues in graph order
    pub const ALL: [Self; 4] = [
        Self::OneVsOne,
        Self::TwoVsTwo,
        Self::ThreeVsThree,
        Self::FourVsFour,
    ];

    /// 0-based graph index
    pub fn index(self) -> usize {
        match self {
            Self::OneVsOne => 0,
            Self::TwoVsTwo => 1,
            Self::ThreeVsThree => 2,
            Self::FourVsFour => 3,
        }
    }

    /// Queue for a 0-based graph index
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Players per team
    pub fn players(self) -> usize {
        self.index() + 1
    }

    /// Leaderboard id used by the stats service
    pub fn leaderboard_id(self) -> u32 {
        match self {
            Self::OneVsOne => 17,
            Self::TwoVsTwo => 18,
            Self::ThreeVsThree => 19,
            Self::FourVsFour => 20,
        }
    }

    /// Short label such as "2v2"
    pub fn label(self) -> String {
        let n = self.players();
        format!("{n}v{n}")
    }
}

/// One entry of a player's rating history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingPoint {
    /// Rating after the game
    #[serde(default)]
    pub rating: i32,
    /// Unix timestamp in seconds
    #[serde(default)]
    pub timestamp: i64,
}

/// Player entry of a match
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchPlayer {
    /// Profile id, absent for AI players
    pub profile_id: Option<u64>,
    /// Display name
    pub name: Option<String>,
    /// Civilization, numeric or textual depending on the service
    #[serde(deserialize_with = "lenient_string")]
    pub civ: String,
    /// Team number
    pub team: Option<i64>,
    /// Rating at the start of the match
    pub rating: Option<i32>,
}

/// A single match
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchInfo {
    /// Match id
    #[serde(deserialize_with = "lenient_string")]
    pub match_id: String,
    /// Map identifier
    #[serde(deserialize_with = "lenient_string")]
    pub map_type: String,
    /// Start time (unix seconds)
    pub started: Option<i64>,
    /// End time (unix seconds), `None` while the match is running
    pub finished: Option<i64>,
    /// Participants
    pub players: Vec<MatchPlayer>,
}

impl MatchInfo {
    /// Whether the match is still running
    pub fn is_ongoing(&self) -> bool {
        self.finished.is_none()
    }

    /// Players grouped by team, teams in ascending order
    pub fn teams(&self) -> Vec<(i64, Vec<&MatchPlayer>)> {
        let mut teams: std::collections::BTreeMap<i64, Vec<&MatchPlayer>> =
            std::collections::BTreeMap::new();
        for player in &self.players {
            teams.entry(player.team.unwrap_or(0)).or_default().push(player);
        }
        teams.into_iter().collect()
    }
}

/// Answer of the last-match endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerMatch {
    /// Profile the query was made for
    pub profile_id: u64,
    /// Player name
    pub name: Option<String>,
    /// The player's most recent match
    pub last_match: MatchInfo,
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_size_mapping() {
        assert_eq!(TeamSize::from_index(0), Some(TeamSize::OneVsOne));
        assert_eq!(TeamSize::from_index(4), None);
        assert_eq!(TeamSize::ThreeVsThree.leaderboard_id(), 19);
        assert_eq!(TeamSize::FourVsFour.label(), "4v4");
    }

    #[test]
    fn test_parse_last_match() {
        let json = r#"{
            "profile_id": 4635035,
            "name": "Maguro",
            "last_match": {
                "match_id": 123456,
                "map_type": 9,
                "started": 1638000000,
                "finished": null,
                "players": [
                    {"profile_id": 4635035, "name": "Maguro", "civ": 2, "team": 1, "rating": 1250},
                    {"profile_id": 99, "name": "Other", "civ": "english", "team": 2, "rating": null},
                    {"name": "AI", "civ": null, "team": 2}
                ]
            }
        }"#;

        let parsed: PlayerMatch = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.last_match.match_id, "123456");
        assert_eq!(parsed.last_match.map_type, "9");
        assert!(parsed.last_match.is_ongoing());
        assert_eq!(parsed.last_match.players[0].civ, "2");
        assert_eq!(parsed.last_match.players[1].civ, "english");
        assert_eq!(parsed.last_match.players[2].civ, "");
        assert_eq!(parsed.last_match.players[2].profile_id, None);

        let teams = parsed.last_match.teams();
        assert_eq!(teams.len(), 2);
        assert_eq!(teams[1].1.len(), 2);
    }

    #[test]
    fn test_parse_rating_history_ignores_extra_fields() {
        let json = r#"[
            {"rating": 1200, "num_wins": 10, "num_losses": 5, "streak": 1, "drops": 0, "timestamp": 1638000000},
            {"rating": 1184, "timestamp": 1637990000}
        ]"#;
        let points: Vec<RatingPoint> = serde_json::from_str(json).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].rating, 1200);
    }
}
