//! Joined team performance record.

use serde::{Deserialize, Serialize};

/// Stadium details carried through from the teams endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub capacity: Option<u32>,
    pub surface: Option<String>,
    pub image: Option<String>,
}

/// One row per team: identity plus season totals.
///
/// Standings supply the totals when they have them; the joiner falls back to
/// counts derived from completed fixtures otherwise.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamRecord {
    pub id: u64,
    pub name: String,
    pub logo: Option<String>,
    pub country: Option<String>,
    pub founded: Option<i32>,
    pub venue: Option<Venue>,

    /// League table rank (0 when the team has no standings row)
    pub position: u32,

    pub points: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: i32,

    /// Recent results, most recent last (e.g. "WWDLW")
    pub form: String,

    pub played: u32,

    /// Win share of completed fixtures (0.0 to 100.0)
    pub fixture_win_percentage: f64,
}

impl TeamRecord {
    /// Create a record with identity only; all totals zeroed.
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder method to set the season record.
    pub fn with_record(mut self, played: u32, wins: u32, draws: u32, losses: u32) -> Self {
        self.played = played;
        self.wins = wins;
        self.draws = draws;
        self.losses = losses;
        self
    }

    /// Builder method to set goals scored and conceded.
    pub fn with_goals(mut self, goals_for: u32, goals_against: u32) -> Self {
        self.goals_for = goals_for;
        self.goals_against = goals_against;
        self.goal_difference = goals_for as i32 - goals_against as i32;
        self
    }

    /// Builder method to set points.
    pub fn with_points(mut self, points: u32) -> Self {
        self.points = points;
        self
    }

    /// Builder method to set table position.
    pub fn with_position(mut self, position: u32) -> Self {
        self.position = position;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_builder() {
        let team = TeamRecord::new(505, "Inter")
            .with_record(38, 29, 7, 2)
            .with_goals(89, 22)
            .with_points(94)
            .with_position(1);

        assert_eq!(team.name, "Inter");
        assert_eq!(team.played, 38);
        assert_eq!(team.goal_difference, 67);
        assert_eq!(team.position, 1);
        assert_eq!(team.form, "");
    }

    #[test]
    fn test_team_serialization() {
        let team = TeamRecord::new(1, "Roma").with_goals(10, 12);
        let json = serde_json::to_string(&team).unwrap();
        let parsed: TeamRecord = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, team);
        assert!(json.contains("\"goal_difference\":-2"));
    }
}
