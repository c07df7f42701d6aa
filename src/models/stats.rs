//! Derived statistics models.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{MatchOutcome, TeamRecord};

/// A team row extended with per-game and efficiency ratios.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioRecord {
    #[serde(flatten)]
    pub team: TeamRecord,

    pub points_per_game: f64,

    /// Wins over games played (0.0 to 100.0)
    pub win_percentage: f64,

    /// Losses over games played (0.0 to 100.0)
    pub loss_percentage: f64,

    pub goals_per_game: f64,
    pub goals_conceded_per_game: f64,

    /// Share of all goals in this team's games that it scored (0.0 to 100.0)
    pub offensive_efficiency: f64,

    /// Share of all goals in this team's games that it conceded (0.0 to 100.0)
    pub defensive_efficiency: f64,

    /// Offensive over defensive efficiency.
    ///
    /// `None` when the team scored but never conceded; the ratio has no
    /// finite value there.
    pub efficiency_ratio: Option<f64>,
}

impl RatioRecord {
    /// Efficiency ratio with the unbounded case ranked as zero.
    pub fn efficiency_ratio_or_zero(&self) -> f64 {
        self.efficiency_ratio.unwrap_or(0.0)
    }
}

/// Per-period fixture summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeBucket {
    /// `YYYY-MM` for month buckets, the round label for matchday buckets
    pub period: String,

    pub total_goals: u32,
    pub total_matches: u32,
    pub home_wins: u32,
    pub away_wins: u32,
    pub draws: u32,

    pub avg_goals_per_match: f64,
    pub home_win_percentage: f64,
    pub away_win_percentage: f64,
    pub draw_percentage: f64,
}

impl TimeBucket {
    pub fn new(period: impl Into<String>) -> Self {
        Self {
            period: period.into(),
            ..Default::default()
        }
    }

    /// Count one fixture into the running totals.
    pub fn record(&mut self, goals: u32, outcome: MatchOutcome) {
        self.total_goals = self.total_goals.saturating_add(goals);
        self.total_matches = self.total_matches.saturating_add(1);
        let tally = match outcome {
            MatchOutcome::HomeWin => &mut self.home_wins,
            MatchOutcome::AwayWin => &mut self.away_wins,
            MatchOutcome::Draw => &mut self.draws,
        };
        *tally = tally.saturating_add(1);
    }
}

/// Fixtures bucketed by calendar month and by round.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeAggregation {
    pub by_month: Vec<TimeBucket>,
    pub by_matchday: Vec<TimeBucket>,
}

/// Rolling statistics over a window of consecutive fixtures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovingAveragePoint {
    /// Date of the last fixture in the window
    pub date: Option<DateTime<Utc>>,

    /// e.g. "Match 3 to 7"
    pub period: String,

    pub avg_goals: f64,
    pub home_win_percentage: f64,
    pub away_win_percentage: f64,
    pub draw_percentage: f64,

    /// Window size the point was computed over
    pub total_matches: usize,
}

/// Ranked team lists, one per metric.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopTeams {
    pub by_points: Vec<RatioRecord>,
    pub by_goals: Vec<RatioRecord>,
    pub by_win_percentage: Vec<RatioRecord>,
    pub by_efficiency: Vec<RatioRecord>,
    pub by_defense: Vec<RatioRecord>,
}

/// A metric a team list can be ranked on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamMetric {
    Points,
    GoalsFor,
    GoalsAgainst,
    GoalDifference,
    Wins,
    WinPercentage,
    PointsPerGame,
    EfficiencyRatio,
}

impl TeamMetric {
    /// Read the metric off a ratio record.
    pub fn value(&self, record: &RatioRecord) -> f64 {
        match self {
            TeamMetric::Points => record.team.points as f64,
            TeamMetric::GoalsFor => record.team.goals_for as f64,
            TeamMetric::GoalsAgainst => record.team.goals_against as f64,
            TeamMetric::GoalDifference => record.team.goal_difference as f64,
            TeamMetric::Wins => record.team.wins as f64,
            TeamMetric::WinPercentage => record.win_percentage,
            TeamMetric::PointsPerGame => record.points_per_game,
            TeamMetric::EfficiencyRatio => record.efficiency_ratio_or_zero(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TeamMetric::Points => "points",
            TeamMetric::GoalsFor => "goals_for",
            TeamMetric::GoalsAgainst => "goals_against",
            TeamMetric::GoalDifference => "goal_difference",
            TeamMetric::Wins => "wins",
            TeamMetric::WinPercentage => "win_percentage",
            TeamMetric::PointsPerGame => "points_per_game",
            TeamMetric::EfficiencyRatio => "efficiency_ratio",
        }
    }
}

impl std::fmt::Display for TeamMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TeamMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "points" => Ok(TeamMetric::Points),
            "goals" | "goals_for" => Ok(TeamMetric::GoalsFor),
            "goals_against" => Ok(TeamMetric::GoalsAgainst),
            "goal_difference" => Ok(TeamMetric::GoalDifference),
            "wins" => Ok(TeamMetric::Wins),
            "win_percentage" => Ok(TeamMetric::WinPercentage),
            "points_per_game" => Ok(TeamMetric::PointsPerGame),
            "efficiency" | "efficiency_ratio" => Ok(TeamMetric::EfficiencyRatio),
            other => Err(format!("Unknown team metric: {}", other)),
        }
    }
}
