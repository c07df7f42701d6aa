//! Normalized fixture model and match-outcome rules.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status codes that mark a fixture as final.
pub const COMPLETED_STATUSES: [&str; 2] = ["FT", "AET"];

/// Whether a short status code denotes a finished match.
pub fn is_completed_status(short: &str) -> bool {
    COMPLETED_STATUSES.contains(&short)
}

/// Parse an upstream fixture date.
///
/// Accepts RFC 3339 timestamps (the API's format), naive `YYYY-MM-DDTHH:MM:SS`
/// (read as UTC) and bare `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_fixture_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Result of a fixture read off the two winner flags.
///
/// A fixture where neither side is flagged as winner is a draw. That includes
/// matches that have not been played yet; callers that care must filter on
/// status first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOutcome {
    HomeWin,
    AwayWin,
    Draw,
}

impl MatchOutcome {
    pub fn from_winner_flags(home: Option<bool>, away: Option<bool>) -> Self {
        if home == Some(true) {
            MatchOutcome::HomeWin
        } else if away == Some(true) {
            MatchOutcome::AwayWin
        } else {
            MatchOutcome::Draw
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FixtureStatus {
    pub long: Option<String>,
    pub short: Option<String>,
    pub elapsed: Option<u32>,
}

impl FixtureStatus {
    pub fn is_completed(&self) -> bool {
        self.short.as_deref().is_some_and(is_completed_status)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FixtureTeam {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub logo: Option<String>,
    pub winner: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FixtureGoals {
    pub home: Option<u32>,
    pub away: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FixtureVenue {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub city: Option<String>,
}

/// League context a fixture was played in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeagueContext {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub country: Option<String>,
    pub logo: Option<String>,
    pub season: Option<i32>,
    pub round: Option<String>,
}

/// A flat, display-friendly fixture.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FixtureRecord {
    pub id: Option<u64>,

    /// Kick-off in UTC (None when the upstream date is absent or unparseable)
    pub date: Option<DateTime<Utc>>,

    pub timestamp: Option<i64>,
    pub status: FixtureStatus,
    pub home_team: FixtureTeam,
    pub away_team: FixtureTeam,
    pub goals: FixtureGoals,
    pub venue: Option<FixtureVenue>,
    pub league: Option<LeagueContext>,
}

impl FixtureRecord {
    pub fn outcome(&self) -> MatchOutcome {
        MatchOutcome::from_winner_flags(self.home_team.winner, self.away_team.winner)
    }

    pub fn is_completed(&self) -> bool {
        self.status.is_completed()
    }
}
