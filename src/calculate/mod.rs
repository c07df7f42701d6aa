//! Analytics transform pipeline.
//!
//! Turns raw upstream payloads into chart-ready metrics:
//! - Team join (teams + standings + fixtures → one row per team)
//! - Per-game and efficiency ratios
//! - Fixture normalization and grouping by date
//! - Month/matchday aggregation
//! - Moving averages over consecutive fixtures
//! - Top-N rankings
//!
//! Every function here is pure: no I/O, no shared state.

mod join;
mod moving_average;
mod normalize;
mod ratios;
mod time_aggregate;
mod top_teams;

pub use join::*;
pub use moving_average::*;
pub use normalize::*;
pub use ratios::*;
pub use time_aggregate::*;
pub use top_teams::*;

use serde::Serialize;
use tracing::info;

use crate::models::{
    ApiEnvelope, FixtureRecord, MovingAveragePoint, RatioRecord, RawFixture,
    RawStandingsResponse, RawTeam, TeamRecord, TimeAggregation, TopTeams,
};

/// Round to a fixed number of decimal places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// `part / whole × 100`, or 0 when `whole` is zero.
pub fn percentage(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        0.0
    } else {
        part / whole * 100.0
    }
}

/// `total / games`, or 0 when no games were played.
pub fn per_game(total: f64, games: f64) -> f64 {
    if games == 0.0 {
        0.0
    } else {
        total / games
    }
}

/// Knobs for a full pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    pub window_size: usize,
    pub top_limit: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            top_limit: DEFAULT_TOP_LIMIT,
        }
    }
}

/// Everything the dashboard renders for one league season.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalyticsReport {
    pub teams: Vec<TeamRecord>,
    pub team_ratios: Vec<RatioRecord>,
    pub fixtures: Vec<FixtureRecord>,
    pub rejected_fixtures: Vec<MalformedRecordError>,
    pub time_aggregations: TimeAggregation,
    pub moving_averages: Vec<MovingAveragePoint>,
    pub top_teams: TopTeams,
}

/// Run the pipeline over typed raw records.
pub fn build_report_from_records(
    teams: Option<&[RawTeam]>,
    standings: Option<&[RawStandingsResponse]>,
    fixtures: Option<&[RawFixture]>,
    options: ReportOptions,
) -> AnalyticsReport {
    let joined = join_team_data(teams, standings, fixtures);
    let team_ratios = compute_ratios(&joined);
    let normalized = normalize_fixtures(fixtures);
    let time_aggregations = aggregate_by_time(fixtures);
    let moving = moving_averages(fixtures, options.window_size);
    let top_teams = top_by_metrics(&team_ratios, options.top_limit);

    info!(
        "Built report: {} teams, {} fixtures ({} rejected), {} moving-average points",
        joined.len(),
        normalized.fixtures.len(),
        normalized.rejected.len(),
        moving.len()
    );

    AnalyticsReport {
        teams: joined,
        team_ratios,
        fixtures: normalized.fixtures,
        rejected_fixtures: normalized.rejected,
        time_aggregations,
        moving_averages: moving,
        top_teams,
    }
}

/// Run the pipeline over raw upstream payloads (`{ "response": [...] }`).
///
/// A payload that does not decode is treated as absent.
pub fn build_report(
    teams: &serde_json::Value,
    standings: &serde_json::Value,
    fixtures: &serde_json::Value,
    options: ReportOptions,
) -> AnalyticsReport {
    let teams = ApiEnvelope::<RawTeam>::records_from_value(teams);
    let standings = ApiEnvelope::<RawStandingsResponse>::records_from_value(standings);
    let fixtures = ApiEnvelope::<RawFixture>::records_from_value(fixtures);

    build_report_from_records(
        teams.as_deref(),
        standings.as_deref(),
        fixtures.as_deref(),
        options,
    )
}
