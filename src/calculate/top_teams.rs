//! Top-N team rankings.

use std::cmp::Ordering;

use crate::models::{RatioRecord, TeamMetric, TopTeams};

/// Default list length used by the dashboard.
pub const DEFAULT_TOP_LIMIT: usize = 10;

/// Teams need more games than this to be ranked on efficiency.
pub const MIN_GAMES_FOR_EFFICIENCY: u32 = 5;

fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Stable sort of a filtered copy, truncated to `limit`.
fn ranked<P, C>(teams: &[RatioRecord], limit: usize, keep: P, compare: C) -> Vec<RatioRecord>
where
    P: Fn(&RatioRecord) -> bool,
    C: Fn(&RatioRecord, &RatioRecord) -> Ordering,
{
    let mut selected: Vec<RatioRecord> = teams.iter().filter(|&t| keep(t)).cloned().collect();
    selected.sort_by(|a, b| compare(a, b));
    selected.truncate(limit);
    selected
}

/// Rank teams on a single metric, highest first.
pub fn top_teams_by(teams: &[RatioRecord], limit: usize, metric: TeamMetric) -> Vec<RatioRecord> {
    ranked(teams, limit, |_| true, |a, b| {
        descending(metric.value(a), metric.value(b))
    })
}

/// The five dashboard rankings.
///
/// Win percentage only ranks teams that have played; efficiency only ranks
/// teams with more than [`MIN_GAMES_FOR_EFFICIENCY`] games and treats a
/// missing ratio as zero; defense ranks fewest goals conceded first. Equal
/// keys keep input order.
pub fn top_by_metrics(teams: &[RatioRecord], limit: usize) -> TopTeams {
    TopTeams {
        by_points: top_teams_by(teams, limit, TeamMetric::Points),
        by_goals: top_teams_by(teams, limit, TeamMetric::GoalsFor),
        by_win_percentage: ranked(
            teams,
            limit,
            |t| t.team.played > 0,
            |a, b| descending(a.win_percentage, b.win_percentage),
        ),
        by_efficiency: ranked(
            teams,
            limit,
            |t| t.team.played > MIN_GAMES_FOR_EFFICIENCY,
            |a, b| descending(a.efficiency_ratio_or_zero(), b.efficiency_ratio_or_zero()),
        ),
        by_defense: ranked(
            teams,
            limit,
            |_| true,
            |a, b| a.team.goals_against.cmp(&b.team.goals_against),
        ),
    }
}
