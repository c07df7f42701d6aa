//! Per-game and efficiency ratios.

use crate::models::{RatioRecord, TeamRecord};

use super::{percentage, per_game, round_to};

/// Offensive/defensive split of the goals in a team's games.
///
/// Both shares are zero when the team has no games or no goals were scored
/// either way.
fn efficiency_split(team: &TeamRecord) -> (f64, f64) {
    let total = team.goals_for.saturating_add(team.goals_against);
    if team.played == 0 || total == 0 {
        return (0.0, 0.0);
    }
    (
        percentage(team.goals_for as f64, total as f64),
        percentage(team.goals_against as f64, total as f64),
    )
}

/// Offensive over defensive efficiency.
///
/// 0/0 is treated as zero; a positive share over zero has no finite ratio
/// and yields `None`.
fn efficiency_ratio(offensive: f64, defensive: f64) -> Option<f64> {
    if defensive == 0.0 {
        if offensive == 0.0 {
            Some(0.0)
        } else {
            None
        }
    } else {
        Some(round_to(offensive / defensive, 2))
    }
}

/// Derive ratios for a single team.
pub fn compute_team_ratios(team: &TeamRecord) -> RatioRecord {
    let played = team.played as f64;
    let (offensive, defensive) = efficiency_split(team);

    RatioRecord {
        points_per_game: round_to(per_game(team.points as f64, played), 2),
        win_percentage: round_to(percentage(team.wins as f64, played), 1),
        loss_percentage: round_to(percentage(team.losses as f64, played), 1),
        goals_per_game: round_to(per_game(team.goals_for as f64, played), 2),
        goals_conceded_per_game: round_to(per_game(team.goals_against as f64, played), 2),
        offensive_efficiency: round_to(offensive, 1),
        defensive_efficiency: round_to(defensive, 1),
        // Computed from the unrounded shares so rounding does not skew it
        efficiency_ratio: efficiency_ratio(offensive, defensive),
        team: team.clone(),
    }
}

/// Derive ratios for every team, preserving order.
pub fn compute_ratios(teams: &[TeamRecord]) -> Vec<RatioRecord> {
    teams.iter().map(compute_team_ratios).collect()
}
