//! Rolling goal and result averages over consecutive fixtures.

use chrono::{DateTime, Utc};

use crate::models::{parse_fixture_date, MatchOutcome, MovingAveragePoint, RawFixture};

use super::{percentage, round_to};

/// Default window used by the dashboard.
pub const DEFAULT_WINDOW_SIZE: usize = 5;

/// Compute one point per full window over the fixtures in date order.
///
/// The input is copied and stably sorted by kick-off; fixtures without a
/// parseable date sort first. Yields `len - window_size + 1` points, or none
/// when there are fewer fixtures than the window or the window is zero.
/// Percentages are shares of `window_size`, and unplayed fixtures count as
/// goalless draws.
pub fn moving_averages(fixtures: Option<&[RawFixture]>, window_size: usize) -> Vec<MovingAveragePoint> {
    let Some(fixtures) = fixtures else {
        return Vec::new();
    };
    if window_size == 0 || fixtures.len() < window_size {
        return Vec::new();
    }

    let mut sorted: Vec<(Option<DateTime<Utc>>, &RawFixture)> = fixtures
        .iter()
        .map(|f| (f.date_str().and_then(parse_fixture_date), f))
        .collect();
    sorted.sort_by_key(|(date, _)| *date);

    let size = window_size as f64;

    sorted
        .windows(window_size)
        .enumerate()
        .map(|(start, window)| {
            let mut total_goals = 0u32;
            let (mut home_wins, mut away_wins, mut draws) = (0u32, 0u32, 0u32);

            for (_, fixture) in window {
                total_goals = total_goals.saturating_add(fixture.total_goals());
                match MatchOutcome::from_winner_flags(
                    fixture.home().and_then(|s| s.winner),
                    fixture.away().and_then(|s| s.winner),
                ) {
                    MatchOutcome::HomeWin => home_wins += 1,
                    MatchOutcome::AwayWin => away_wins += 1,
                    MatchOutcome::Draw => draws += 1,
                }
            }

            MovingAveragePoint {
                date: window[window_size - 1].0,
                period: format!("Match {} to {}", start + 1, start + window_size),
                avg_goals: round_to(total_goals as f64 / size, 2),
                home_win_percentage: percentage(home_wins as f64, size),
                away_win_percentage: percentage(away_wins as f64, size),
                draw_percentage: percentage(draws as f64, size),
                total_matches: window_size,
            }
        })
        .collect()
}
