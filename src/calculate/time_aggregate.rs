//! Month and matchday buckets over fixtures.

use std::collections::BTreeMap;

use chrono::Datelike;
use tracing::debug;

use crate::models::{parse_fixture_date, MatchOutcome, RawFixture, TimeAggregation, TimeBucket};

use super::{percentage, round_to};

/// Round label used when a fixture's league carries none.
pub const UNKNOWN_ROUND: &str = "Unknown";

/// The number formed by the digits of a round label.
///
/// `"Regular Season - 12"` → 12; labels without digits (or with more digits
/// than fit) → 0.
pub fn round_number(label: &str) -> u64 {
    let digits: String = label.chars().filter(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(0)
}

fn finish(mut bucket: TimeBucket) -> TimeBucket {
    let matches = bucket.total_matches as f64;
    if bucket.total_matches > 0 {
        bucket.avg_goals_per_match = round_to(bucket.total_goals as f64 / matches, 2);
    }
    bucket.home_win_percentage = percentage(bucket.home_wins as f64, matches);
    bucket.away_win_percentage = percentage(bucket.away_wins as f64, matches);
    bucket.draw_percentage = percentage(bucket.draws as f64, matches);
    bucket
}

/// Bucket fixtures by UTC calendar month and by round in one pass.
///
/// Fixtures missing a parseable date, league metadata or teams are skipped.
/// Outcomes come from the winner flags alone, so an unplayed fixture counts
/// as a draw. Months are ordered by key, rounds by their number with the
/// label as tie-break.
pub fn aggregate_by_time(fixtures: Option<&[RawFixture]>) -> TimeAggregation {
    let Some(fixtures) = fixtures else {
        return TimeAggregation::default();
    };

    let mut by_month: BTreeMap<String, TimeBucket> = BTreeMap::new();
    let mut by_matchday: BTreeMap<String, TimeBucket> = BTreeMap::new();
    let mut skipped = 0usize;

    for fixture in fixtures {
        let date = fixture.date_str().and_then(parse_fixture_date);
        let (Some(date), Some(league), Some(_)) = (date, fixture.league.as_ref(), fixture.teams.as_ref())
        else {
            skipped += 1;
            continue;
        };

        let month = format!("{}-{:02}", date.year(), date.month());
        let round = league.round.clone().unwrap_or_else(|| UNKNOWN_ROUND.to_string());

        let goals = fixture.total_goals();
        let outcome = MatchOutcome::from_winner_flags(
            fixture.home().and_then(|s| s.winner),
            fixture.away().and_then(|s| s.winner),
        );

        by_month
            .entry(month.clone())
            .or_insert_with(|| TimeBucket::new(month))
            .record(goals, outcome);
        by_matchday
            .entry(round.clone())
            .or_insert_with(|| TimeBucket::new(round))
            .record(goals, outcome);
    }

    if skipped > 0 {
        debug!("Time aggregation skipped {} fixtures without date, league or teams", skipped);
    }

    let by_month: Vec<TimeBucket> = by_month.into_values().map(finish).collect();

    // BTreeMap yields labels in order; the stable sort keeps that as tie-break
    let mut by_matchday: Vec<TimeBucket> = by_matchday.into_values().map(finish).collect();
    by_matchday.sort_by_key(|b| round_number(&b.period));

    TimeAggregation {
        by_month,
        by_matchday,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    fn fixture(date: &str, round: Value, home: Option<u32>, away: Option<u32>, hw: Option<bool>, aw: Option<bool>) -> RawFixture {
        serde_json::from_value(json!({
            "fixture": {"date": date, "status": {"short": "FT"}},
            "league": {"round": round},
            "teams": {"home": {"id": 1, "winner": hw}, "away": {"id": 2, "winner": aw}},
            "goals": {"home": home, "away": away}
        }))
        .unwrap()
    }

    fn sample() -> Vec<RawFixture> {
        vec![
            fixture("2023-08-19T16:30:00+00:00", json!("Regular Season - 1"), Some(2), Some(1), Some(true), Some(false)),
            fixture("2023-08-20T18:45:00+00:00", json!("Regular Season - 1"), Some(0), Some(0), None, None),
            fixture("2023-09-02T18:45:00+00:00", json!("Regular Season - 2"), Some(1), Some(3), Some(false), Some(true)),
            fixture("2023-09-30T18:45:00+00:00", json!("Regular Season - 10"), Some(1), Some(0), Some(true), Some(false)),
            fixture("2023-10-01T12:30:00+00:00", json!(null), Some(2), Some(2), None, None),
        ]
    }

    #[test]
    fn test_month_buckets() {
        let f = sample();
        let agg = aggregate_by_time(Some(f.as_slice()));

        let months: Vec<&str> = agg.by_month.iter().map(|b| b.period.as_str()).collect();
        assert_eq!(months, vec!["2023-08", "2023-09", "2023-10"]);

        let aug = &agg.by_month[0];
        assert_eq!(aug.total_matches, 2);
        assert_eq!(aug.total_goals, 3);
        assert_eq!((aug.home_wins, aug.away_wins, aug.draws), (1, 0, 1));
        assert_eq!(aug.avg_goals_per_match, 1.5);
        assert_eq!(aug.home_win_percentage, 50.0);
        assert_eq!(aug.draw_percentage, 50.0);
        assert_eq!(aug.away_win_percentage, 0.0);
    }

    #[test]
    fn test_matchday_buckets_sorted_numerically() {
        let f = sample();
        let agg = aggregate_by_time(Some(f.as_slice()));

        let rounds: Vec<&str> = agg.by_matchday.iter().map(|b| b.period.as_str()).collect();
        assert_eq!(
            rounds,
            vec!["Unknown", "Regular Season - 1", "Regular Season - 2", "Regular Season - 10"]
        );
        assert_eq!(agg.by_matchday[1].total_matches, 2);
    }

    #[test]
    fn test_unplayed_fixture_counts_as_draw() {
        let f = vec![fixture("2024-05-26T18:45:00+00:00", json!("Regular Season - 38"), None, None, None, None)];
        let agg = aggregate_by_time(Some(f.as_slice()));

        let bucket = &agg.by_month[0];
        assert_eq!(bucket.total_matches, 1);
        assert_eq!(bucket.draws, 1);
        assert_eq!(bucket.total_goals, 0);
        assert_eq!(bucket.draw_percentage, 100.0);
    }

    #[test]
    fn test_skips_fixtures_without_date_or_league() {
        let mut f = sample();
        f.push(serde_json::from_value(json!({
            "fixture": {"status": {"short": "FT"}},
            "league": {"round": "Regular Season - 1"},
            "teams": {"home": {"winner": true}, "away": {"winner": false}}
        })).unwrap());
        f.push(serde_json::from_value(json!({
            "fixture": {"date": "2023-08-21T18:00:00+00:00"},
            "teams": {"home": {"winner": true}, "away": {"winner": false}}
        })).unwrap());

        let agg = aggregate_by_time(Some(f.as_slice()));
        let total: u32 = agg.by_month.iter().map(|b| b.total_matches).sum();

        assert_eq!(total, 5);
    }

    #[test]
    fn test_order_independent() {
        let f = sample();
        let mut reversed = f.clone();
        reversed.reverse();
        let mut rotated = f.clone();
        rotated.rotate_left(2);

        let expected = aggregate_by_time(Some(f.as_slice()));
        assert_eq!(aggregate_by_time(Some(reversed.as_slice())), expected);
        assert_eq!(aggregate_by_time(Some(rotated.as_slice())), expected);
    }

    #[test]
    fn test_zero_digit_rounds_tie_break_by_label() {
        let f = vec![
            fixture("2023-08-19T16:30:00+00:00", json!("Relegation Round"), Some(1), Some(0), Some(true), Some(false)),
            fixture("2023-08-19T16:30:00+00:00", json!("Final"), Some(1), Some(0), Some(true), Some(false)),
        ];
        let agg = aggregate_by_time(Some(f.as_slice()));
        let rounds: Vec<&str> = agg.by_matchday.iter().map(|b| b.period.as_str()).collect();

        assert_eq!(rounds, vec!["Final", "Relegation Round"]);
    }

    #[test]
    fn test_empty_and_absent() {
        assert_eq!(aggregate_by_time(None), TimeAggregation::default());
        assert_eq!(aggregate_by_time(Some(&[][..])), TimeAggregation::default());
    }

    #[test]
    fn test_round_number() {
        assert_eq!(round_number("Regular Season - 12"), 12);
        assert_eq!(round_number("Unknown"), 0);
        assert_eq!(round_number("Group A - 3"), 3);
        assert_eq!(round_number("99999999999999999999999"), 0);
    }
}
