//! Raw fixture → display fixture reshaping.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::models::{
    parse_fixture_date, FixtureGoals, FixtureRecord, FixtureStatus, FixtureTeam, FixtureVenue,
    LeagueContext, RawFixture, RawFixtureSide,
};

/// A raw record is missing a nested object the reshape depends on.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("Malformed fixture at index {index} (id {fixture_id:?}): missing `{missing}`")]
pub struct MalformedRecordError {
    /// Position in the input sequence
    pub index: usize,

    /// Fixture id when the record still carries one
    pub fixture_id: Option<u64>,

    /// Dotted path of the absent field, e.g. `teams.home`
    pub missing: &'static str,
}

/// Normalized fixtures plus the records that were rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizedFixtures {
    pub fixtures: Vec<FixtureRecord>,
    pub rejected: Vec<MalformedRecordError>,
}

fn side(raw: &RawFixtureSide) -> FixtureTeam {
    FixtureTeam {
        id: raw.id,
        name: raw.name.clone(),
        logo: raw.logo.clone(),
        winner: raw.winner,
    }
}

/// Reshape one raw fixture.
///
/// Fails when `fixture`, `teams`, `teams.home` or `teams.away` is absent.
pub fn normalize_fixture(index: usize, raw: &RawFixture) -> Result<FixtureRecord, MalformedRecordError> {
    let fixture_id = raw.fixture.as_ref().and_then(|f| f.id);
    let malformed = |missing| MalformedRecordError {
        index,
        fixture_id,
        missing,
    };

    let info = raw.fixture.as_ref().ok_or_else(|| malformed("fixture"))?;
    let teams = raw.teams.as_ref().ok_or_else(|| malformed("teams"))?;
    let home = teams.home.as_ref().ok_or_else(|| malformed("teams.home"))?;
    let away = teams.away.as_ref().ok_or_else(|| malformed("teams.away"))?;

    Ok(FixtureRecord {
        id: info.id,
        date: info.date.as_deref().and_then(parse_fixture_date),
        timestamp: info.timestamp,
        status: info
            .status
            .as_ref()
            .map(|s| FixtureStatus {
                long: s.long.clone(),
                short: s.short.clone(),
                elapsed: s.elapsed,
            })
            .unwrap_or_default(),
        home_team: side(home),
        away_team: side(away),
        goals: raw
            .goals
            .as_ref()
            .map(|g| FixtureGoals {
                home: g.home,
                away: g.away,
            })
            .unwrap_or_default(),
        venue: info.venue.as_ref().map(|v| FixtureVenue {
            id: v.id,
            name: v.name.clone(),
            city: v.city.clone(),
        }),
        league: raw.league.as_ref().map(|l| LeagueContext {
            id: l.id,
            name: l.name.clone(),
            country: l.country.clone(),
            logo: l.logo.clone(),
            season: l.season,
            round: l.round.clone(),
        }),
    })
}

/// Reshape a batch, keeping valid fixtures in input order and reporting the
/// malformed ones.
pub fn normalize_fixtures(fixtures: Option<&[RawFixture]>) -> NormalizedFixtures {
    let mut out = NormalizedFixtures::default();

    for (index, raw) in fixtures.unwrap_or(&[]).iter().enumerate() {
        match normalize_fixture(index, raw) {
            Ok(fixture) => out.fixtures.push(fixture),
            Err(e) => {
                warn!("{}", e);
                out.rejected.push(e);
            }
        }
    }

    out
}

/// Group fixtures by UTC calendar day, ascending. Undated fixtures are left out.
pub fn group_by_date(fixtures: &[FixtureRecord]) -> BTreeMap<NaiveDate, Vec<FixtureRecord>> {
    let mut groups: BTreeMap<NaiveDate, Vec<FixtureRecord>> = BTreeMap::new();
    for fixture in fixtures {
        if let Some(date) = fixture.date {
            groups
                .entry(date.date_naive())
                .or_default()
                .push(fixture.clone());
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawFixture {
        serde_json::from_value(value).unwrap()
    }

    fn complete(id: u64, date: &str) -> RawFixture {
        raw(json!({
            "fixture": {"id": id, "date": date, "timestamp": 1692462600,
                        "status": {"long": "Match Finished", "short": "FT", "elapsed": 90},
                        "venue": {"id": 1, "name": "Stadio", "city": "Roma"}},
            "league": {"id": 135, "name": "Serie A", "season": 2023, "round": "Regular Season - 1"},
            "teams": {"home": {"id": 1, "name": "A", "logo": "a.png", "winner": true},
                      "away": {"id": 2, "name": "B", "logo": "b.png", "winner": false}},
            "goals": {"home": 2, "away": 0}
        }))
    }

    #[test]
    fn test_normalize_complete_fixture() {
        let record = normalize_fixture(0, &complete(99, "2023-08-19T16:30:00+00:00")).unwrap();

        assert_eq!(record.id, Some(99));
        assert!(record.date.is_some());
        assert_eq!(record.status.short.as_deref(), Some("FT"));
        assert!(record.is_completed());
        assert_eq!(record.home_team.name.as_deref(), Some("A"));
        assert_eq!(record.away_team.winner, Some(false));
        assert_eq!(record.goals.home, Some(2));
        assert_eq!(record.venue.unwrap().city.as_deref(), Some("Roma"));
        assert_eq!(record.league.unwrap().round.as_deref(), Some("Regular Season - 1"));
    }

    #[test]
    fn test_missing_teams_is_malformed() {
        let err = normalize_fixture(3, &raw(json!({"fixture": {"id": 7}}))).unwrap_err();

        assert_eq!(err.index, 3);
        assert_eq!(err.fixture_id, Some(7));
        assert_eq!(err.missing, "teams");
    }

    #[test]
    fn test_missing_fixture_is_malformed() {
        let err = normalize_fixture(0, &raw(json!({"teams": {"home": {}, "away": {}}}))).unwrap_err();
        assert_eq!(err.missing, "fixture");
        assert_eq!(err.fixture_id, None);
    }

    #[test]
    fn test_missing_side_is_malformed() {
        let err = normalize_fixture(0, &raw(json!({"fixture": {}, "teams": {"home": {}}}))).unwrap_err();
        assert_eq!(err.missing, "teams.away");
    }

    #[test]
    fn test_batch_skips_and_reports() {
        let fixtures = vec![
            complete(1, "2023-08-19T16:30:00+00:00"),
            raw(json!({"goals": {"home": 1, "away": 1}})),
            complete(2, "2023-08-20T16:30:00+00:00"),
        ];

        let out = normalize_fixtures(Some(fixtures.as_slice()));

        assert_eq!(out.fixtures.len(), 2);
        assert_eq!(out.fixtures[0].id, Some(1));
        assert_eq!(out.fixtures[1].id, Some(2));
        assert_eq!(out.rejected.len(), 1);
        assert_eq!(out.rejected[0].index, 1);
    }

    #[test]
    fn test_absent_input_is_empty() {
        let out = normalize_fixtures(None);
        assert!(out.fixtures.is_empty());
        assert!(out.rejected.is_empty());
    }

    #[test]
    fn test_unparseable_date_kept_as_none() {
        let record = normalize_fixture(0, &complete(5, "someday")).unwrap();
        assert!(record.date.is_none());
    }

    #[test]
    fn test_group_by_date() {
        let fixtures: Vec<FixtureRecord> = [
            complete(1, "2023-08-20T18:00:00+00:00"),
            complete(2, "2023-08-19T16:30:00+00:00"),
            complete(3, "2023-08-20T20:45:00+00:00"),
            complete(4, "TBD"),
        ]
        .iter()
        .enumerate()
        .map(|(i, f)| normalize_fixture(i, f).unwrap())
        .collect();

        let groups = group_by_date(&fixtures);
        let keys: Vec<String> = groups.keys().map(|d| d.to_string()).collect();

        assert_eq!(keys, vec!["2023-08-19", "2023-08-20"]);
        let second: Vec<Option<u64>> = groups.values().nth(1).unwrap().iter().map(|f| f.id).collect();
        assert_eq!(second, vec![Some(1), Some(3)]);
    }
}
