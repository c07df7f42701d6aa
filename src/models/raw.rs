//! Raw upstream payload shapes.
//!
//! These mirror the API-Sports v3 football responses. Every nested field is
//! optional: the upstream omits or nulls fields freely, and the pipeline
//! decides per field what an absent value means instead of letting it
//! collapse to zero on the way in.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// The `{ "response": [...] }` envelope every endpoint returns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub get: Option<String>,

    #[serde(default)]
    pub results: Option<u32>,

    #[serde(default)]
    pub response: Option<Vec<T>>,
}

impl<T> ApiEnvelope<T>
where
    T: for<'de> Deserialize<'de>,
{
    /// Decode the `response` list out of a raw payload.
    ///
    /// Returns `None` when the payload does not have the envelope shape, so
    /// callers can treat it as absent input. Records are decoded one at a
    /// time: a record that does not match `T` is logged and dropped, and the
    /// rest of the list is kept.
    pub fn records_from_value(value: &serde_json::Value) -> Option<Vec<T>> {
        let Some(items) = value.get("response").and_then(|r| r.as_array()) else {
            warn!("Payload does not match the response envelope");
            return None;
        };

        let mut records = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            match T::deserialize(item) {
                Ok(record) => records.push(record),
                Err(e) => warn!("Skipping response record {}: {}", index, e),
            }
        }
        Some(records)
    }
}

// ── Teams ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTeam {
    pub team: Option<RawTeamInfo>,
    pub venue: Option<RawVenue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTeamInfo {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub code: Option<String>,
    pub country: Option<String>,
    pub founded: Option<i32>,
    pub national: Option<bool>,
    pub logo: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawVenue {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub capacity: Option<u32>,
    pub surface: Option<String>,
    pub image: Option<String>,
}

// ── Standings ───────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawStandingsResponse {
    pub league: Option<RawStandingsLeague>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawStandingsLeague {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub season: Option<i32>,
    /// Groups of table rows; regular leagues have a single group.
    pub standings: Option<Vec<Vec<RawStanding>>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawStanding {
    pub rank: Option<u32>,
    pub team: Option<RawStandingTeam>,
    pub points: Option<u32>,
    #[serde(rename = "goalsDiff")]
    pub goals_diff: Option<i32>,
    pub form: Option<String>,
    pub all: Option<RawRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawStandingTeam {
    pub id: Option<u64>,
    pub name: Option<String>,
}

/// Aggregate season record inside a standings row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub played: Option<u32>,
    pub win: Option<u32>,
    pub draw: Option<u32>,
    pub lose: Option<u32>,
    pub goals: Option<RawGoalTotals>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawGoalTotals {
    #[serde(rename = "for")]
    pub goals_for: Option<u32>,
    pub against: Option<u32>,
}

// ── Fixtures ────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFixture {
    pub fixture: Option<RawFixtureInfo>,
    pub league: Option<RawFixtureLeague>,
    pub teams: Option<RawFixtureTeams>,
    pub goals: Option<RawScore>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFixtureInfo {
    pub id: Option<u64>,
    pub referee: Option<String>,
    pub date: Option<String>,
    pub timestamp: Option<i64>,
    pub venue: Option<RawFixtureVenue>,
    pub status: Option<RawStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFixtureVenue {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub city: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawStatus {
    pub long: Option<String>,
    pub short: Option<String>,
    pub elapsed: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFixtureLeague {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub country: Option<String>,
    pub logo: Option<String>,
    pub season: Option<i32>,
    pub round: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFixtureTeams {
    pub home: Option<RawFixtureSide>,
    pub away: Option<RawFixtureSide>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFixtureSide {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub logo: Option<String>,
    /// `true`/`false` once decided, `null` for draws and unplayed matches.
    pub winner: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawScore {
    pub home: Option<u32>,
    pub away: Option<u32>,
}

impl RawScore {
    /// Combined goals, counting a missing side as zero.
    pub fn total(&self) -> u32 {
        self.home.unwrap_or(0).saturating_add(self.away.unwrap_or(0))
    }
}

impl RawFixture {
    /// Short status code, e.g. `"FT"` or `"NS"`.
    pub fn status_short(&self) -> Option<&str> {
        self.fixture
            .as_ref()
            .and_then(|f| f.status.as_ref())
            .and_then(|s| s.short.as_deref())
    }

    pub fn date_str(&self) -> Option<&str> {
        self.fixture.as_ref().and_then(|f| f.date.as_deref())
    }

    pub fn home(&self) -> Option<&RawFixtureSide> {
        self.teams.as_ref().and_then(|t| t.home.as_ref())
    }

    pub fn away(&self) -> Option<&RawFixtureSide> {
        self.teams.as_ref().and_then(|t| t.away.as_ref())
    }

    pub fn total_goals(&self) -> u32 {
        self.goals.as_ref().map(RawScore::total).unwrap_or(0)
    }

    /// Whether this fixture involves the given team on either side.
    pub fn involves(&self, team_id: u64) -> bool {
        self.home().and_then(|s| s.id) == Some(team_id)
            || self.away().and_then(|s| s.id) == Some(team_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fixture_deserialization() {
        let value = json!({
            "fixture": {
                "id": 1035037,
                "date": "2023-08-19T16:30:00+00:00",
                "timestamp": 1692462600,
                "status": {"long": "Match Finished", "short": "FT", "elapsed": 90},
                "venue": {"id": 910, "name": "Stadio Olimpico", "city": "Roma"}
            },
            "league": {"id": 135, "name": "Serie A", "season": 2023, "round": "Regular Season - 1"},
            "teams": {
                "home": {"id": 487, "name": "Lazio", "logo": "l.png", "winner": false},
                "away": {"id": 488, "name": "Sassuolo", "logo": "s.png", "winner": true}
            },
            "goals": {"home": 1, "away": 2}
        });

        let fixture: RawFixture = serde_json::from_value(value).unwrap();

        assert_eq!(fixture.status_short(), Some("FT"));
        assert_eq!(fixture.total_goals(), 3);
        assert_eq!(fixture.away().and_then(|s| s.winner), Some(true));
        assert!(fixture.involves(487));
        assert!(!fixture.involves(1));
    }

    #[test]
    fn test_null_winner_and_goals() {
        let value = json!({
            "teams": {
                "home": {"id": 1, "winner": null},
                "away": {"id": 2, "winner": null}
            },
            "goals": {"home": null, "away": null}
        });

        let fixture: RawFixture = serde_json::from_value(value).unwrap();

        assert_eq!(fixture.home().and_then(|s| s.winner), None);
        assert_eq!(fixture.total_goals(), 0);
        assert!(fixture.fixture.is_none());
    }

    #[test]
    fn test_standings_deserialization() {
        let value = json!({
            "league": {
                "id": 135,
                "standings": [[{
                    "rank": 1,
                    "team": {"id": 505, "name": "Inter"},
                    "points": 94,
                    "goalsDiff": 67,
                    "form": "WWDWW",
                    "all": {"played": 38, "win": 29, "draw": 7, "lose": 2,
                            "goals": {"for": 89, "against": 22}}
                }]]
            }
        });

        let response: RawStandingsResponse = serde_json::from_value(value).unwrap();
        let row = &response.league.unwrap().standings.unwrap()[0][0];

        assert_eq!(row.goals_diff, Some(67));
        assert_eq!(
            row.all.as_ref().and_then(|a| a.goals.as_ref()).and_then(|g| g.goals_for),
            Some(89)
        );
    }

    #[test]
    fn test_envelope_records() {
        let payload = json!({"get": "teams", "results": 1, "response": [{"team": {"id": 1}}]});
        let teams = ApiEnvelope::<RawTeam>::records_from_value(&payload).unwrap();
        assert_eq!(teams.len(), 1);

        let not_envelope = json!([1, 2, 3]);
        assert!(ApiEnvelope::<RawTeam>::records_from_value(&not_envelope).is_none());

        let missing = json!({"get": "teams"});
        assert!(ApiEnvelope::<RawTeam>::records_from_value(&missing).is_none());
    }

    #[test]
    fn test_envelope_drops_only_bad_records() {
        let payload = json!({"get": "fixtures", "response": [
            {"fixture": {"id": 1}, "goals": {"home": 1, "away": 0}},
            {"fixture": {"id": 2}, "teams": "oops"},
            {"fixture": {"id": 3}, "goals": {"home": -1, "away": 0}},
            {"fixture": {"id": 4}, "goals": {"home": 2, "away": 2}}
        ]});

        let fixtures = ApiEnvelope::<RawFixture>::records_from_value(&payload).unwrap();
        let ids: Vec<Option<u64>> = fixtures
            .iter()
            .map(|f| f.fixture.as_ref().and_then(|i| i.id))
            .collect();
        assert_eq!(ids, vec![Some(1), Some(4)]);
    }

    #[test]
    fn test_score_total_saturates() {
        let score = RawScore {
            home: Some(u32::MAX),
            away: Some(3),
        };
        assert_eq!(score.total(), u32::MAX);
    }
}
