//! Joins teams, standings and fixtures into one row per team.

use tracing::{debug, warn};

use crate::models::{
    RawFixture, RawStanding, RawStandingsResponse, RawTeam, TeamRecord, Venue,
};

use super::percentage;

/// Win/draw/loss counts a team earned in completed fixtures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixtureTally {
    pub completed: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
}

impl FixtureTally {
    /// Tally a team's completed fixtures (status FT or AET).
    ///
    /// A draw needs both winner flags to be null; a fixture where both flags
    /// are `false` is neither a win nor a draw and lands in losses.
    pub fn for_team(team_id: u64, fixtures: &[RawFixture]) -> Self {
        let mut tally = FixtureTally::default();

        for fixture in fixtures.iter().filter(|f| f.involves(team_id)) {
            let completed = fixture
                .status_short()
                .is_some_and(crate::models::is_completed_status);
            if !completed {
                continue;
            }
            tally.completed += 1;

            let home = fixture.home();
            let away = fixture.away();
            let home_winner = home.and_then(|s| s.winner);
            let away_winner = away.and_then(|s| s.winner);
            let is_home = home.and_then(|s| s.id) == Some(team_id);

            let won = if is_home {
                home_winner == Some(true)
            } else {
                away_winner == Some(true)
            };

            if won {
                tally.wins += 1;
            } else if home_winner.is_none() && away_winner.is_none() {
                tally.draws += 1;
            }
        }

        tally.losses = tally.completed - tally.wins - tally.draws;
        tally
    }

    /// Wins as a share of completed fixtures (0.0 when none are completed).
    pub fn win_percentage(&self) -> f64 {
        percentage(self.wins as f64, self.completed as f64)
    }
}

/// The first table group of the first league, or nothing.
fn league_table(standings: &[RawStandingsResponse]) -> &[RawStanding] {
    standings
        .first()
        .and_then(|r| r.league.as_ref())
        .and_then(|l| l.standings.as_ref())
        .and_then(|groups| groups.first())
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Merge raw teams, standings and fixtures into `TeamRecord`s.
///
/// Any absent input yields an empty result. Standings values win whenever
/// the row carries them; otherwise wins/draws/losses/played fall back to the
/// team's completed fixtures and the remaining totals default to zero.
pub fn join_team_data(
    teams: Option<&[RawTeam]>,
    standings: Option<&[RawStandingsResponse]>,
    fixtures: Option<&[RawFixture]>,
) -> Vec<TeamRecord> {
    let (Some(teams), Some(standings), Some(fixtures)) = (teams, standings, fixtures) else {
        debug!("Join skipped: missing teams, standings or fixtures");
        return Vec::new();
    };

    let table = league_table(standings);

    teams
        .iter()
        .filter_map(|raw| {
            let info = raw.team.as_ref()?;
            let Some(id) = info.id else {
                warn!("Skipping team without id: {:?}", info.name);
                return None;
            };

            let standing = table
                .iter()
                .find(|s| s.team.as_ref().and_then(|t| t.id) == Some(id));
            let record = standing.and_then(|s| s.all.as_ref());
            let goals = record.and_then(|r| r.goals.as_ref());

            let tally = FixtureTally::for_team(id, fixtures);

            Some(TeamRecord {
                id,
                name: info.name.clone().unwrap_or_default(),
                logo: info.logo.clone(),
                country: info.country.clone(),
                founded: info.founded,
                venue: raw.venue.as_ref().map(|v| Venue {
                    id: v.id,
                    name: v.name.clone(),
                    address: v.address.clone(),
                    city: v.city.clone(),
                    capacity: v.capacity,
                    surface: v.surface.clone(),
                    image: v.image.clone(),
                }),
                position: standing.and_then(|s| s.rank).unwrap_or(0),
                points: standing.and_then(|s| s.points).unwrap_or(0),
                wins: record.and_then(|r| r.win).unwrap_or(tally.wins),
                draws: record.and_then(|r| r.draw).unwrap_or(tally.draws),
                losses: record.and_then(|r| r.lose).unwrap_or(tally.losses),
                goals_for: goals.and_then(|g| g.goals_for).unwrap_or(0),
                goals_against: goals.and_then(|g| g.against).unwrap_or(0),
                goal_difference: standing.and_then(|s| s.goals_diff).unwrap_or(0),
                form: standing.and_then(|s| s.form.clone()).unwrap_or_default(),
                played: record.and_then(|r| r.played).unwrap_or(tally.completed),
                fixture_win_percentage: tally.win_percentage(),
            })
        })
        .collect()
}
