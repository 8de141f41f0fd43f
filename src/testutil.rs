// Shared fixtures for the unit tests.
// Team ids are "<region>-<seed>" in lowercase; East's 1 and 16 seeds are named Alpha and Omega.

use std::sync::Arc;

use crate::bracket::{build_bracket, Bracket, RegionPosition};
use crate::ingest::{RegionTeams, Team, TournamentData};
use crate::picks::{apply_picks, Picks};

pub(crate) const REGIONS: [(RegionPosition, &str); 4] = [
    (RegionPosition::TopLeft, "East"),
    (RegionPosition::BottomLeft, "West"),
    (RegionPosition::TopRight, "South"),
    (RegionPosition::BottomRight, "Midwest"),
];

pub(crate) fn team_id(region: &str, seed: u8) -> String {
    format!("{}-{}", region.to_lowercase(), seed)
}

pub(crate) fn field() -> TournamentData {
    let regions = REGIONS
        .iter()
        .map(|(position, name)| RegionTeams {
            position: *position,
            name: name.to_string(),
            teams: (1..=16u8)
                .map(|seed| {
                    let team_name = match (*name, seed) {
                        ("East", 1) => "Alpha".to_string(),
                        ("East", 16) => "Omega".to_string(),
                        _ => format!("{} {}", name, seed),
                    };
                    Arc::new(Team::new(&team_id(name, seed), seed, name, &team_name))
                })
                .collect(),
        })
        .collect();
    TournamentData::new(2024, regions)
}

pub(crate) fn bracket() -> Bracket {
    build_bracket(&field())
}

/// Fill every game in canonical order, choosing the winner with `choose(team1_seed, team2_seed) -> true for team1`.
pub(crate) fn complete_picks(bracket: &Bracket, choose: impl Fn(u8, u8) -> bool) -> Picks {
    let mut picks = Picks::new();
    for game in bracket.games() {
        let view = apply_picks(bracket, &picks);
        let current = view.game(&game.id).unwrap();
        let (t1, t2) = match (&current.team1, &current.team2) {
            (Some(t1), Some(t2)) => (t1, t2),
            _ => panic!("slot for {} not determined", game.id),
        };
        let winner = if choose(t1.seed, t2.seed) { t1 } else { t2 };
        picks.insert(game.id.clone(), winner.id.clone());
    }
    picks
}
