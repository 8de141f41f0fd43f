//Pick propagation: projects a picks map onto the bracket skeleton.
//Nothing here mutates its inputs; the whole view is rebuilt from the picks every time it is asked for.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::bracket::{Bracket, Game, RegionPosition, Round, Slot, GAMES_PER_REGION, TOTAL_GAMES};
use crate::ingest::RcTeam;

/// gameId -> teamId. The only mutable state a bracket entry carries.
pub type Picks = BTreeMap<String, String>;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct MaterializedGame {
    pub id: String,
    pub round: Round,
    pub region: Option<RegionPosition>,
    pub number: usize,
    pub team1: Slot,
    pub team2: Slot,
    pub winner: Slot,
}

impl MaterializedGame {
    /// Both slots hold a team, so the game can take a pick
    pub fn is_determined(&self) -> bool {
        self.team1.is_some() && self.team2.is_some()
    }

    pub fn slot_for(&self, team_id: &str) -> Option<&RcTeam> {
        [&self.team1, &self.team2]
            .into_iter()
            .flatten()
            .find(|t| t.id == team_id)
    }

    /// The team the winner beat, once a winner is set
    pub fn loser(&self) -> Option<&RcTeam> {
        let winner = self.winner.as_ref()?;
        [&self.team1, &self.team2]
            .into_iter()
            .flatten()
            .find(|t| t.id != winner.id)
    }

    pub fn undetermined_slots(&self) -> usize {
        [&self.team1, &self.team2].iter().filter(|s| s.is_none()).count()
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct MaterializedBracket<'a> {
    #[serde(skip)]
    skeleton: &'a Bracket,
    pub year: u16,
    games: Vec<MaterializedGame>,
}

/// Materialize a bracket from a set of picks.
/// Later-round slots are filled from the picks recorded for their feeder games, and a pick only becomes the
/// winner when it names one of the two teams currently in the game. Picks for unknown games are ignored.
pub fn apply_picks<'a>(bracket: &'a Bracket, picks: &Picks) -> MaterializedBracket<'a> {
    let mut games: Vec<MaterializedGame> = Vec::with_capacity(TOTAL_GAMES);

    for game in bracket.games() {
        let (team1, team2) = match &game.feeders {
            None => (game.team1.clone(), game.team2.clone()),
            Some([feeder1, feeder2]) => (
                feeder_winner(bracket, &games, feeder1),
                feeder_winner(bracket, &games, feeder2),
            ),
        };

        let winner = picks.get(&game.id).and_then(|pick| {
            [&team1, &team2]
                .into_iter()
                .flatten()
                .find(|t| &t.id == pick)
                .cloned()
        });

        games.push(materialize(game, team1, team2, winner));
    }

    MaterializedBracket {
        skeleton: bracket,
        year: bracket.year,
        games,
    }
}

fn materialize(game: &Game, team1: Slot, team2: Slot, winner: Slot) -> MaterializedGame {
    MaterializedGame {
        id: game.id.clone(),
        round: game.round,
        region: game.region,
        number: game.number,
        team1,
        team2,
        winner,
    }
}

// feeders always precede the games they feed, so the winner is already settled
fn feeder_winner(bracket: &Bracket, games: &[MaterializedGame], feeder_id: &str) -> Slot {
    bracket
        .position_of(feeder_id)
        .and_then(|i| games.get(i))
        .and_then(|g| g.winner.clone())
}

impl<'a> MaterializedBracket<'a> {
    pub fn skeleton(&self) -> &'a Bracket {
        self.skeleton
    }

    pub fn games(&self) -> &[MaterializedGame] {
        &self.games
    }

    pub fn game(&self, id: &str) -> Option<&MaterializedGame> {
        self.skeleton.position_of(id).map(|i| &self.games[i])
    }

    pub fn winner_of(&self, id: &str) -> Option<&RcTeam> {
        self.game(id).and_then(|g| g.winner.as_ref())
    }

    pub fn region_games(&self, position: RegionPosition) -> &[MaterializedGame] {
        let start = position.index() * GAMES_PER_REGION;
        &self.games[start..start + GAMES_PER_REGION]
    }

    pub fn final_four(&self) -> &[MaterializedGame] {
        let start = 4 * GAMES_PER_REGION;
        &self.games[start..start + 2]
    }

    pub fn championship(&self) -> &MaterializedGame {
        &self.games[TOTAL_GAMES - 1]
    }

    pub fn champion(&self) -> Option<&RcTeam> {
        self.championship().winner.as_ref()
    }

    pub fn undetermined_slots(&self) -> usize {
        self.games.iter().map(|g| g.undetermined_slots()).sum()
    }

    /// Every game has a winner
    pub fn is_complete(&self) -> bool {
        self.games.iter().all(|g| g.winner.is_some())
    }

    pub fn picked_games(&self) -> usize {
        self.games.iter().filter(|g| g.winner.is_some()).count()
    }

    /// The picks that actually took effect: stale or unknown entries are left out
    pub fn effective_picks(&self) -> Picks {
        self.games
            .iter()
            .filter_map(|g| g.winner.as_ref().map(|w| (g.id.clone(), w.id.clone())))
            .collect()
    }
}

/// Drop every pick that does not survive propagation: unknown game ids, and teams that are no longer
/// reachable in the game they were picked for. One pass is enough since games are walked feeders first.
pub fn prune_orphans(bracket: &Bracket, picks: &Picks) -> Picks {
    let pruned = apply_picks(bracket, picks).effective_picks();
    if pruned.len() != picks.len() {
        log::debug!("pruned {} orphaned picks", picks.len() - pruned.len());
    }
    pruned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{self, team_id};

    fn pick(picks: &mut Picks, game: &str, team: &str) {
        picks.insert(game.to_string(), team.to_string());
    }

    #[test]
    fn test_no_picks_only_fills_round_of_64() {
        let bracket = testutil::bracket();
        let view = apply_picks(&bracket, &Picks::new());
        for game in view.games() {
            assert!(game.winner.is_none());
            if game.round == Round::R64 {
                assert!(game.is_determined());
            } else {
                assert_eq!(game.undetermined_slots(), 2);
            }
        }
        assert_eq!(view.undetermined_slots(), 31 * 2);
        assert!(view.champion().is_none());
    }

    #[test]
    fn test_picks_advance_into_next_round() {
        let bracket = testutil::bracket();
        let mut picks = Picks::new();
        pick(&mut picks, "East-r64-1", &team_id("East", 1));
        pick(&mut picks, "East-r64-2", &team_id("East", 9));

        let view = apply_picks(&bracket, &picks);
        let r32 = view.game("East-r32-1").unwrap();
        assert_eq!(r32.team1.as_ref().unwrap().name, "Alpha");
        assert_eq!(r32.team2.as_ref().unwrap().seed, 9);
        assert!(r32.winner.is_none());

        // the other feeder pair has not been picked yet
        let r32_2 = view.game("East-r32-2").unwrap();
        assert!(r32_2.team1.is_none() && r32_2.team2.is_none());
    }

    #[test]
    fn test_partial_feeders_leave_one_slot_open() {
        let bracket = testutil::bracket();
        let mut picks = Picks::new();
        pick(&mut picks, "South-r64-8", &team_id("South", 15));
        let view = apply_picks(&bracket, &picks);
        let r32 = view.game("South-r32-4").unwrap();
        assert!(r32.team1.is_none());
        assert_eq!(r32.team2.as_ref().unwrap().seed, 15);
        assert!(!r32.is_determined());
    }

    #[test]
    fn test_stale_pick_is_treated_as_unset() {
        let bracket = testutil::bracket();
        let mut picks = Picks::new();
        pick(&mut picks, "East-r64-1", &team_id("East", 16));
        pick(&mut picks, "East-r64-2", &team_id("East", 8));
        // Alpha was knocked out in this bracket, so this pick has nothing to land on
        pick(&mut picks, "East-r32-1", &team_id("East", 1));

        let view = apply_picks(&bracket, &picks);
        let r32 = view.game("East-r32-1").unwrap();
        assert_eq!(r32.team1.as_ref().unwrap().name, "Omega");
        assert!(r32.winner.is_none());
        assert!(!view.effective_picks().contains_key("East-r32-1"));
    }

    #[test]
    fn test_unknown_game_ids_are_ignored() {
        let bracket = testutil::bracket();
        let mut picks = Picks::new();
        pick(&mut picks, "East-first-four-1", &team_id("East", 16));
        pick(&mut picks, "nonsense", "nobody");
        pick(&mut picks, "East-r64-1", &team_id("East", 1));

        let view = apply_picks(&bracket, &picks);
        assert_eq!(view.picked_games(), 1);
        assert_eq!(prune_orphans(&bracket, &picks).len(), 1);
    }

    #[test]
    fn test_final_four_and_championship_fill_from_regional_winners() {
        let bracket = testutil::bracket();
        let picks = testutil::complete_picks(&bracket, |s1, s2| s1 <= s2);
        let view = apply_picks(&bracket, &picks);

        let ff1 = &view.final_four()[0];
        assert_eq!(ff1.team1.as_ref().unwrap().id, team_id("East", 1));
        assert_eq!(ff1.team2.as_ref().unwrap().id, team_id("West", 1));
        let ff2 = &view.final_four()[1];
        assert_eq!(ff2.team1.as_ref().unwrap().id, team_id("South", 1));
        assert_eq!(ff2.team2.as_ref().unwrap().id, team_id("Midwest", 1));

        assert_eq!(view.champion().unwrap().name, "Alpha");
    }

    #[test]
    fn test_complete_bracket_has_one_champion_and_no_open_slots() {
        let bracket = testutil::bracket();
        // underdogs everywhere, just to walk a different path
        let picks = testutil::complete_picks(&bracket, |s1, s2| s1 > s2);
        let view = apply_picks(&bracket, &picks);
        assert!(view.is_complete());
        assert_eq!(view.undetermined_slots(), 0);
        assert_eq!(view.picked_games(), 63);
        assert!(view.champion().is_some());
        assert_eq!(view.effective_picks(), picks);
    }

    #[test]
    fn test_apply_picks_is_deterministic() {
        let bracket = testutil::bracket();
        let picks = testutil::complete_picks(&bracket, |s1, s2| (s1 + s2) % 2 == 0);
        let first = apply_picks(&bracket, &picks);
        let rebuilt = testutil::bracket();
        let second = apply_picks(&rebuilt, &picks);
        assert_eq!(first.games(), second.games());
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_prune_orphans_cascades_through_rounds() {
        let bracket = testutil::bracket();
        let chalk = testutil::complete_picks(&bracket, |s1, s2| s1 <= s2);
        let mut picks = chalk.clone();
        // flip the first game underneath an existing path for Alpha
        pick(&mut picks, "East-r64-1", &team_id("East", 16));

        let pruned = prune_orphans(&bracket, &picks);
        for id in ["East-r32-1", "East-s16-1", "East-e8-1", "final-four-1", "championship"] {
            assert!(!pruned.contains_key(id), "{} should have been pruned", id);
        }
        assert_eq!(pruned.get("East-r64-1"), Some(&team_id("East", 16)));
        assert_eq!(pruned.get("final-four-2"), chalk.get("final-four-2"));
        assert_eq!(pruned.len(), chalk.len() - 5);
    }
}
