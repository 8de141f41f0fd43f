//Cascade invalidation for pick edits.
//A team keeps the same id as it advances, so every downstream pick that depended on a changed pick still names
//the old winner. Comparing each downstream game against that one id finds all of them in a single sweep.

use std::collections::BTreeSet;

use crate::bracket::{Bracket, Game, Round};
use crate::picks::{apply_picks, Picks};

/// Games a winner of `changed` could reach: the rest of its region, then the national games
fn downstream_games<'b>(bracket: &'b Bracket, changed: &Game) -> Vec<&'b Game> {
    match changed.round {
        Round::R64 | Round::R32 | Round::S16 | Round::E8 => {
            let regional = changed
                .region
                .map(|position| bracket.region_games(position))
                .unwrap_or(&[]);
            regional
                .iter()
                .filter(|g| g.round > changed.round)
                .chain(bracket.final_four().iter())
                .chain(std::iter::once(bracket.championship()))
                .collect()
        }
        Round::FinalFour => vec![bracket.championship()],
        Round::Championship => Vec::new(),
    }
}

/// Ids of the downstream picks that still name `previous_winner_id` and must be dropped
/// once the pick for `changed_game_id` changes. Unknown game ids produce an empty set.
pub fn cascade_clear_set(
    bracket: &Bracket,
    changed_game_id: &str,
    previous_winner_id: &str,
    picks: &Picks,
) -> BTreeSet<String> {
    let changed = match bracket.game(changed_game_id) {
        Some(game) => game,
        None => return BTreeSet::new(),
    };

    downstream_games(bracket, changed)
        .into_iter()
        .filter(|g| picks.get(&g.id).map(String::as_str) == Some(previous_winner_id))
        .map(|g| g.id.clone())
        .collect()
}

/// Record `new_team_id` as the winner of `game_id` and return the updated picks.
///
/// The clear-set is computed from the old picks before the new pick is merged in. The edit is a no-op when the
/// game is unknown, when either slot is still undetermined, or when the team is not in the game.
pub fn on_pick_changed(bracket: &Bracket, game_id: &str, new_team_id: &str, picks: &Picks) -> Picks {
    let view = apply_picks(bracket, picks);
    let game = match view.game(game_id) {
        Some(game) => game,
        None => {
            log::debug!("ignoring pick for unknown game {}", game_id);
            return picks.clone();
        }
    };
    if !game.is_determined() {
        log::debug!("ignoring pick for {}: matchup not set", game_id);
        return picks.clone();
    }
    if game.slot_for(new_team_id).is_none() {
        log::debug!("ignoring pick for {}: {} is not playing", game_id, new_team_id);
        return picks.clone();
    }

    let previous = picks.get(game_id);
    if previous.map(String::as_str) == Some(new_team_id) {
        return picks.clone();
    }

    let mut updated = picks.clone();
    if let Some(previous) = previous {
        let cleared = cascade_clear_set(bracket, game_id, previous, picks);
        if !cleared.is_empty() {
            log::debug!("{} -> {} clears {:?}", game_id, new_team_id, cleared);
        }
        for id in &cleared {
            updated.remove(id);
        }
    }
    updated.insert(game_id.to_string(), new_team_id.to_string());
    updated
}

/// Remove the pick for `game_id` along with every downstream pick that depended on it
pub fn clear_pick(bracket: &Bracket, game_id: &str, picks: &Picks) -> Picks {
    let previous = match picks.get(game_id) {
        Some(previous) => previous,
        None => return picks.clone(),
    };
    let mut updated = picks.clone();
    for id in cascade_clear_set(bracket, game_id, previous, picks) {
        updated.remove(&id);
    }
    updated.remove(game_id);
    updated
}

/// Start over with an empty bracket
pub fn reset() -> Picks {
    Picks::new()
}
