// Fills the open games of a bracket, either by always taking the better seed or by a seed-weighted coin flip.
// Every pick goes through on_pick_changed, so autofilled brackets obey the same rules as hand-made ones.

use rand::Rng;

use crate::bracket::Bracket;
use crate::cascade::on_pick_changed;
use crate::picks::{apply_picks, prune_orphans, Picks};

/// Probability that the team seeded `seed1` beats the team seeded `seed2`.
/// Each team gets weight 17 - seed, so a 1 seed beats a 16 seed 16 times in 17.
pub fn seed_win_probability(seed1: u8, seed2: u8) -> f64 {
    let weight1 = 17.0 - seed1.min(16) as f64;
    let weight2 = 17.0 - seed2.min(16) as f64;
    weight1 / (weight1 + weight2)
}

/// Complete every open game, keeping the picks already made.
/// `choose(team1_seed, team2_seed)` returns true when team1 should advance.
fn fill_with<F>(bracket: &Bracket, picks: &Picks, mut choose: F) -> Picks
where
    F: FnMut(u8, u8) -> bool,
{
    let mut picks = prune_orphans(bracket, picks);
    for game in bracket.games() {
        if picks.contains_key(&game.id) {
            continue;
        }
        let view = apply_picks(bracket, &picks);
        let winner_id = match view.game(&game.id) {
            Some(current) => match (&current.team1, &current.team2) {
                (Some(t1), Some(t2)) => {
                    if choose(t1.seed, t2.seed) {
                        t1.id.clone()
                    } else {
                        t2.id.clone()
                    }
                }
                _ => continue,
            },
            None => continue,
        };
        picks = on_pick_changed(bracket, &game.id, &winner_id, &picks);
    }
    picks
}

/// The better seed wins every open game; equal seeds go to team1
pub fn chalk(bracket: &Bracket, picks: &Picks) -> Picks {
    fill_with(bracket, picks, |seed1, seed2| seed1 <= seed2)
}

/// Fill every open game with a seed-weighted random winner
pub fn autofill<R: Rng>(bracket: &Bracket, picks: &Picks, rng: &mut R) -> Picks {
    let filled = fill_with(bracket, picks, |seed1, seed2| {
        rng.gen_bool(seed_win_probability(seed1, seed2))
    });
    log::debug!("autofill added {} picks", filled.len().saturating_sub(picks.len()));
    filled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{self, team_id};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_seed_win_probability() {
        assert!((seed_win_probability(1, 16) - 16.0 / 17.0).abs() < 1e-9);
        assert!((seed_win_probability(8, 9) - 9.0 / 17.0).abs() < 1e-9);
        assert!((seed_win_probability(4, 4) - 0.5).abs() < 1e-9);
        let p = seed_win_probability(3, 14);
        assert!((p + seed_win_probability(14, 3) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_chalk_completes_the_bracket() {
        let bracket = testutil::bracket();
        let picks = chalk(&bracket, &Picks::new());
        let view = apply_picks(&bracket, &picks);
        assert!(view.is_complete());
        assert_eq!(view.undetermined_slots(), 0);
        assert_eq!(view.champion().unwrap().name, "Alpha");
        for position in crate::bracket::RegionPosition::ALL {
            let e8 = &view.region_games(position)[14];
            assert_eq!(e8.winner.as_ref().unwrap().seed, 1);
        }
    }

    #[test]
    fn test_autofill_keeps_existing_picks() {
        let bracket = testutil::bracket();
        let mut picks = Picks::new();
        picks = on_pick_changed(&bracket, "East-r64-1", &team_id("East", 16), &picks);
        picks = on_pick_changed(&bracket, "West-r64-2", &team_id("West", 9), &picks);

        let mut rng = StdRng::seed_from_u64(7);
        let filled = autofill(&bracket, &picks, &mut rng);
        assert_eq!(filled.len(), 63);
        assert_eq!(filled.get("East-r64-1"), Some(&team_id("East", 16)));
        assert_eq!(filled.get("West-r64-2"), Some(&team_id("West", 9)));
        assert!(apply_picks(&bracket, &filled).is_complete());
    }

    #[test]
    fn test_autofill_is_reproducible_with_a_seeded_rng() {
        let bracket = testutil::bracket();
        let first = autofill(&bracket, &Picks::new(), &mut StdRng::seed_from_u64(42));
        let second = autofill(&bracket, &Picks::new(), &mut StdRng::seed_from_u64(42));
        assert_eq!(first, second);
    }

    #[test]
    fn test_random_brackets_are_always_complete_and_consistent() {
        let bracket = testutil::bracket();
        let mut rng = StdRng::seed_from_u64(2024);
        for _ in 0..25 {
            let picks = autofill(&bracket, &Picks::new(), &mut rng);
            let view = apply_picks(&bracket, &picks);
            assert!(view.is_complete());
            assert_eq!(view.undetermined_slots(), 0);
            assert_eq!(view.effective_picks(), picks);
        }
    }

    #[test]
    fn test_autofill_drops_orphans_before_filling() {
        let bracket = testutil::bracket();
        let mut picks = Picks::new();
        picks.insert("East-r32-1".to_string(), team_id("East", 1));
        picks.insert("bogus".to_string(), "nobody".to_string());
        let filled = chalk(&bracket, &picks);
        assert!(!filled.contains_key("bogus"));
        assert_eq!(filled.len(), 63);
    }
}
