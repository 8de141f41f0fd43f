//Scores a picks map against the actual results.
//A correct pick earns the round's points; a correct pick on a team seeded worse than the team it actually beat
//earns the underdog bonus on top, in every round. The tie-breaker never adds points, it only orders equal totals.

use serde::{Deserialize, Serialize};

use crate::bracket::{Bracket, Round};
use crate::picks::{apply_picks, Picks};
use crate::results::ActualResults;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Points per correct pick, indexed by `Round::index`
    pub round_points: [u32; 6],
    pub underdog_bonus: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        ScoringConfig {
            round_points: [1, 2, 4, 8, 12, 16],
            underdog_bonus: 2,
        }
    }
}

impl ScoringConfig {
    pub fn points_for(&self, round: Round) -> u32 {
        self.round_points[round.index()]
    }

    /// Best possible score for a perfect bracket, bonuses aside
    pub fn max_base_points(&self) -> u32 {
        Round::ALL
            .iter()
            .map(|round| {
                let games = match round {
                    Round::FinalFour => 2,
                    Round::Championship => 1,
                    _ => round.games_per_region() * 4,
                };
                self.points_for(*round) * games as u32
            })
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameScore {
    pub game_id: String,
    pub round: Round,
    pub picked: String,
    pub actual: String,
    pub correct: bool,
    pub base_points: u32,
    pub bonus_points: u32,
}

impl GameScore {
    pub fn points(&self) -> u32 {
        self.base_points + self.bonus_points
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScoreReport {
    pub total: u32,
    pub correct_picks: usize,
    pub breakdown: Vec<GameScore>,
}

impl ScoreReport {
    /// Points earned per round, indexed by `Round::index`
    pub fn round_totals(&self) -> [u32; 6] {
        let mut totals = [0u32; 6];
        for game in &self.breakdown {
            totals[game.round.index()] += game.points();
        }
        totals
    }

    pub fn bonus_total(&self) -> u32 {
        self.breakdown.iter().map(|g| g.bonus_points).sum()
    }
}

/// Score `picks` against every resolved game in `results`.
/// Only games with both a pick and an actual winner appear in the breakdown. A result counts on its own,
/// whether or not the rest of the feed places its teams; the underdog bonus needs the beaten team, so it is
/// skipped when the feed cannot tell who that was.
pub fn score_bracket(
    bracket: &Bracket,
    picks: &Picks,
    results: &ActualResults,
    config: &ScoringConfig,
) -> ScoreReport {
    let actual = results.materialize(bracket);
    let mut report = ScoreReport::default();

    for game in bracket.games() {
        let winner_id = match results.winners.get(&game.id) {
            Some(winner_id) => winner_id,
            None => continue,
        };
        let picked = match picks.get(&game.id) {
            Some(picked) => picked,
            None => continue,
        };

        let correct = picked == winner_id;
        let base_points = if correct { config.points_for(game.round) } else { 0 };
        let bonus_points = match actual.game(&game.id) {
            Some(played) if correct => match (&played.winner, played.loser()) {
                (Some(winner), Some(loser)) if winner.seed > loser.seed => config.underdog_bonus,
                _ => 0,
            },
            _ => 0,
        };

        if correct {
            report.correct_picks += 1;
        }
        report.total += base_points + bonus_points;
        report.breakdown.push(GameScore {
            game_id: game.id.clone(),
            round: game.round,
            picked: picked.clone(),
            actual: winner_id.clone(),
            correct,
            base_points,
            bonus_points,
        });
    }

    report
}

/// Highest total the bracket can still reach: points already earned plus the round points of every pick for
/// a game without a result whose team has not been knocked out.
pub fn potential_points(
    bracket: &Bracket,
    picks: &Picks,
    results: &ActualResults,
    config: &ScoringConfig,
) -> u32 {
    let earned = score_bracket(bracket, picks, results, config).total;
    let eliminated = results.eliminated(bracket);

    let remaining: u32 = apply_picks(bracket, picks)
        .games()
        .iter()
        .filter(|g| !results.is_resolved(&g.id))
        .filter_map(|g| g.winner.as_ref().map(|w| (g.round, w)))
        .filter(|(_, team)| !eliminated.contains(&team.id))
        .map(|(round, _)| config.points_for(round))
        .sum();

    earned + remaining
}

/// How far a tie-breaker guess landed from the real combined championship score
pub fn tie_break_distance(guess: Option<u32>, actual_total: Option<u32>) -> Option<u32> {
    Some(guess?.abs_diff(actual_total?))
}
