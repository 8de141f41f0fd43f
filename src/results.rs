// This module defines the actual tournament results fed in from outside.
// Results only ever name game ids and winning team ids; who lost each game is recovered by running the results
// through the same propagation as a user's picks.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;

use crate::bracket::{Bracket, CHAMPIONSHIP_ID};
use crate::picks::{apply_picks, MaterializedBracket};

/// One finished game as reported by a results feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameResult {
    pub game_id: String,
    pub winner_id: String,
    #[serde(default)]
    pub winner_score: Option<u32>,
    #[serde(default)]
    pub loser_score: Option<u32>,
}

impl GameResult {
    pub fn new(game_id: &str, winner_id: &str) -> Self {
        GameResult {
            game_id: game_id.to_string(),
            winner_id: winner_id.to_string(),
            winner_score: None,
            loser_score: None,
        }
    }

    pub fn with_score(mut self, winner_score: u32, loser_score: u32) -> Self {
        self.winner_score = Some(winner_score);
        self.loser_score = Some(loser_score);
        self
    }

    /// Combined points scored, when both scores are known
    pub fn total_points(&self) -> Option<u32> {
        Some(self.winner_score? + self.loser_score?)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActualResults {
    /// gameId -> winning teamId for every resolved game
    #[serde(default)]
    pub winners: BTreeMap<String, String>,
    /// Combined score of the championship game, used only for tie-breaks
    #[serde(default)]
    pub championship_total: Option<u32>,
}

impl ActualResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, game_id: &str, winner_id: &str) {
        self.winners.insert(game_id.to_string(), winner_id.to_string());
    }

    pub fn is_resolved(&self, game_id: &str) -> bool {
        self.winners.contains_key(game_id)
    }

    pub fn from_games(games: &[GameResult]) -> Self {
        let mut results = ActualResults::new();
        for game in games {
            results.record(&game.game_id, &game.winner_id);
            if game.game_id == CHAMPIONSHIP_ID {
                results.championship_total = game.total_points();
            }
        }
        results
    }

    /// Load results from json (`ActualResults`) or csv (`game_id,winner_id,winner_score,loser_score`)
    pub fn load(path: &str) -> Result<Self> {
        let results = if path.ends_with(".csv") {
            let mut rdr = csv::Reader::from_path(path)
                .with_context(|| format!("failed to open results file {}", path))?;
            let games = rdr
                .deserialize()
                .collect::<std::result::Result<Vec<GameResult>, csv::Error>>()
                .with_context(|| format!("bad row in {}", path))?;
            Self::from_games(&games)
        } else {
            let content = fs::read_to_string(path)
                .with_context(|| format!("failed to read results file {}", path))?;
            serde_json::from_str(&content)
                .with_context(|| format!("failed to parse results file {}", path))?
        };
        log::info!("loaded {} results from {}", results.winners.len(), path);
        Ok(results)
    }

    pub fn save_json(&self, path: &str) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("failed to write results file {}", path))?;
        Ok(())
    }

    /// The real bracket as far as it has been played.
    /// Results for games outside the bracket (play-in games included), naming a team that could not have been
    /// playing, or whose teams the rest of the feed does not place are left out.
    pub fn materialize<'a>(&self, bracket: &'a Bracket) -> MaterializedBracket<'a> {
        let actual = apply_picks(bracket, &self.winners);
        let applied = actual.picked_games();
        if applied < self.winners.len() {
            log::debug!(
                "{} of {} results could not be placed on the bracket",
                self.winners.len() - applied,
                self.winners.len()
            );
        }
        actual
    }

    /// Ids of every team that has lost a resolved game
    pub fn eliminated(&self, bracket: &Bracket) -> HashSet<String> {
        self.materialize(bracket)
            .games()
            .iter()
            .filter_map(|g| g.loser().map(|t| t.id.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{self, team_id};
    use std::io::Write;

    #[test]
    fn test_from_games_picks_up_championship_total() {
        let games = vec![
            GameResult::new("East-r64-1", &team_id("East", 1)).with_score(80, 61),
            GameResult::new(CHAMPIONSHIP_ID, &team_id("East", 1)).with_score(75, 60),
        ];
        let results = ActualResults::from_games(&games);
        assert_eq!(results.winners.len(), 2);
        assert_eq!(results.championship_total, Some(135));
        assert!(results.is_resolved("East-r64-1"));
        assert!(!results.is_resolved("East-r64-2"));
    }

    #[test]
    fn test_eliminated_teams() {
        let bracket = testutil::bracket();
        let mut results = ActualResults::new();
        results.record("East-r64-1", &team_id("East", 16));
        results.record("East-r64-2", &team_id("East", 9));
        results.record("East-r32-1", &team_id("East", 9));
        let out = results.eliminated(&bracket);
        let expected: HashSet<String> = [team_id("East", 1), team_id("East", 8), team_id("East", 16)]
            .into_iter()
            .collect();
        assert_eq!(out, expected);
    }

    #[test]
    fn test_play_in_results_are_ignored() {
        let bracket = testutil::bracket();
        let mut results = ActualResults::new();
        results.record("first-four-1", &team_id("East", 16));
        results.record("East-r64-1", &team_id("East", 1));
        let actual = results.materialize(&bracket);
        assert_eq!(actual.picked_games(), 1);
    }

    #[test]
    fn test_load_csv_and_json() {
        let mut csv_file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(csv_file, "game_id,winner_id,winner_score,loser_score").unwrap();
        writeln!(csv_file, "East-r64-1,east-1,81,60").unwrap();
        writeln!(csv_file, "championship,east-1,70,68").unwrap();
        writeln!(csv_file, "West-r64-1,west-1,,").unwrap();
        csv_file.flush().unwrap();
        let from_csv = ActualResults::load(csv_file.path().to_str().unwrap()).unwrap();
        assert_eq!(from_csv.winners.len(), 3);
        assert_eq!(from_csv.championship_total, Some(138));

        let json_file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        let json_path = json_file.path().to_str().unwrap();
        from_csv.save_json(json_path).unwrap();
        assert_eq!(ActualResults::load(json_path).unwrap(), from_csv);
    }
}
