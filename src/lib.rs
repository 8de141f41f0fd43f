// Tournament bracket engine for a 64-team single-elimination pool.
// Builds the bracket from a seeded field, projects picks onto it, keeps downstream picks consistent when one
// changes, and scores entries against actual results.

pub mod autofill;
pub mod bracket;
pub mod cascade;
pub mod config;
pub mod entry;
pub mod ingest;
pub mod picks;
pub mod results;
pub mod scoring;
pub mod standings;

#[cfg(test)]
mod testutil;

pub use bracket::{build_bracket, Bracket, Game, GameKey, RegionPosition, Round};
pub use cascade::on_pick_changed;
pub use ingest::{RcTeam, Team, TournamentData};
pub use picks::{apply_picks, MaterializedBracket, MaterializedGame, Picks};
pub use results::ActualResults;
pub use scoring::{score_bracket, ScoreReport, ScoringConfig};
