// Standings for a whole pool.
// Every entry is scored independently, so the scoring runs in parallel with rayon; ordering is total points,
// then tie-breaker closeness to the real championship score, then entry name.

use rayon::prelude::*;
use serde::Serialize;
use std::cmp::Ordering;

use crate::bracket::Bracket;
use crate::entry::BracketEntry;
use crate::results::ActualResults;
use crate::scoring::{potential_points, score_bracket, tie_break_distance, ScoringConfig};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Standing {
    /// 1-based; entries level on points and tie-breaker share a rank
    pub rank: usize,
    pub entry_id: String,
    pub entry_name: String,
    pub total: u32,
    pub potential: u32,
    pub correct_picks: usize,
    pub tie_break_distance: Option<u32>,
}

pub fn compute_standings(
    bracket: &Bracket,
    entries: &[BracketEntry],
    results: &ActualResults,
    config: &ScoringConfig,
) -> Vec<Standing> {
    let mut rows: Vec<Standing> = entries
        .par_iter()
        .map(|entry| {
            let report = score_bracket(bracket, &entry.picks, results, config);
            Standing {
                rank: 0,
                entry_id: entry.id.clone(),
                entry_name: entry.entry_name.clone(),
                total: report.total,
                potential: potential_points(bracket, &entry.picks, results, config),
                correct_picks: report.correct_picks,
                tie_break_distance: tie_break_distance(entry.tie_breaker, results.championship_total),
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.total
            .cmp(&a.total)
            .then_with(|| compare_distance(a.tie_break_distance, b.tie_break_distance))
            .then_with(|| a.entry_name.cmp(&b.entry_name))
            .then_with(|| a.entry_id.cmp(&b.entry_id))
    });

    for i in 0..rows.len() {
        rows[i].rank = if i > 0
            && rows[i].total == rows[i - 1].total
            && rows[i].tie_break_distance == rows[i - 1].tie_break_distance
        {
            rows[i - 1].rank
        } else {
            i + 1
        };
    }

    log::debug!("ranked {} entries", rows.len());
    rows
}

// closer guesses first; entries without a usable guess go last
fn compare_distance(a: Option<u32>, b: Option<u32>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
