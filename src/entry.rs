// A pool entry as it is persisted: picks, tie-breaker guess, entry name and status.
// The engine only sees the picks map; storage sits behind the EntryStore trait so nothing else knows how entries are kept.

use anyhow::{bail, ensure, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::bracket::Bracket;
use crate::cascade::{clear_pick, on_pick_changed, reset};
use crate::config::TieBreakerSettings;
use crate::picks::{apply_picks, prune_orphans, Picks};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    #[default]
    Draft,
    Submitted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketEntry {
    pub id: String,
    pub entry_name: String,
    #[serde(default)]
    pub picks: Picks,
    #[serde(default)]
    pub tie_breaker: Option<u32>,
    #[serde(default)]
    pub status: EntryStatus,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
}

impl BracketEntry {
    pub fn new(id: &str, entry_name: &str) -> Self {
        BracketEntry {
            id: id.to_string(),
            entry_name: entry_name.trim().to_string(),
            picks: Picks::new(),
            tie_breaker: None,
            status: EntryStatus::Draft,
            submitted_at: None,
        }
    }

    /// Apply one pick edit. Returns whether the picks changed; any change puts a submitted entry back in draft.
    pub fn set_pick(&mut self, bracket: &Bracket, game_id: &str, team_id: &str) -> bool {
        let updated = on_pick_changed(bracket, game_id, team_id, &self.picks);
        self.replace_picks(updated)
    }

    pub fn clear_pick(&mut self, bracket: &Bracket, game_id: &str) -> bool {
        let updated = clear_pick(bracket, game_id, &self.picks);
        self.replace_picks(updated)
    }

    pub fn reset(&mut self) -> bool {
        self.replace_picks(reset())
    }

    /// Drop stored picks that no longer fit the bracket, returning how many went.
    /// Pruning is an edit like any other, so a submitted entry goes back to draft.
    pub fn prune(&mut self, bracket: &Bracket) -> usize {
        let before = self.picks.len();
        let pruned = prune_orphans(bracket, &self.picks);
        if self.replace_picks(pruned) {
            log::warn!(
                "entry {} had {} pick(s) that no longer fit the bracket",
                self.id,
                before - self.picks.len()
            );
        }
        before - self.picks.len()
    }

    /// Swap in a whole new picks map, such as an autofilled one
    pub fn replace_picks(&mut self, updated: Picks) -> bool {
        if updated == self.picks {
            return false;
        }
        self.picks = updated;
        if self.status == EntryStatus::Submitted {
            log::info!("entry {} edited after submission, back to draft", self.id);
        }
        self.status = EntryStatus::Draft;
        self.submitted_at = None;
        true
    }

    /// Lock in a complete bracket with a tie-breaker guess
    pub fn submit(&mut self, bracket: &Bracket, tie_breaker: u32, settings: &TieBreakerSettings) -> Result<()> {
        validate_tie_breaker(tie_breaker, settings)?;
        let view = apply_picks(bracket, &self.picks);
        ensure!(
            view.is_complete(),
            "bracket is incomplete: {} of {} games picked",
            view.picked_games(),
            view.games().len()
        );
        self.tie_breaker = Some(tie_breaker);
        self.status = EntryStatus::Submitted;
        self.submitted_at = Some(Utc::now());
        log::info!("entry {} submitted", self.id);
        Ok(())
    }
}

pub fn validate_tie_breaker(value: u32, settings: &TieBreakerSettings) -> Result<()> {
    if !settings.contains(value) {
        bail!(
            "tie breaker {} must be between {} and {}",
            value,
            settings.min,
            settings.max
        );
    }
    Ok(())
}

/// Entry names must be non-empty and unique across the pool, ignoring case and surrounding whitespace.
/// `own_id` lets an entry keep its own name when it is renamed or re-saved.
pub fn validate_entry_name(name: &str, existing: &[BracketEntry], own_id: Option<&str>) -> Result<()> {
    let wanted = name.trim();
    ensure!(!wanted.is_empty(), "entry name cannot be empty");
    let taken = existing
        .iter()
        .filter(|e| Some(e.id.as_str()) != own_id)
        .any(|e| e.entry_name.trim().eq_ignore_ascii_case(wanted));
    ensure!(!taken, "entry name '{}' is already taken", wanted);
    Ok(())
}

/// Where entries are kept between edits
pub trait EntryStore {
    fn load(&self, id: &str) -> Result<Option<BracketEntry>>;
    fn save(&self, entry: &BracketEntry) -> Result<()>;
    fn list(&self) -> Result<Vec<BracketEntry>>;
    fn delete(&self, id: &str) -> Result<bool>;
}

/// One pretty-printed json file per entry in a directory
pub struct JsonDirStore {
    dir: PathBuf,
}

impl JsonDirStore {
    pub fn new(dir: &str) -> Result<Self> {
        fs::create_dir_all(dir).with_context(|| format!("failed to create entry directory {}", dir))?;
        Ok(JsonDirStore { dir: PathBuf::from(dir) })
    }

    fn path_for(&self, id: &str) -> Result<PathBuf> {
        let safe = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        ensure!(safe, "entry id '{}' may only contain letters, digits, '-' and '_'", id);
        Ok(self.dir.join(format!("{}.json", id)))
    }

    fn read(path: &Path) -> Result<BracketEntry> {
        let content =
            fs::read_to_string(path).with_context(|| format!("failed to read entry {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("failed to parse entry {}", path.display()))
    }
}

impl EntryStore for JsonDirStore {
    fn load(&self, id: &str) -> Result<Option<BracketEntry>> {
        let path = self.path_for(id)?;
        if !path.exists() {
            return Ok(None);
        }
        Self::read(&path).map(Some)
    }

    fn save(&self, entry: &BracketEntry) -> Result<()> {
        let path = self.path_for(&entry.id)?;
        let json = serde_json::to_string_pretty(entry)?;
        fs::write(&path, json).with_context(|| format!("failed to write entry {}", path.display()))?;
        log::debug!("saved entry {} to {}", entry.id, path.display());
        Ok(())
    }

    fn list(&self) -> Result<Vec<BracketEntry>> {
        let mut entries = Vec::new();
        for dir_entry in fs::read_dir(&self.dir)? {
            let path = dir_entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                entries.push(Self::read(&path)?);
            }
        }
        entries.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(entries)
    }

    fn delete(&self, id: &str) -> Result<bool> {
        let path = self.path_for(id)?;
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path).with_context(|| format!("failed to delete entry {}", path.display()))?;
        Ok(true)
    }
}
