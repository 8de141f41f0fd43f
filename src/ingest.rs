// This file ingests the seeded field for one tournament year and stores it in structs used by the bracket builder.
// The field can come from a csv file, a json file, or the built-in sample field.

use anyhow::{bail, ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::bracket::{FinalFourPairing, RegionPosition};

/// Atomically reference-counted Team so slots can share one allocation as a team advances.
pub type RcTeam = Arc<Team>;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Team {
    pub id: String,
    pub seed: u8,
    pub region: String,
    pub name: String,
    /// Opaque reference to a logo asset, never interpreted here
    #[serde(default)]
    pub logo: Option<String>,
}

impl Team {
    pub fn new(id: &str, seed: u8, region: &str, name: &str) -> Team {
        Team {
            id: id.to_string(),
            seed,
            region: region.to_string(),
            name: name.to_string(),
            logo: None,
        }
    }
}

/// The sixteen seeded teams sitting in one corner of the bracket
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RegionTeams {
    pub position: RegionPosition,
    pub name: String,
    pub teams: Vec<RcTeam>,
}

impl RegionTeams {
    pub fn team_by_seed(&self, seed: u8) -> Option<&RcTeam> {
        self.teams.iter().find(|t| t.seed == seed)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TournamentData {
    pub year: u16,
    pub regions: Vec<RegionTeams>,
    #[serde(default)]
    pub final_four: FinalFourPairing,
}

// one row of the field csv: team_id,name,seed,region,position,logo
#[derive(Debug, Deserialize)]
struct TeamRecord {
    team_id: String,
    name: String,
    seed: String,
    region: String,
    position: RegionPosition,
    #[serde(default)]
    logo: Option<String>,
}

impl TournamentData {
    pub fn new(year: u16, regions: Vec<RegionTeams>) -> TournamentData {
        TournamentData {
            year,
            regions,
            final_four: FinalFourPairing::default(),
        }
    }

    pub fn region(&self, position: RegionPosition) -> Option<&RegionTeams> {
        self.regions.iter().find(|r| r.position == position)
    }

    pub fn teams(&self) -> impl Iterator<Item = &RcTeam> {
        self.regions.iter().flat_map(|r| r.teams.iter())
    }

    /// Load a field from disk, picking the reader by file extension
    pub fn load(path: &str, year: u16) -> Result<TournamentData> {
        let data = if path.ends_with(".json") {
            Self::from_json(path)?
        } else {
            Self::from_csv(path, year)?
        };
        data.validate()
            .with_context(|| format!("invalid tournament field in {}", path))?;
        log::info!("loaded {} teams for {} from {}", data.teams().count(), data.year, path);
        Ok(data)
    }

    pub fn from_json(path: &str) -> Result<TournamentData> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read tournament file {}", path))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse tournament file {}", path))
    }

    pub fn from_csv(path: &str, year: u16) -> Result<TournamentData> {
        if !Path::new(path).exists() {
            bail!("tournament file not found: {}", path);
        }
        let mut rdr = csv::Reader::from_path(path)
            .with_context(|| format!("failed to open tournament file {}", path))?;

        let mut regions: Vec<RegionTeams> = Vec::with_capacity(4);
        for result in rdr.deserialize() {
            let record: TeamRecord = result.with_context(|| format!("bad row in {}", path))?;
            //play-in seeds are written like "16a"; the surviving team keeps the bare seed
            let digits: String = record.seed.chars().filter(|c| c.is_ascii_digit()).collect();
            let seed: u8 = digits
                .parse()
                .with_context(|| format!("bad seed '{}' for {}", record.seed, record.name))?;

            let mut team = Team::new(&record.team_id, seed, &record.region, &record.name);
            team.logo = record.logo.filter(|l| !l.is_empty());

            match regions.iter_mut().find(|r| r.position == record.position) {
                Some(region) => region.teams.push(Arc::new(team)),
                None => regions.push(RegionTeams {
                    position: record.position,
                    name: record.region.clone(),
                    teams: vec![Arc::new(team)],
                }),
            }
        }

        for region in regions.iter_mut() {
            region.teams.sort_by_key(|t| t.seed);
        }
        regions.sort_by_key(|r| r.position);

        Ok(TournamentData::new(year, regions))
    }

    pub fn save_json(&self, path: &str) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("failed to write tournament file {}", path))?;
        Ok(())
    }

    /// Check the shape the bracket builder expects: four distinct corners, sixteen unique seeds each.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.regions.len() == 4,
            "expected 4 regions, found {}",
            self.regions.len()
        );

        let mut positions = HashSet::new();
        let mut names = HashSet::new();
        let mut ids = HashSet::new();
        for region in &self.regions {
            ensure!(
                positions.insert(region.position),
                "region position {:?} appears twice",
                region.position
            );
            ensure!(
                names.insert(region.name.as_str()),
                "region name '{}' appears twice",
                region.name
            );
            ensure!(
                region.teams.len() == 16,
                "region '{}' has {} teams, expected 16",
                region.name,
                region.teams.len()
            );
            let mut seeds = HashSet::new();
            for team in &region.teams {
                ensure!(
                    (1..=16).contains(&team.seed),
                    "team '{}' has seed {} outside 1-16",
                    team.name,
                    team.seed
                );
                ensure!(
                    seeds.insert(team.seed),
                    "seed {} appears twice in region '{}'",
                    team.seed,
                    region.name
                );
                ensure!(ids.insert(team.id.as_str()), "team id '{}' appears twice", team.id);
            }
        }

        for pair in [self.final_four.semifinal1, self.final_four.semifinal2] {
            ensure!(pair[0] != pair[1], "final four pairs {:?} with itself", pair[0]);
        }
        let paired: HashSet<RegionPosition> = self
            .final_four
            .semifinal1
            .iter()
            .chain(self.final_four.semifinal2.iter())
            .copied()
            .collect();
        ensure!(paired.len() == 4, "final four pairing must use every region once");

        Ok(())
    }

    /// Sample field based on the 2024 tournament structure.
    /// Would need to be updated each year when brackets are announced.
    pub fn sample(year: u16) -> TournamentData {
        let sample_teams_by_region: [(RegionPosition, &str, [&str; 16]); 4] = [
            (
                RegionPosition::TopLeft,
                "East",
                [
                    "Connecticut", "Iowa State", "Illinois", "Auburn",
                    "San Diego State", "BYU", "Washington State", "Florida Atlantic",
                    "Northwestern", "Drake", "Duquesne", "UAB",
                    "Yale", "Morehead State", "South Dakota State", "Stetson",
                ],
            ),
            (
                RegionPosition::BottomLeft,
                "West",
                [
                    "North Carolina", "Arizona", "Baylor", "Alabama",
                    "Saint Mary's", "Clemson", "Dayton", "Mississippi State",
                    "Michigan State", "Nevada", "New Mexico", "Grand Canyon",
                    "Charleston", "Colgate", "Long Beach State", "Wagner",
                ],
            ),
            (
                RegionPosition::TopRight,
                "South",
                [
                    "Houston", "Marquette", "Kentucky", "Duke",
                    "Wisconsin", "Texas Tech", "Florida", "Nebraska",
                    "Texas A&M", "Colorado", "NC State", "James Madison",
                    "Vermont", "Oakland", "Western Kentucky", "Longwood",
                ],
            ),
            (
                RegionPosition::BottomRight,
                "Midwest",
                [
                    "Purdue", "Tennessee", "Creighton", "Kansas",
                    "Gonzaga", "South Carolina", "Texas", "Utah State",
                    "TCU", "Colorado State", "Oregon", "McNeese",
                    "Samford", "Akron", "Saint Peter's", "Grambling State",
                ],
            ),
        ];

        let regions = sample_teams_by_region
            .iter()
            .map(|(position, region_name, names)| RegionTeams {
                position: *position,
                name: region_name.to_string(),
                teams: names
                    .iter()
                    .enumerate()
                    .map(|(idx, name)| Arc::new(Team::new(&slug(name), idx as u8 + 1, region_name, name)))
                    .collect(),
            })
            .collect();

        TournamentData::new(year, regions)
    }
}

fn slug(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter_map(|c| match c {
            'a'..='z' | '0'..='9' => Some(c),
            ' ' => Some('-'),
            _ => None,
        })
        .collect()
}
