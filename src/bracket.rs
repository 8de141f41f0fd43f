//This contains the structure of a 63 game single elimination bracket.
//The Bracket struct is the immutable skeleton: every game, which games feed it, and the round of 64 matchups.
//Games are kept in a flat arena in canonical order (each region's 15 games round by round, then the final four and championship)
//so every feeder sits before the games it feeds, and lookups by id go through a hash index.

use anyhow::{bail, Result};
use fnv::FnvHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ingest::{RcTeam, TournamentData};

/// Round of 64 matchups by seed, in bracket order (games 1-8 of every region)
pub const ROUND1_SEED_PAIRS: [[u8; 2]; 8] = [
    [1, 16],
    [8, 9],
    [5, 12],
    [4, 13],
    [6, 11],
    [3, 14],
    [7, 10],
    [2, 15],
];

pub const GAMES_PER_REGION: usize = 15;
pub const TOTAL_GAMES: usize = 63;
pub const FINAL_FOUR_IDS: [&str; 2] = ["final-four-1", "final-four-2"];
pub const CHAMPIONSHIP_ID: &str = "championship";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RegionPosition {
    TopLeft,
    BottomLeft,
    TopRight,
    BottomRight,
}

impl RegionPosition {
    pub const ALL: [RegionPosition; 4] = [
        RegionPosition::TopLeft,
        RegionPosition::BottomLeft,
        RegionPosition::TopRight,
        RegionPosition::BottomRight,
    ];

    pub fn index(self) -> usize {
        match self {
            RegionPosition::TopLeft => 0,
            RegionPosition::BottomLeft => 1,
            RegionPosition::TopRight => 2,
            RegionPosition::BottomRight => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RegionPosition::TopLeft => "TopLeft",
            RegionPosition::BottomLeft => "BottomLeft",
            RegionPosition::TopRight => "TopRight",
            RegionPosition::BottomRight => "BottomRight",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Round {
    R64,
    R32,
    S16,
    E8,
    FinalFour,
    Championship,
}

impl Round {
    pub const ALL: [Round; 6] = [
        Round::R64,
        Round::R32,
        Round::S16,
        Round::E8,
        Round::FinalFour,
        Round::Championship,
    ];

    pub const REGIONAL: [Round; 4] = [Round::R64, Round::R32, Round::S16, Round::E8];

    /// Segment used inside game ids
    pub fn key(self) -> &'static str {
        match self {
            Round::R64 => "r64",
            Round::R32 => "r32",
            Round::S16 => "s16",
            Round::E8 => "e8",
            Round::FinalFour => "final-four",
            Round::Championship => "championship",
        }
    }

    pub fn from_key(key: &str) -> Option<Round> {
        Round::ALL.into_iter().find(|r| r.key() == key)
    }

    pub fn label(self) -> &'static str {
        match self {
            Round::R64 => "Round of 64",
            Round::R32 => "Round of 32",
            Round::S16 => "Sweet 16",
            Round::E8 => "Elite 8",
            Round::FinalFour => "Final Four",
            Round::Championship => "Championship",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Round::R64 => 0,
            Round::R32 => 1,
            Round::S16 => 2,
            Round::E8 => 3,
            Round::FinalFour => 4,
            Round::Championship => 5,
        }
    }

    pub fn is_regional(self) -> bool {
        match self {
            Round::R64 | Round::R32 | Round::S16 | Round::E8 => true,
            Round::FinalFour | Round::Championship => false,
        }
    }

    /// Games per region in this round; zero once the regions have merged
    pub fn games_per_region(self) -> usize {
        match self {
            Round::R64 => 8,
            Round::R32 => 4,
            Round::S16 => 2,
            Round::E8 => 1,
            Round::FinalFour | Round::Championship => 0,
        }
    }

    pub fn prev(self) -> Option<Round> {
        match self {
            Round::R64 => None,
            Round::R32 => Some(Round::R64),
            Round::S16 => Some(Round::R32),
            Round::E8 => Some(Round::S16),
            Round::FinalFour => Some(Round::E8),
            Round::Championship => Some(Round::FinalFour),
        }
    }
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which regions meet in each national semifinal. Mirrors the halves of the printed bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalFourPairing {
    pub semifinal1: [RegionPosition; 2],
    pub semifinal2: [RegionPosition; 2],
}

impl Default for FinalFourPairing {
    fn default() -> Self {
        FinalFourPairing {
            semifinal1: [RegionPosition::TopLeft, RegionPosition::BottomLeft],
            semifinal2: [RegionPosition::TopRight, RegionPosition::BottomRight],
        }
    }
}

/// Decoded form of a game id.
/// Regional ids look like `East-r32-3` (number is 1-based within the region's round),
/// the national games use the literals `final-four-1`, `final-four-2` and `championship`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GameKey {
    Regional {
        region: String,
        round: Round,
        number: usize,
    },
    FinalFour(usize),
    Championship,
}

impl GameKey {
    pub fn parse(id: &str) -> Option<GameKey> {
        if id == CHAMPIONSHIP_ID {
            return Some(GameKey::Championship);
        }
        if let Some(pos) = FINAL_FOUR_IDS.iter().position(|ff| *ff == id) {
            return Some(GameKey::FinalFour(pos + 1));
        }

        // region names may carry dashes of their own, so split from the right
        let mut parts = id.rsplitn(3, '-');
        let number: usize = parts.next()?.parse().ok()?;
        let round = Round::from_key(parts.next()?)?;
        let region = parts.next()?;
        if region.is_empty() || !round.is_regional() {
            return None;
        }
        if number == 0 || number > round.games_per_region() {
            return None;
        }
        Some(GameKey::Regional {
            region: region.to_string(),
            round,
            number,
        })
    }

    pub fn round(&self) -> Round {
        match self {
            GameKey::Regional { round, .. } => *round,
            GameKey::FinalFour(_) => Round::FinalFour,
            GameKey::Championship => Round::Championship,
        }
    }

    pub fn to_id(&self) -> String {
        match self {
            GameKey::Regional {
                region,
                round,
                number,
            } => format!("{}-{}-{}", region, round.key(), number),
            GameKey::FinalFour(number) => format!("{}-{}", Round::FinalFour.key(), number),
            GameKey::Championship => CHAMPIONSHIP_ID.to_string(),
        }
    }
}

impl fmt::Display for GameKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_id())
    }
}

/// A team slot; `None` means the slot is still undetermined
pub type Slot = Option<RcTeam>;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Game {
    pub id: String,
    pub round: Round,
    /// None for the final four and championship
    pub region: Option<RegionPosition>,
    /// 1-based position within the round (and region, for regional rounds)
    pub number: usize,
    pub team1: Slot,
    pub team2: Slot,
    /// Ids of the games whose winners fill team1 and team2. None in the round of 64.
    pub feeders: Option<[String; 2]>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Bracket {
    pub year: u16,
    region_names: [String; 4],
    final_four_pairing: FinalFourPairing,
    games: Vec<Game>,
    #[serde(skip)]
    index: FnvHashMap<String, usize>,
}

/// Build the game skeleton for a tournament field. Deterministic, so it is safe to rebuild on every use.
pub fn build_bracket(tournament: &TournamentData) -> Bracket {
    Bracket::new(tournament)
}

impl Bracket {
    pub fn new(tournament: &TournamentData) -> Bracket {
        let mut games: Vec<Game> = Vec::with_capacity(TOTAL_GAMES);

        let region_names: [String; 4] = RegionPosition::ALL.map(|position| {
            tournament
                .region(position)
                .map(|r| r.name.clone())
                .unwrap_or_else(|| position.label().to_string())
        });

        for position in RegionPosition::ALL {
            let region_name = &region_names[position.index()];
            let region = tournament.region(position);

            for (i, seeds) in ROUND1_SEED_PAIRS.iter().enumerate() {
                let team1 = region.and_then(|r| r.team_by_seed(seeds[0])).cloned();
                let team2 = region.and_then(|r| r.team_by_seed(seeds[1])).cloned();
                games.push(Game {
                    id: regional_id(region_name, Round::R64, i + 1),
                    round: Round::R64,
                    region: Some(position),
                    number: i + 1,
                    team1,
                    team2,
                    feeders: None,
                });
            }

            for round in [Round::R32, Round::S16, Round::E8] {
                let prev = match round.prev() {
                    Some(prev) => prev,
                    None => continue,
                };
                for number in 1..=round.games_per_region() {
                    games.push(Game {
                        id: regional_id(region_name, round, number),
                        round,
                        region: Some(position),
                        number,
                        team1: None,
                        team2: None,
                        feeders: Some([
                            regional_id(region_name, prev, number * 2 - 1),
                            regional_id(region_name, prev, number * 2),
                        ]),
                    });
                }
            }
        }

        let pairing = tournament.final_four;
        for (i, pair) in [pairing.semifinal1, pairing.semifinal2].into_iter().enumerate() {
            games.push(Game {
                id: FINAL_FOUR_IDS[i].to_string(),
                round: Round::FinalFour,
                region: None,
                number: i + 1,
                team1: None,
                team2: None,
                feeders: Some(pair.map(|position| regional_id(&region_names[position.index()], Round::E8, 1))),
            });
        }

        games.push(Game {
            id: CHAMPIONSHIP_ID.to_string(),
            round: Round::Championship,
            region: None,
            number: 1,
            team1: None,
            team2: None,
            feeders: Some(FINAL_FOUR_IDS.map(str::to_string)),
        });

        let index = games
            .iter()
            .enumerate()
            .map(|(i, game)| (game.id.clone(), i))
            .collect();

        Bracket {
            year: tournament.year,
            region_names,
            final_four_pairing: pairing,
            games,
            index,
        }
    }

    /// All 63 games in canonical order
    pub fn games(&self) -> &[Game] {
        &self.games
    }

    pub fn game(&self, id: &str) -> Option<&Game> {
        self.position_of(id).map(|i| &self.games[i])
    }

    /// Look up a game, telling a malformed id apart from a well-formed one this bracket does not have
    pub fn find_game(&self, id: &str) -> Result<&Game> {
        if GameKey::parse(id).is_none() {
            bail!(
                "'{}' is not a game id; expected something like {}-r64-1, {} or {}",
                id,
                self.region_names[0],
                FINAL_FOUR_IDS[0],
                CHAMPIONSHIP_ID
            );
        }
        match self.game(id) {
            Some(game) => Ok(game),
            None => bail!("no game {} in the {} bracket", id, self.year),
        }
    }

    /// Position of a game in canonical order
    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn region_games(&self, position: RegionPosition) -> &[Game] {
        let start = position.index() * GAMES_PER_REGION;
        &self.games[start..start + GAMES_PER_REGION]
    }

    pub fn final_four(&self) -> &[Game] {
        let start = 4 * GAMES_PER_REGION;
        &self.games[start..start + 2]
    }

    pub fn championship(&self) -> &Game {
        &self.games[TOTAL_GAMES - 1]
    }

    pub fn region_name(&self, position: RegionPosition) -> &str {
        &self.region_names[position.index()]
    }

    pub fn final_four_pairing(&self) -> FinalFourPairing {
        self.final_four_pairing
    }
}

fn regional_id(region_name: &str, round: Round, number: usize) -> String {
    GameKey::Regional {
        region: region_name.to_string(),
        round,
        number,
    }
    .to_id()
}
