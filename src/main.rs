use anyhow::{anyhow, ensure, Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;

use bracket_pool::autofill::{autofill, chalk};
use bracket_pool::bracket::{Bracket, RegionPosition, Round};
use bracket_pool::config::{generate_sample_config, Config};
use bracket_pool::entry::{validate_entry_name, BracketEntry, EntryStatus, EntryStore, JsonDirStore};
use bracket_pool::ingest::TournamentData;
use bracket_pool::picks::{apply_picks, MaterializedBracket, MaterializedGame};
use bracket_pool::results::ActualResults;
use bracket_pool::scoring::{potential_points, score_bracket};
use bracket_pool::standings::compute_standings;

#[derive(Parser)]
#[command(author, version, about = "Run a tournament bracket pool", long_about = None)]
struct Cli {
    /// YAML config file; config.yaml in the working directory is used when present
    #[arg(long, global = true)]
    config: Option<String>,

    /// Tournament field as csv or json. The built-in sample field is used when omitted.
    #[arg(long, global = true)]
    tournament: Option<String>,

    #[arg(long, global = true, default_value_t = 2024)]
    year: u16,

    /// Directory holding one json file per entry
    #[arg(long, global = true, default_value = "entries")]
    entries: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Create an empty entry")]
    New {
        id: String,
        #[arg(long)]
        name: String,
    },
    #[command(about = "Print an entry's bracket, or the empty bracket when no entry is given")]
    Show { id: Option<String> },
    #[command(about = "Pick the winner of one game")]
    Pick { id: String, game: String, team: String },
    #[command(about = "Clear one pick and everything that depended on it, or the whole bracket")]
    Clear {
        id: String,
        game: Option<String>,
        #[arg(long, conflicts_with = "game")]
        all: bool,
    },
    #[command(about = "Fill every open game, weighted by seed")]
    Autofill {
        id: String,
        #[arg(long)]
        seed: Option<u64>,
        /// Always take the better seed
        #[arg(long)]
        chalk: bool,
    },
    #[command(about = "Lock in a complete bracket with a championship score guess")]
    Submit { id: String, tie_breaker: u32 },
    #[command(about = "Score one entry against actual results")]
    Score {
        id: String,
        #[arg(long)]
        results: String,
    },
    #[command(about = "Rank every entry against actual results")]
    Standings {
        #[arg(long)]
        results: String,
        #[arg(long)]
        json: bool,
    },
    #[command(about = "Write the tournament field as json")]
    ExportField { output: String },
    #[command(about = "Print or write a sample configuration file")]
    SampleConfig { output: Option<String> },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let config = Config::load_or_default(cli.config.as_deref());
    let tournament = match &cli.tournament {
        Some(path) => TournamentData::load(path, cli.year)?,
        None => TournamentData::sample(cli.year),
    };
    let bracket = Bracket::new(&tournament);

    match cli.command {
        Command::New { id, name } => {
            let store = JsonDirStore::new(&cli.entries)?;
            ensure!(store.load(&id)?.is_none(), "entry {} already exists", id);
            validate_entry_name(&name, &store.list()?, None)?;
            store.save(&BracketEntry::new(&id, &name))?;
            println!("created entry {} ({})", id, name.trim());
        }
        Command::Show { id } => match id {
            Some(id) => {
                let store = JsonDirStore::new(&cli.entries)?;
                let entry = load_entry(&store, &bracket, &id)?;
                print_entry_header(&entry);
                print_bracket(&apply_picks(&bracket, &entry.picks));
            }
            None => print_bracket(&apply_picks(&bracket, &Default::default())),
        },
        Command::Pick { id, game, team } => {
            let store = JsonDirStore::new(&cli.entries)?;
            let mut entry = load_entry(&store, &bracket, &id)?;
            bracket.find_game(&game)?;
            let view = apply_picks(&bracket, &entry.picks);
            let target = view.game(&game).ok_or_else(|| anyhow!("no game with id {}", game))?;
            ensure!(target.is_determined(), "{} is not playable until both teams are known", game);
            ensure!(target.slot_for(&team).is_some(), "{} is not playing in {}", team, game);

            let expected = entry.picks.len() + usize::from(!entry.picks.contains_key(&game));
            if entry.set_pick(&bracket, &game, &team) {
                let cleared = expected.saturating_sub(entry.picks.len());
                store.save(&entry)?;
                println!("{}: picked {} in {}", entry.id, team, game);
                if cleared > 0 {
                    println!("cleared {} downstream pick(s)", cleared);
                }
            } else {
                println!("{}: {} was already picked in {}", entry.id, team, game);
            }
        }
        Command::Clear { id, game, all } => {
            let store = JsonDirStore::new(&cli.entries)?;
            let mut entry = load_entry(&store, &bracket, &id)?;
            let changed = match (game, all) {
                (_, true) => entry.reset(),
                (Some(game), false) => {
                    bracket.find_game(&game)?;
                    entry.clear_pick(&bracket, &game)
                }
                (None, false) => return Err(anyhow!("name a game to clear or pass --all")),
            };
            if changed {
                store.save(&entry)?;
            }
            println!("{}: {} pick(s) remaining", entry.id, entry.picks.len());
        }
        Command::Autofill { id, seed, chalk: favourites } => {
            let store = JsonDirStore::new(&cli.entries)?;
            let mut entry = load_entry(&store, &bracket, &id)?;
            let filled = if favourites {
                chalk(&bracket, &entry.picks)
            } else {
                let mut rng = match seed {
                    Some(seed) => StdRng::seed_from_u64(seed),
                    None => StdRng::from_entropy(),
                };
                autofill(&bracket, &entry.picks, &mut rng)
            };
            let added = filled.len().saturating_sub(entry.picks.len());
            if entry.replace_picks(filled) {
                store.save(&entry)?;
            }
            println!("{}: filled {} game(s)", entry.id, added);
        }
        Command::Submit { id, tie_breaker } => {
            let store = JsonDirStore::new(&cli.entries)?;
            let mut entry = load_entry(&store, &bracket, &id)?;
            entry.submit(&bracket, tie_breaker, &config.tie_breaker)?;
            store.save(&entry)?;
            println!("{}: submitted with tie breaker {}", entry.id, tie_breaker);
        }
        Command::Score { id, results } => {
            let store = JsonDirStore::new(&cli.entries)?;
            let entry = load_entry(&store, &bracket, &id)?;
            let results = ActualResults::load(&results)?;
            let scoring = config.to_scoring_config();
            let report = score_bracket(&bracket, &entry.picks, &results, &scoring);

            print_entry_header(&entry);
            for game in &report.breakdown {
                println!(
                    "{:<22} {:<8} picked {:<20} won {:<20} {:>3}{}",
                    game.game_id,
                    if game.correct { "correct" } else { "wrong" },
                    game.picked,
                    game.actual,
                    game.points(),
                    if game.bonus_points > 0 { " (underdog)" } else { "" }
                );
            }
            println!();
            for (round, points) in Round::ALL.iter().zip(report.round_totals()) {
                println!("{:<14} {:>4}", round.label(), points);
            }
            println!(
                "total {} ({} correct, {} bonus), potential {}, perfect bracket {}",
                report.total,
                report.correct_picks,
                report.bonus_total(),
                potential_points(&bracket, &entry.picks, &results, &scoring),
                scoring.max_base_points()
            );
        }
        Command::Standings { results, json } => {
            let store = JsonDirStore::new(&cli.entries)?;
            let results = ActualResults::load(&results)?;
            let entries: Vec<BracketEntry> = store
                .list()?
                .into_iter()
                .filter(|e| e.status == EntryStatus::Submitted)
                .collect();
            let standings = compute_standings(&bracket, &entries, &results, &config.to_scoring_config());

            if json {
                println!("{}", serde_json::to_string_pretty(&standings)?);
            } else {
                println!("{:>4}  {:<24} {:>6} {:>9} {:>8}", "rank", "entry", "points", "potential", "tb diff");
                for row in &standings {
                    let distance = row
                        .tie_break_distance
                        .map(|d| d.to_string())
                        .unwrap_or_else(|| "-".to_string());
                    println!(
                        "{:>4}  {:<24} {:>6} {:>9} {:>8}",
                        row.rank, row.entry_name, row.total, row.potential, distance
                    );
                }
            }
        }
        Command::ExportField { output } => {
            tournament.save_json(&output)?;
            println!("wrote {} field to {}", tournament.year, output);
        }
        Command::SampleConfig { output } => match output {
            Some(path) => {
                std::fs::write(&path, generate_sample_config())
                    .with_context(|| format!("failed to write {}", path))?;
                println!("wrote sample config to {}", path);
            }
            None => print!("{}", generate_sample_config()),
        },
    }

    Ok(())
}

/// Load an entry, dropping any stored picks that no longer fit the bracket
fn load_entry(store: &JsonDirStore, bracket: &Bracket, id: &str) -> Result<BracketEntry> {
    let mut entry = store.load(id)?.ok_or_else(|| anyhow!("no entry with id {}", id))?;
    if entry.prune(bracket) > 0 {
        store.save(&entry)?;
    }
    Ok(entry)
}

fn print_entry_header(entry: &BracketEntry) {
    let status = match entry.status {
        EntryStatus::Draft => "draft".to_string(),
        EntryStatus::Submitted => match entry.submitted_at {
            Some(at) => format!("submitted {}", at.format("%Y-%m-%d %H:%M UTC")),
            None => "submitted".to_string(),
        },
    };
    let tie_breaker = entry
        .tie_breaker
        .map(|t| t.to_string())
        .unwrap_or_else(|| "-".to_string());
    println!("{} [{}] {}  tie breaker {}", entry.entry_name, entry.id, status, tie_breaker);
    println!();
}

fn print_bracket(view: &MaterializedBracket) {
    let bracket = view.skeleton();
    for position in RegionPosition::ALL {
        println!("== {} ({}) ==", bracket.region_name(position), position.label());
        let mut round = None;
        for game in view.region_games(position) {
            if round != Some(game.round) {
                round = Some(game.round);
                println!("  {}", game.round.label());
            }
            print_game(game);
        }
        println!();
    }
    let pairing = bracket.final_four_pairing();
    let names = |pair: [RegionPosition; 2]| {
        format!("{} v {}", bracket.region_name(pair[0]), bracket.region_name(pair[1]))
    };
    println!(
        "== {} ({}, {}) ==",
        Round::FinalFour.label(),
        names(pairing.semifinal1),
        names(pairing.semifinal2)
    );
    for game in view.final_four() {
        print_game(game);
    }
    println!("== {} ==", Round::Championship.label());
    print_game(view.championship());
    println!();
    println!(
        "{} of {} games picked, {} open slot(s)",
        view.picked_games(),
        view.games().len(),
        view.undetermined_slots()
    );
}

fn print_game(game: &MaterializedGame) {
    let slot = |team: &Option<bracket_pool::RcTeam>| match team {
        Some(t) => format!("({}) {}", t.seed, t.name),
        None => "TBD".to_string(),
    };
    let winner = match &game.winner {
        Some(t) => format!(" -> {}", t.name),
        None => String::new(),
    };
    println!(
        "    {:<22} {:<26} vs {:<26}{}",
        game.id,
        slot(&game.team1),
        slot(&game.team2),
        winner
    );
}
