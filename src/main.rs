//! Proxle Engine - CLI
//!
//! Local harness for the daily word game engine: evaluate guesses, record
//! completed games, inspect player statistics, and view the synced public
//! leaderboard. State lives in JSON files under a data directory so runs
//! compose; the semantic oracle is offline here, so guesses exercise the
//! fallback path.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use proxle_engine::{
    catalog::{PUZZLE_EPOCH, WordCatalog, today_utc, word_for_date},
    game::{GameService, SubmitGuess, parse_puzzle_date},
    hints::{HintService, OfflineOracle},
    leaderboard::{
        LeaderboardEntry, LeaderboardStore, LeaderboardSynchronizer, MemoryLeaderboard,
    },
    progress::store::{MemoryPlayerStore, PlayerStore},
    progress::PlayerDocument,
};

#[derive(Parser)]
#[command(
    name = "proxle-engine",
    about = "Daily word-guessing game engine: deterministic puzzles, streaks, and leaderboard sync",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory for player and leaderboard state
    #[arg(long, global = true, default_value = "proxle-data")]
    data_dir: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a guess against the day's secret word
    Guess {
        /// The guessed word
        word: String,

        /// Player submitting the guess
        #[arg(short, long, default_value = "local")]
        player: String,

        /// Hints already issued this game (repeatable)
        #[arg(short = 'x', long = "exclude")]
        previous_hints: Vec<String>,

        /// Puzzle date (YYYY-MM-DD); defaults to today in UTC
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Record a finished game for a player
    Complete {
        /// Player who finished
        player: String,

        /// Whether the player won
        #[arg(short, long)]
        won: bool,

        /// Number of guesses used
        #[arg(short, long, default_value = "1")]
        guesses: u32,
    },

    /// Show a player's statistics document
    Stats {
        /// Player to inspect
        player: String,
    },

    /// Show the public leaderboard collection
    Leaderboard,

    /// Print the secret word for a date (operator utility)
    Word {
        /// Puzzle date (YYYY-MM-DD); defaults to today in UTC
        #[arg(short, long)]
        date: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let players_path = cli.data_dir.join("players.json");
    let board_path = cli.data_dir.join("leaderboard.json");

    match cli.command {
        Commands::Guess {
            word,
            player,
            previous_hints,
            date,
        } => run_guess(&players_path, &board_path, &word, &player, previous_hints, date),
        Commands::Complete {
            player,
            won,
            guesses,
        } => run_complete(&players_path, &board_path, &player, won, guesses),
        Commands::Stats { player } => run_stats(&players_path, &player),
        Commands::Leaderboard => run_leaderboard(&board_path),
        Commands::Word { date } => run_word(date.as_deref()),
    }
}

fn build_service(
    players_path: &Path,
    board_path: &Path,
) -> Result<GameService<MemoryPlayerStore, MemoryLeaderboard>> {
    let players = load_players(players_path)?;
    let board = load_board(board_path)?;

    Ok(GameService::new(
        WordCatalog::embedded().clone(),
        HintService::new(Arc::new(OfflineOracle)),
        players,
        LeaderboardSynchronizer::new(board),
    ))
}

fn persist_service(
    service: &GameService<MemoryPlayerStore, MemoryLeaderboard>,
    players_path: &Path,
    board_path: &Path,
) -> Result<()> {
    save_players(service.players(), players_path)?;
    save_board(service.leaderboard().store(), board_path)
}

fn run_guess(
    players_path: &Path,
    board_path: &Path,
    word: &str,
    player: &str,
    previous_hints: Vec<String>,
    date: Option<String>,
) -> Result<()> {
    let service = build_service(players_path, board_path)?;

    let date = date.as_deref().map(parse_puzzle_date).transpose()?;
    let request = SubmitGuess {
        player_id: player.to_string(),
        guess: word.to_string(),
        previous_hints,
        date,
    };

    let response = service.submit_guess(&request)?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

fn run_complete(
    players_path: &Path,
    board_path: &Path,
    player: &str,
    won: bool,
    guesses: u32,
) -> Result<()> {
    let service = build_service(players_path, board_path)?;

    let progress = service.complete_game(player, won, guesses)?;
    persist_service(&service, players_path, board_path)?;

    println!("{}", serde_json::to_string_pretty(&progress)?);
    Ok(())
}

fn run_stats(players_path: &Path, player: &str) -> Result<()> {
    let players = load_players(players_path)?;
    let document = players.load(player)?.value;
    println!("{}", serde_json::to_string_pretty(&document.progress)?);
    Ok(())
}

fn run_leaderboard(board_path: &Path) -> Result<()> {
    let board = load_board(board_path)?;

    let mut entries = board.entries();
    entries.sort_by(|(_, a), (_, b)| {
        b.amount
            .total_cmp(&a.amount)
            .then(b.current_streak.cmp(&a.current_streak))
    });

    for (player_id, entry) in entries {
        let streak = if entry.show_streak {
            entry.current_streak.to_string()
        } else {
            "-".to_string()
        };
        let amount = if entry.show_donation_amount {
            format!("{:.2}", entry.amount)
        } else {
            "-".to_string()
        };
        println!("{player_id}: {} (streak {streak}, amount {amount})", entry.display_name);
    }
    Ok(())
}

fn run_word(date: Option<&str>) -> Result<()> {
    let date = match date {
        Some(raw) => parse_puzzle_date(raw)?,
        None => today_utc(),
    };

    let word = word_for_date(WordCatalog::embedded(), PUZZLE_EPOCH, date);
    println!("{word}");
    Ok(())
}

fn load_players(path: &Path) -> Result<MemoryPlayerStore> {
    let store = MemoryPlayerStore::new();
    if !path.exists() {
        return Ok(store);
    }

    let content =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let documents: BTreeMap<String, PlayerDocument> =
        serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;

    for (player_id, document) in documents {
        store
            .compare_and_swap(&player_id, 0, document)
            .with_context(|| format!("seeding player {player_id}"))?;
    }
    Ok(store)
}

fn save_players(store: &MemoryPlayerStore, path: &Path) -> Result<()> {
    let documents: BTreeMap<String, PlayerDocument> = store.documents().into_iter().collect();
    write_json(path, &documents)
}

fn load_board(path: &Path) -> Result<MemoryLeaderboard> {
    let board = MemoryLeaderboard::new();
    if !path.exists() {
        return Ok(board);
    }

    let content =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let entries: BTreeMap<String, LeaderboardEntry> =
        serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;

    for (player_id, entry) in entries {
        board.upsert(&player_id, entry)?;
    }
    Ok(board)
}

fn save_board(board: &MemoryLeaderboard, path: &Path) -> Result<()> {
    let entries: BTreeMap<String, LeaderboardEntry> = board.entries().into_iter().collect();
    write_json(path, &entries)
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    let content = serde_json::to_string_pretty(value)?;
    fs::write(path, content).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
