//! Domino-Rust: a double-six domino engine.
//!
//! ## Usage
//!
//! - `domino-rust` - Play against the AI over the text protocol (stdin/stdout)
//! - `domino-rust play --seats 4 --difficulty dificil` - Same, with options
//! - `domino-rust simulate --games 100` - Run AI-only matches and report results

use std::io;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use domino_rust::config::{Difficulty, GameConfig, Modality};
use domino_rust::game::RoundEnd;
use domino_rust::playout::play_match;
use domino_rust::protocol::ProtocolEngine;

/// Domino-Rust: a double-six domino engine
#[derive(Parser)]
#[command(name = "domino-rust")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play as seat 0 against AI seats over the text protocol
    Play(TableArgs),
    /// Run AI-only matches and print a summary
    Simulate {
        #[command(flatten)]
        table: TableArgs,

        /// Number of matches to run
        #[arg(short, long, default_value_t = 1)]
        games: u32,

        /// Round limit per match
        #[arg(short, long, default_value_t = 10)]
        rounds: u32,
    },
}

#[derive(Args, Clone)]
struct TableArgs {
    /// Scoring modality: classico, bloqueio, or pontuacao
    #[arg(short, long, default_value = "classico")]
    modality: Modality,

    /// Number of seats (2-4)
    #[arg(short, long, default_value_t = 2)]
    seats: usize,

    /// AI difficulty: facil, medio, or dificil
    #[arg(short, long, default_value = "medio")]
    difficulty: Difficulty,

    /// Seed for reproducible games
    #[arg(long)]
    seed: Option<u64>,
}

impl Default for TableArgs {
    fn default() -> Self {
        Self {
            modality: Modality::Classic,
            seats: 2,
            difficulty: Difficulty::Medium,
            seed: None,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Some(Commands::Play(table)) => run_play(table),
        Some(Commands::Simulate {
            table,
            games,
            rounds,
        }) => run_simulate(table, games, rounds),
        None => run_play(TableArgs::default()),
    }
}

fn run_play(table: TableArgs) -> Result<()> {
    let mut config = GameConfig::single_player(table.modality, table.seats, table.difficulty);
    config.seed = table.seed;
    config.validate()?;

    info!(modality = %table.modality, seats = table.seats, difficulty = %table.difficulty, "starting session");
    let mut engine = ProtocolEngine::new(config)?;
    engine.run(io::stdin().lock(), io::stdout())
}

fn run_simulate(table: TableArgs, games: u32, rounds: u32) -> Result<()> {
    let mut wins = vec![0u32; table.seats];
    let mut blocks = 0usize;
    let mut total_rounds = 0usize;

    for game in 0..games {
        let difficulties = vec![table.difficulty; table.seats];
        let mut config = GameConfig::all_ai(table.modality, &difficulties);
        config.seed = table.seed.map(|s| s.wrapping_add(game as u64));
        config.validate()?;

        let summary = play_match(config, rounds)?;
        wins[summary.winner] += 1;
        total_rounds += summary.rounds.len();
        blocks += summary
            .rounds
            .iter()
            .filter(|r| r.end == RoundEnd::Block)
            .count();
        info!(game, winner = summary.winner, scores = ?summary.scores, "match complete");
    }

    println!("Domino-Rust simulation: {games} matches, {total_rounds} rounds");
    println!("Modality: {}, difficulty: {}", table.modality, table.difficulty);
    for (seat, w) in wins.iter().enumerate() {
        println!("seat {seat}: {w} wins");
    }
    println!("blocked rounds: {blocks}");
    Ok(())
}
