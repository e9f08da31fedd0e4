//! Strictly Sweeper - Unified CLI
//!
//! Plays single games or benchmark series from the command line.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{BoardArgs, Cli, Command};
use strictly_sweeper::{play_one, run_series};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Play { board, json } => run_play(&board, json),
        Command::Bench { board, games, json } => run_bench(&board, games, json),
    }
}

/// Play one game
#[instrument(skip(board))]
fn run_play(board: &BoardArgs, json: bool) -> Result<()> {
    let config = board.resolve()?;
    let seed = config.seed().unwrap_or_else(rand::random);
    info!(seed, player = %board.player, "Starting game");

    let report = play_one(&config, board.player, seed)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{report}");
    }
    Ok(())
}

/// Play a series of games
#[instrument(skip(board))]
fn run_bench(board: &BoardArgs, games: Option<usize>, json: bool) -> Result<()> {
    let mut config = board.resolve()?;
    if let Some(games) = games {
        config = config.with_games(games);
    }

    let summary = run_series(&config, board.player)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{summary}");
    }
    Ok(())
}
