//! Command-line interface for strictly_sweeper.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use strictly_sweeper::{PlayerKind, SweeperConfig};

/// Strictly Sweeper - minesweeper played by a deducing agent
#[derive(Parser, Debug)]
#[command(name = "strictly_sweeper")]
#[command(about = "Minesweeper played by a propositional knowledge-base agent", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play a single game and print the final board
    Play {
        /// Board options
        #[command(flatten)]
        board: BoardArgs,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Play a series of games and print a summary
    Bench {
        /// Board options
        #[command(flatten)]
        board: BoardArgs,

        /// Number of games (overrides config)
        #[arg(short, long)]
        games: Option<usize>,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Options shared by every command; flags override the config file.
#[derive(Args, Debug)]
pub struct BoardArgs {
    /// Path to a TOML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Number of rows
    #[arg(long)]
    pub height: Option<usize>,

    /// Number of columns
    #[arg(long)]
    pub width: Option<usize>,

    /// Number of mines
    #[arg(short, long)]
    pub mines: Option<usize>,

    /// Seed for mine placement and guesses
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Player to use
    #[arg(short, long, value_enum, default_value_t = PlayerKind::Knowledge)]
    pub player: PlayerKind,
}

impl BoardArgs {
    /// Loads the config file, if any, and applies flag overrides.
    pub fn resolve(&self) -> anyhow::Result<SweeperConfig> {
        let mut config = match &self.config {
            Some(path) => SweeperConfig::from_file(path)?,
            None => SweeperConfig::default(),
        };
        if let Some(height) = self.height {
            config = config.with_height(height);
        }
        if let Some(width) = self.width {
            config = config.with_width(width);
        }
        if let Some(mines) = self.mines {
            config = config.with_mines(mines);
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        config.validate()?;
        Ok(config)
    }
}
