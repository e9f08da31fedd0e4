//! Player trait and implementations.

mod knowledge;
mod simple;

pub use knowledge::KnowledgePlayer;
pub use simple::SimplePlayer;

use crate::SweeperConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use strictly_minesweeper::{Cell, Game, InProgress, KnowledgeError};
use strum::Display;

/// How sure a player was that a cell is safe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum Certainty {
    /// The cell was proven safe.
    Safe,
    /// The cell was picked without proof.
    Guess,
}

/// A cell a player wants revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    /// Cell to reveal.
    pub cell: Cell,
    /// Whether the player knew it was safe.
    pub certainty: Certainty,
}

impl Move {
    /// A move the player has proven safe.
    pub fn safe(cell: Cell) -> Self {
        Self {
            cell,
            certainty: Certainty::Safe,
        }
    }

    /// A move made without proof.
    pub fn guess(cell: Cell) -> Self {
        Self {
            cell,
            certainty: Certainty::Guess,
        }
    }
}

/// Trait for players that can reveal cells.
pub trait Player {
    /// Returns the player's display name.
    fn name(&self) -> &str;

    /// Picks the next cell to reveal, or `None` when the player has no move.
    fn next_move(&mut self, game: &Game<InProgress>) -> Option<Move>;

    /// Tells the player what a reveal showed.
    fn observe(&mut self, cell: Cell, count: u8) -> Result<(), KnowledgeError>;

    /// Cells the player believes hold mines.
    fn flags(&self) -> BTreeSet<Cell>;
}

/// Selectable player implementations.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, clap::ValueEnum, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
pub enum PlayerKind {
    /// Deduces from observations, guesses when stuck.
    Knowledge,
    /// Reveals the first hidden cell.
    Simple,
}

impl PlayerKind {
    /// Builds a player for one game.
    pub fn build(self, config: &SweeperConfig, seed: u64) -> Box<dyn Player> {
        match self {
            Self::Knowledge => Box::new(KnowledgePlayer::new(config, seed)),
            Self::Simple => Box::new(SimplePlayer::new("Simple")),
        }
    }
}
