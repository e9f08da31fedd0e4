//! Baseline player that never reasons.

use super::{Move, Player};
use std::collections::BTreeSet;
use strictly_minesweeper::{Cell, Game, InProgress, KnowledgeError};
use tracing::debug;

/// Simple player that reveals the first hidden cell in row-major order.
pub struct SimplePlayer {
    name: String,
}

impl SimplePlayer {
    /// Creates a new simple player.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Player for SimplePlayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn next_move(&mut self, game: &Game<InProgress>) -> Option<Move> {
        let cell = game.valid_moves().into_iter().next()?;
        debug!(player = %self.name, %cell, "Simple player chose cell");
        Some(Move::guess(cell))
    }

    fn observe(&mut self, _cell: Cell, _count: u8) -> Result<(), KnowledgeError> {
        Ok(())
    }

    fn flags(&self) -> BTreeSet<Cell> {
        BTreeSet::new()
    }
}
