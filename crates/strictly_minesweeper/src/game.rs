//! Phase-typed minesweeper game.
//!
//! A game only accepts reveals while it is [`InProgress`]. Revealing a mine
//! consumes the game and yields a [`Lost`] game that always knows which cell
//! detonated; revealing the last safe cell yields a [`Won`] game.

use crate::{Cell, Minefield};
use derive_more::Display;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, instrument};

// ─────────────────────────────────────────────────────────────
//  Phases
// ─────────────────────────────────────────────────────────────

/// Game can accept reveals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InProgress;

/// Every safe cell has been revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Won;

/// A mine was revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lost {
    detonated: Cell,
}

/// Errors that can occur when revealing a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum RevealError {
    /// Cell lies outside the grid.
    #[display("Cell {} is outside the grid", _0)]
    OutOfBounds(Cell),

    /// Cell has already been revealed.
    #[display("Cell {} is already revealed", _0)]
    AlreadyRevealed(Cell),
}

impl std::error::Error for RevealError {}

// ─────────────────────────────────────────────────────────────
//  Game
// ─────────────────────────────────────────────────────────────

/// A minesweeper game in phase `S`.
#[derive(Debug, Clone)]
pub struct Game<S> {
    minefield: Minefield,
    revealed: BTreeMap<Cell, u8>,
    history: Vec<Cell>,
    phase: S,
}

impl<S> Game<S> {
    /// The hidden truth.
    pub fn minefield(&self) -> &Minefield {
        &self.minefield
    }

    /// Revealed safe cells with their adjacent mine counts.
    pub fn revealed(&self) -> &BTreeMap<Cell, u8> {
        &self.revealed
    }

    /// Cells in the order they were revealed.
    pub fn history(&self) -> &[Cell] {
        &self.history
    }

    /// Returns true if the cell has been revealed.
    pub fn is_revealed(&self, cell: Cell) -> bool {
        self.revealed.contains_key(&cell)
    }

    /// Grid height.
    pub fn height(&self) -> usize {
        self.minefield.height()
    }

    /// Grid width.
    pub fn width(&self) -> usize {
        self.minefield.width()
    }

    /// Returns true when the flagged cells are exactly the mines.
    pub fn all_mines_flagged(&self, flags: &BTreeSet<Cell>) -> bool {
        flags == self.minefield.mines()
    }

    /// Renders the board as seen by a player holding `flags`.
    ///
    /// Hidden cells are `#`, flagged cells `F`, revealed cells their count.
    pub fn render(&self, flags: &BTreeSet<Cell>) -> String {
        self.render_with(flags, None)
    }

    fn render_with(&self, flags: &BTreeSet<Cell>, detonated: Option<Cell>) -> String {
        let mut out = String::with_capacity(self.height() * (self.width() * 2 + 1));
        for row in 0..self.height() {
            for col in 0..self.width() {
                if col > 0 {
                    out.push(' ');
                }
                let cell = Cell::new(row, col);
                let symbol = if detonated == Some(cell) {
                    '*'
                } else if let Some(count) = self.revealed.get(&cell) {
                    char::from(b'0' + count)
                } else if flags.contains(&cell) {
                    'F'
                } else {
                    '#'
                };
                out.push(symbol);
            }
            out.push('\n');
        }
        out
    }

    fn into_phase<T>(self, phase: T) -> Game<T> {
        Game {
            minefield: self.minefield,
            revealed: self.revealed,
            history: self.history,
            phase,
        }
    }
}

impl Game<InProgress> {
    /// Starts a game with nothing revealed.
    #[instrument(skip(minefield), fields(height = minefield.height(), width = minefield.width()))]
    pub fn new(minefield: Minefield) -> Self {
        Self {
            minefield,
            revealed: BTreeMap::new(),
            history: Vec::new(),
            phase: InProgress,
        }
    }

    /// Reveals a cell, consuming the game.
    ///
    /// # Errors
    ///
    /// Fails if the cell is off the grid or already revealed; the game is
    /// dropped in that case, so callers check [`Game::is_revealed`] first.
    #[instrument(skip(self))]
    pub fn reveal(mut self, cell: Cell) -> Result<GameTransition, RevealError> {
        if !self.minefield.contains(cell) {
            return Err(RevealError::OutOfBounds(cell));
        }
        if self.is_revealed(cell) {
            return Err(RevealError::AlreadyRevealed(cell));
        }

        self.history.push(cell);

        if self.minefield.is_mine(cell) {
            info!(%cell, moves = self.history.len(), "Mine detonated");
            return Ok(GameTransition::Lost(self.into_phase(Lost { detonated: cell })));
        }

        let count = self.minefield.nearby_mines(cell);
        self.revealed.insert(cell, count);
        debug!(%cell, count, "Revealed");

        if self.revealed.len() == self.minefield.safe_cell_count() {
            info!(moves = self.history.len(), "All safe cells revealed");
            return Ok(GameTransition::Won(self.into_phase(Won)));
        }

        Ok(GameTransition::InProgress { game: self, count })
    }

    /// Hidden cells in row-major order.
    pub fn valid_moves(&self) -> Vec<Cell> {
        Cell::all(self.height(), self.width())
            .filter(|cell| !self.is_revealed(*cell))
            .collect()
    }

    /// Count revealed at `cell`, if any.
    pub fn count(&self, cell: Cell) -> Option<u8> {
        self.revealed.get(&cell).copied()
    }
}

impl Game<Lost> {
    /// The mine that ended the game.
    pub fn detonated(&self) -> Cell {
        self.phase.detonated
    }

    /// Like [`Game::render`], with the detonated mine shown as `*`.
    pub fn render_detonation(&self, flags: &BTreeSet<Cell>) -> String {
        self.render_with(flags, Some(self.phase.detonated))
    }
}

/// Result of revealing a cell.
#[derive(Debug)]
pub enum GameTransition {
    /// Game continues; `count` is the revealed cell's adjacent mine count.
    InProgress {
        /// The continuing game.
        game: Game<InProgress>,
        /// Adjacent mines of the revealed cell.
        count: u8,
    },
    /// The last safe cell was revealed.
    Won(Game<Won>),
    /// A mine was revealed.
    Lost(Game<Lost>),
}
