//! Ground truth: where the mines are.

use crate::Cell;
use derive_more::Display;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::instrument;

/// Errors that can occur when building a mine field.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum MinefieldError {
    /// The grid has no cells.
    #[display("Mine field must have at least one row and one column")]
    EmptyGrid,

    /// More mines were requested than the grid has cells.
    #[display("Cannot place {} mines on {} cells", requested, cells)]
    TooManyMines {
        /// Mines requested.
        requested: usize,
        /// Cells available.
        cells: usize,
    },

    /// A mine was placed outside the grid.
    #[display("Mine {} is outside the grid", _0)]
    MineOutOfBounds(Cell),
}

impl std::error::Error for MinefieldError {}

/// A `height` x `width` grid with a fixed set of mined cells.
///
/// Doubles as the adjacency-count oracle: [`Minefield::nearby_mines`] turns
/// a cell into the count an agent observes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Minefield {
    height: usize,
    width: usize,
    mines: BTreeSet<Cell>,
}

impl Minefield {
    /// Creates a mine field with mines at the given cells.
    ///
    /// # Errors
    ///
    /// Fails for an empty grid or a mine outside it.
    #[instrument(skip(mines))]
    pub fn new(
        height: usize,
        width: usize,
        mines: impl IntoIterator<Item = Cell>,
    ) -> Result<Self, MinefieldError> {
        if height == 0 || width == 0 {
            return Err(MinefieldError::EmptyGrid);
        }
        let mines: BTreeSet<Cell> = mines.into_iter().collect();
        if let Some(outside) = mines.iter().find(|cell| !cell.in_bounds(height, width)) {
            return Err(MinefieldError::MineOutOfBounds(*outside));
        }
        Ok(Self {
            height,
            width,
            mines,
        })
    }

    /// Places `mine_count` mines uniformly at random.
    ///
    /// # Errors
    ///
    /// Fails for an empty grid or when there are more mines than cells.
    #[instrument(skip(rng))]
    pub fn random<R: Rng + ?Sized>(
        height: usize,
        width: usize,
        mine_count: usize,
        rng: &mut R,
    ) -> Result<Self, MinefieldError> {
        if height == 0 || width == 0 {
            return Err(MinefieldError::EmptyGrid);
        }
        let cells = height * width;
        if mine_count > cells {
            return Err(MinefieldError::TooManyMines {
                requested: mine_count,
                cells,
            });
        }

        // Row-major index to cell.
        let mines = rand::seq::index::sample(rng, cells, mine_count)
            .into_iter()
            .map(|idx| Cell::new(idx / width, idx % width));
        Self::new(height, width, mines)
    }

    /// Grid height.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Grid width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// The mined cells.
    pub fn mines(&self) -> &BTreeSet<Cell> {
        &self.mines
    }

    /// Number of mines.
    pub fn mine_count(&self) -> usize {
        self.mines.len()
    }

    /// Number of cells without a mine.
    pub fn safe_cell_count(&self) -> usize {
        self.height * self.width - self.mines.len()
    }

    /// Returns true if the cell lies on the grid.
    pub fn contains(&self, cell: Cell) -> bool {
        cell.in_bounds(self.height, self.width)
    }

    /// Returns true if the cell holds a mine.
    pub fn is_mine(&self, cell: Cell) -> bool {
        self.mines.contains(&cell)
    }

    /// Number of mines within one row and column of `cell`, not counting
    /// the cell itself.
    pub fn nearby_mines(&self, cell: Cell) -> u8 {
        let count = cell
            .neighbors(self.height, self.width)
            .filter(|neighbor| self.is_mine(*neighbor))
            .count();
        // At most eight neighbours.
        count as u8
    }
}

impl std::fmt::Display for Minefield {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in 0..self.height {
            for col in 0..self.width {
                if col > 0 {
                    write!(f, " ")?;
                }
                let symbol = if self.is_mine(Cell::new(row, col)) { 'X' } else { '.' };
                write!(f, "{symbol}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
