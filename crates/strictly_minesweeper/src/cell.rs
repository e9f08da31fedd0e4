//! Grid coordinates.

use serde::{Deserialize, Serialize};

/// A `(row, col)` coordinate on the grid.
///
/// Cells order row-major, so ordered sets of cells iterate top-left to
/// bottom-right.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Cell {
    /// Row index, counted from the top.
    pub row: usize,
    /// Column index, counted from the left.
    pub col: usize,
}

impl Cell {
    /// Creates a cell.
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Returns true if the cell lies on a `height` x `width` grid.
    pub fn in_bounds(self, height: usize, width: usize) -> bool {
        self.row < height && self.col < width
    }

    /// Cells within one row and one column, clipped to the grid, excluding
    /// the cell itself. Yields at most 8 cells in row-major order.
    pub fn neighbors(self, height: usize, width: usize) -> impl Iterator<Item = Cell> {
        let rows = self.row.saturating_sub(1)..(self.row + 2).min(height);
        let cols = self.col.saturating_sub(1)..(self.col + 2).min(width);
        rows.flat_map(move |row| cols.clone().map(move |col| Cell::new(row, col)))
            .filter(move |cell| *cell != self)
    }

    /// Every cell of a `height` x `width` grid in row-major order.
    pub fn all(height: usize, width: usize) -> impl Iterator<Item = Cell> {
        (0..height).flat_map(move |row| (0..width).map(move |col| Cell::new(row, col)))
    }
}

impl From<(usize, usize)> for Cell {
    fn from((row, col): (usize, usize)) -> Self {
        Self::new(row, col)
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}
