//! Logical sentences about the grid.

use crate::{Cell, KnowledgeError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::instrument;

/// The constraint "exactly `count` of these cells are mines".
///
/// `cells` only holds cells whose status the agent does not know yet, and
/// `count` is already adjusted for cells removed because they became known.
/// `count <= cells.len()` holds for every sentence that exists; operations
/// that would break it fail instead of clamping.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Sentence {
    cells: BTreeSet<Cell>,
    count: usize,
}

impl Sentence {
    /// Creates a sentence, rejecting counts larger than the cell set.
    ///
    /// # Errors
    ///
    /// Returns an invariant violation if `count > cells.len()`.
    #[track_caller]
    pub fn new(cells: impl IntoIterator<Item = Cell>, count: usize) -> Result<Self, KnowledgeError> {
        let cells: BTreeSet<Cell> = cells.into_iter().collect();
        if count > cells.len() {
            return Err(KnowledgeError::invariant(format!(
                "{count} mines cannot fit in {} cells",
                cells.len()
            )));
        }
        Ok(Self { cells, count })
    }

    /// Cells whose status this sentence constrains.
    pub fn cells(&self) -> &BTreeSet<Cell> {
        &self.cells
    }

    /// Number of mines among [`Sentence::cells`].
    pub fn count(&self) -> usize {
        self.count
    }

    /// Number of cells in the sentence.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// A sentence with no cells carries no information.
    pub fn is_vacuous(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns every cell when all of them must be mines.
    pub fn known_mines(&self) -> Option<&BTreeSet<Cell>> {
        (!self.cells.is_empty() && self.cells.len() == self.count).then_some(&self.cells)
    }

    /// Returns every cell when none of them can be a mine.
    ///
    /// A vacuous sentence yields `Some` of an empty set, which means nothing
    /// to do rather than a safe cell found.
    pub fn known_safes(&self) -> Option<&BTreeSet<Cell>> {
        (self.count == 0).then_some(&self.cells)
    }

    /// Removes a mine from the sentence, decrementing the count.
    ///
    /// Returns whether the sentence changed.
    ///
    /// # Errors
    ///
    /// Returns an invariant violation if the sentence claims no mines but
    /// contains `cell`.
    #[instrument(level = "trace", skip(self))]
    pub fn mark_mine(&mut self, cell: Cell) -> Result<bool, KnowledgeError> {
        if !self.cells.contains(&cell) {
            return Ok(false);
        }
        let Some(count) = self.count.checked_sub(1) else {
            return Err(KnowledgeError::invariant(format!(
                "mine {cell} lies in {self}, which holds no mines"
            )));
        };
        self.cells.remove(&cell);
        self.count = count;
        Ok(true)
    }

    /// Removes a safe cell from the sentence; the count is unchanged.
    ///
    /// Returns whether the sentence changed.
    ///
    /// # Errors
    ///
    /// Returns an invariant violation if every cell of the sentence is a
    /// mine but `cell` is among them.
    #[instrument(level = "trace", skip(self))]
    pub fn mark_safe(&mut self, cell: Cell) -> Result<bool, KnowledgeError> {
        if !self.cells.contains(&cell) {
            return Ok(false);
        }
        if self.count >= self.cells.len() {
            return Err(KnowledgeError::invariant(format!(
                "safe cell {cell} lies in {self}, where every cell is a mine"
            )));
        }
        self.cells.remove(&cell);
        Ok(true)
    }
}

impl std::fmt::Display for Sentence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (idx, cell) in self.cells.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{cell}")?;
        }
        write!(f, "}} = {}", self.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::KnowledgeErrorKind;

    fn cells(coords: &[(usize, usize)]) -> Vec<Cell> {
        coords.iter().copied().map(Cell::from).collect()
    }

    #[test]
    fn test_rejects_overfull_count() {
        let err = Sentence::new(cells(&[(0, 0)]), 2).unwrap_err();
        assert!(matches!(err.kind(), KnowledgeErrorKind::InvariantViolation(_)));
    }

    #[test]
    fn test_all_mines_rule() {
        let sentence = Sentence::new(cells(&[(0, 0), (0, 1)]), 2).unwrap();
        assert_eq!(sentence.known_mines().map(|c| c.len()), Some(2));
        assert_eq!(sentence.known_safes(), None);
    }

    #[test]
    fn test_all_safe_rule() {
        let sentence = Sentence::new(cells(&[(0, 0), (0, 1)]), 0).unwrap();
        assert_eq!(sentence.known_safes().map(|c| c.len()), Some(2));
        assert_eq!(sentence.known_mines(), None);
    }

    #[test]
    fn test_vacuous_sentence_resolves_to_nothing() {
        let sentence = Sentence::new(Vec::new(), 0).unwrap();
        assert!(sentence.is_vacuous());
        assert_eq!(sentence.known_mines(), None);
        assert!(sentence.known_safes().is_some_and(|c| c.is_empty()));
    }

    #[test]
    fn test_undetermined_sentence() {
        let sentence = Sentence::new(cells(&[(0, 0), (0, 1), (0, 2)]), 1).unwrap();
        assert_eq!(sentence.known_mines(), None);
        assert_eq!(sentence.known_safes(), None);
    }

    #[test]
    fn test_mark_mine_shrinks_by_one() {
        let mut sentence = Sentence::new(cells(&[(0, 0), (0, 1), (0, 2)]), 2).unwrap();
        assert!(sentence.mark_mine(Cell::new(0, 1)).unwrap());
        assert_eq!(sentence.cells().len(), 2);
        assert_eq!(sentence.count(), 1);
        assert!(sentence.cells().contains(&Cell::new(0, 0)));
        assert!(sentence.cells().contains(&Cell::new(0, 2)));
    }

    #[test]
    fn test_mark_safe_keeps_count() {
        let mut sentence = Sentence::new(cells(&[(0, 0), (0, 1), (0, 2)]), 1).unwrap();
        assert!(sentence.mark_safe(Cell::new(0, 0)).unwrap());
        assert_eq!(sentence.len(), 2);
        assert_eq!(sentence.count(), 1);
    }

    #[test]
    fn test_marking_absent_cell_is_noop() {
        let mut sentence = Sentence::new(cells(&[(0, 0)]), 1).unwrap();
        let before = sentence.clone();
        assert!(!sentence.mark_safe(Cell::new(5, 5)).unwrap());
        assert!(!sentence.mark_mine(Cell::new(5, 5)).unwrap());
        assert_eq!(sentence, before);
    }

    #[test]
    fn test_last_mine_leaves_zero_count() {
        let mut sentence = Sentence::new(cells(&[(0, 0)]), 1).unwrap();
        sentence.mark_mine(Cell::new(0, 0)).unwrap();
        assert!(sentence.is_vacuous());
        assert_eq!(sentence.count(), 0);
    }

    #[test]
    fn test_mine_in_mine_free_sentence_fails() {
        let mut sentence = Sentence::new(cells(&[(0, 0), (0, 1)]), 0).unwrap();
        assert!(sentence.mark_mine(Cell::new(0, 0)).is_err());
    }

    #[test]
    fn test_safe_in_all_mine_sentence_fails() {
        let mut sentence = Sentence::new(cells(&[(0, 0), (0, 1)]), 2).unwrap();
        assert!(sentence.mark_safe(Cell::new(0, 0)).is_err());
    }

    #[test]
    fn test_display() {
        let sentence = Sentence::new(cells(&[(0, 1), (0, 0)]), 1).unwrap();
        assert_eq!(sentence.to_string(), "{(0, 0), (0, 1)} = 1");
    }
}
