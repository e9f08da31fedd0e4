//! Knowledge base error types.

use crate::Cell;
use derive_more::{Display, Error};
use tracing::instrument;

/// What went wrong while reasoning about the grid.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum KnowledgeErrorKind {
    /// A sentence would hold a negative count or more mines than cells.
    #[display("Invariant violation: {}", _0)]
    InvariantViolation(String),

    /// A cell was classified as both a mine and safe.
    #[display("Cell {} is classified as both a mine and safe", _0)]
    Contradiction(Cell),

    /// A cell lies outside the grid.
    #[display("Cell {} is outside the grid", _0)]
    OutOfBounds(Cell),

    /// The fixpoint loop did not settle within its pass limit.
    #[display("Knowledge did not settle within {} passes", _0)]
    IterationLimit(usize),
}

/// Knowledge error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Knowledge error: {} at {}:{}", kind, file, line)]
pub struct KnowledgeError {
    /// Error kind.
    pub kind: KnowledgeErrorKind,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl KnowledgeError {
    /// Creates a new knowledge error with caller location tracking.
    #[track_caller]
    #[instrument]
    pub fn new(kind: KnowledgeErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Shorthand for [`KnowledgeErrorKind::InvariantViolation`].
    #[track_caller]
    pub fn invariant(message: impl Into<String>) -> Self {
        Self::new(KnowledgeErrorKind::InvariantViolation(message.into()))
    }

    /// Shorthand for [`KnowledgeErrorKind::Contradiction`].
    #[track_caller]
    pub fn contradiction(cell: Cell) -> Self {
        Self::new(KnowledgeErrorKind::Contradiction(cell))
    }

    /// Shorthand for [`KnowledgeErrorKind::OutOfBounds`].
    #[track_caller]
    pub fn out_of_bounds(cell: Cell) -> Self {
        Self::new(KnowledgeErrorKind::OutOfBounds(cell))
    }

    /// Returns the error kind.
    pub fn kind(&self) -> &KnowledgeErrorKind {
        &self.kind
    }
}
