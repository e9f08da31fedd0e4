//! Pure minesweeper logic with a propositional knowledge-base agent.
//!
//! The agent never sees the mine field. It receives `(cell, count)`
//! observations and deduces which cells are provably mines or provably safe.
//!
//! # Architecture
//!
//! - **Sentence**: "exactly `count` of these cells are mines"
//! - **KnowledgeBase**: live sentences, direct resolution, subset elimination
//!   and the fixpoint loop
//! - **Agent**: global mine/safe/move sets and move selection
//! - **Minefield** / **Game**: the ground truth and a typestate game over it
//!
//! # Example
//!
//! ```
//! use strictly_minesweeper::{Agent, Cell};
//!
//! # fn main() -> Result<(), strictly_minesweeper::KnowledgeError> {
//! let mut agent = Agent::new(3, 3);
//! agent.record_observation(Cell::new(1, 1), 0)?;
//!
//! // A zero count clears every neighbour.
//! assert!(agent.is_known_safe(Cell::new(0, 0)));
//! assert_eq!(agent.safe_move(), Some(Cell::new(0, 0)));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod agent;
mod cell;
mod error;
mod game;
pub mod invariants;
mod knowledge;
mod minefield;
mod sentence;

pub use agent::{Agent, Observation};
pub use cell::Cell;
pub use error::{KnowledgeError, KnowledgeErrorKind};
pub use game::{Game, GameTransition, InProgress, Lost, RevealError, Won};
pub use invariants::{AgentInvariants, Invariant, InvariantSet, InvariantViolation};
pub use knowledge::{Deductions, KnowledgeBase, Mark, DEFAULT_MAX_PASSES};
pub use minefield::{Minefield, MinefieldError};
pub use sentence::Sentence;
