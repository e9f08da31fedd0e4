//! Strictly Sweeper - minesweeper sessions for deducing agents
//!
//! Plays games of minesweeper with players from [`players`], on boards built
//! from a [`SweeperConfig`], and reports how they went.
//!
//! # Architecture
//!
//! - **Config**: board dimensions, mine count, seeds and agent limits (TOML)
//! - **Players**: the knowledge-base agent and a baseline that never reasons
//! - **Session**: drives one player through one typestate game; series runner
//!
//! # Example
//!
//! ```
//! use strictly_sweeper::{play_one, Outcome, PlayerKind, SweeperConfig};
//!
//! # fn main() -> Result<(), strictly_sweeper::SessionError> {
//! let config = SweeperConfig::default().with_height(4).with_width(4).with_mines(0);
//! let report = play_one(&config, PlayerKind::Knowledge, 7)?;
//! assert_eq!(*report.outcome(), Outcome::Won);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
pub mod players;
mod session;

pub use config::{ConfigError, SweeperConfig};
pub use players::{Certainty, KnowledgePlayer, Move, Player, PlayerKind, SimplePlayer};
pub use session::{
    play_one, run_series, GameReport, GameSession, Outcome, SeriesSummary, SessionError,
};

// Core game logic
pub use strictly_minesweeper::{
    Agent, Cell, Game, GameTransition, InProgress, KnowledgeBase, KnowledgeError, Lost, Minefield,
    Sentence, Won,
};
