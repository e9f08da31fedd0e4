//! Player backed by the deducing agent.

use super::{Move, Player};
use crate::SweeperConfig;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::BTreeSet;
use strictly_minesweeper::{Agent, Cell, Game, InProgress, KnowledgeBase, KnowledgeError};
use tracing::{debug, instrument};

/// Plays proven-safe cells first and guesses uniformly among unknown cells
/// otherwise.
pub struct KnowledgePlayer {
    name: String,
    agent: Agent,
    rng: StdRng,
}

impl KnowledgePlayer {
    /// Creates a player for the configured board; `seed` drives its guesses.
    #[instrument(skip(config))]
    pub fn new(config: &SweeperConfig, seed: u64) -> Self {
        let knowledge = KnowledgeBase::with_max_passes(*config.max_passes());
        let agent = Agent::with_knowledge(*config.height(), *config.width(), knowledge)
            .with_replay(*config.replay_observations());
        Self {
            name: "Knowledge".to_string(),
            agent,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// The agent's current state.
    pub fn agent(&self) -> &Agent {
        &self.agent
    }
}

impl Player for KnowledgePlayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn next_move(&mut self, _game: &Game<InProgress>) -> Option<Move> {
        if let Some(cell) = self.agent.safe_move() {
            debug!(%cell, "Playing proven safe cell");
            return Some(Move::safe(cell));
        }
        let cell = self.agent.random_move(&mut self.rng)?;
        debug!(%cell, revealed = self.agent.moves_made().len(), "No safe cell known, guessing");
        Some(Move::guess(cell))
    }

    fn observe(&mut self, cell: Cell, count: u8) -> Result<(), KnowledgeError> {
        self.agent.record_observation(cell, usize::from(count))
    }

    fn flags(&self) -> BTreeSet<Cell> {
        self.agent.mines().clone()
    }
}
