//! The deducing agent and its move-decision surface.

use crate::invariants::{AgentInvariants, InvariantSet};
use crate::{Cell, Deductions, KnowledgeBase, KnowledgeError, KnowledgeErrorKind, Mark, Sentence};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info, instrument, warn};

/// A raw `(cell, count)` observation as received from the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Observation {
    /// The revealed cell.
    pub cell: Cell,
    /// Number of mines among the cell's neighbours.
    pub count: usize,
}

/// Player state for one game.
///
/// Cells move from unknown to safe or mine and never back. The agent keeps
/// its knowledge base at a fixpoint between calls, so the query methods
/// always reflect everything deducible from the observations so far.
///
/// Not safe for concurrent use; one agent per game, driven from a single
/// loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Agent {
    height: usize,
    width: usize,
    pub(crate) moves_made: BTreeSet<Cell>,
    pub(crate) safes: BTreeSet<Cell>,
    pub(crate) mines: BTreeSet<Cell>,
    knowledge: KnowledgeBase,
    observations: Vec<Observation>,
    replay_observations: bool,
}

impl Agent {
    /// Creates an agent for a `height` x `width` grid.
    #[instrument]
    pub fn new(height: usize, width: usize) -> Self {
        Self::with_knowledge(height, width, KnowledgeBase::new())
    }

    /// Creates an agent around an existing (usually empty) knowledge base.
    #[instrument(skip(knowledge))]
    pub fn with_knowledge(height: usize, width: usize, knowledge: KnowledgeBase) -> Self {
        Self {
            height,
            width,
            moves_made: BTreeSet::new(),
            safes: BTreeSet::new(),
            mines: BTreeSet::new(),
            knowledge,
            observations: Vec::new(),
            replay_observations: false,
        }
    }

    /// Replays the observation log after every new observation.
    pub fn with_replay(mut self, replay_observations: bool) -> Self {
        self.replay_observations = replay_observations;
        self
    }

    /// Records that `cell` was revealed with `count` neighbouring mines.
    ///
    /// Marks the cell safe, adds a sentence over its unknown neighbours and
    /// settles the knowledge base. Observing the same cell twice is a no-op.
    /// A rejected observation leaves the agent as it was.
    ///
    /// # Errors
    ///
    /// Fails for cells outside the grid, for cells known to be mines, and
    /// for counts that contradict what is already known.
    #[instrument(skip(self))]
    pub fn record_observation(&mut self, cell: Cell, count: usize) -> Result<(), KnowledgeError> {
        self.check_bounds(cell)?;
        if self.moves_made.contains(&cell) {
            debug!("Cell already observed, ignoring");
            return Ok(());
        }
        if self.mines.contains(&cell) {
            return Err(KnowledgeError::contradiction(cell));
        }

        // A cell is never its own neighbour, so the sentence does not
        // depend on marking `cell` safe first.
        let sentence = self.neighbor_sentence(cell, count)?;

        let before = self.clone();
        let result = self.commit_observation(cell, count, sentence);
        if result.is_err() {
            warn!(%cell, count, "Observation rejected, restoring previous state");
            *self = before;
        }
        result
    }

    fn commit_observation(
        &mut self,
        cell: Cell,
        count: usize,
        sentence: Option<Sentence>,
    ) -> Result<(), KnowledgeError> {
        self.moves_made.insert(cell);
        self.classify(cell, Mark::Safe)?;

        let seed = match sentence {
            Some(sentence) => self.knowledge.ingest(sentence)?,
            None => Deductions::new(),
        };
        self.settle(seed)?;
        self.observations.push(Observation { cell, count });

        if self.replay_observations {
            self.replay()?;
        }
        self.check_invariants()
    }

    /// Re-derives every logged observation against current knowledge.
    ///
    /// Sentences that now resolve directly are applied and the knowledge
    /// base settled, until a round changes nothing. Returns whether anything
    /// was learned; replaying a settled state returns `false`.
    ///
    /// # Errors
    ///
    /// Fails on contradictory knowledge or when rounds exceed the knowledge
    /// base's pass limit.
    #[instrument(skip(self), fields(observations = self.observations.len()))]
    pub fn replay(&mut self) -> Result<bool, KnowledgeError> {
        let mut changed = false;
        for _ in 0..self.knowledge.max_passes() {
            let mut seed = Deductions::new();
            for observation in &self.observations {
                if let Some(sentence) = self.neighbor_sentence(observation.cell, observation.count)? {
                    if let Some(resolved) = Deductions::resolve(&sentence) {
                        seed.absorb(resolved)?;
                    }
                }
            }
            if seed.is_empty() {
                return Ok(changed);
            }
            debug!(resolved = seed.len(), "Replay resolved observations");
            changed = true;
            self.settle(seed)?;
        }
        Err(KnowledgeError::new(KnowledgeErrorKind::IterationLimit(
            self.knowledge.max_passes(),
        )))
    }

    /// Marks a cell as a mine everywhere and settles the knowledge base.
    ///
    /// Returns `false` if the cell was already a known mine.
    ///
    /// # Errors
    ///
    /// Fails if the cell is outside the grid or known to be safe.
    #[instrument(skip(self))]
    pub fn mark_mine(&mut self, cell: Cell) -> Result<bool, KnowledgeError> {
        self.mark(cell, Mark::Mine)
    }

    /// Marks a cell as safe everywhere and settles the knowledge base.
    ///
    /// Returns `false` if the cell was already known safe.
    ///
    /// # Errors
    ///
    /// Fails if the cell is outside the grid or a known mine.
    #[instrument(skip(self))]
    pub fn mark_safe(&mut self, cell: Cell) -> Result<bool, KnowledgeError> {
        self.mark(cell, Mark::Safe)
    }

    /// A known safe cell that has not been revealed yet.
    ///
    /// Picks the first such cell in row-major order, so repeated calls on
    /// unchanged state agree.
    pub fn safe_move(&self) -> Option<Cell> {
        self.safes.difference(&self.moves_made).next().copied()
    }

    /// A uniformly random cell that is not revealed and not known to be
    /// either safe or a mine.
    ///
    /// Meant for when [`Agent::safe_move`] has nothing to offer.
    pub fn random_move<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Cell> {
        let candidates: Vec<Cell> = self
            .all_cells()
            .filter(|cell| {
                !self.safes.contains(cell)
                    && !self.moves_made.contains(cell)
                    && !self.mines.contains(cell)
            })
            .collect();
        candidates.choose(rng).copied()
    }

    /// A safe move if one is known, otherwise a random one.
    pub fn next_move<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Cell> {
        self.safe_move().or_else(|| self.random_move(rng))
    }

    /// Returns true if the cell is a known mine.
    pub fn is_known_mine(&self, cell: Cell) -> bool {
        self.mines.contains(&cell)
    }

    /// Returns true if the cell is known safe.
    pub fn is_known_safe(&self, cell: Cell) -> bool {
        self.safes.contains(&cell)
    }

    /// Returns true if the cell has been revealed.
    pub fn has_made_move(&self, cell: Cell) -> bool {
        self.moves_made.contains(&cell)
    }

    /// Known mines.
    pub fn mines(&self) -> &BTreeSet<Cell> {
        &self.mines
    }

    /// Known safe cells, revealed or not.
    pub fn safes(&self) -> &BTreeSet<Cell> {
        &self.safes
    }

    /// Revealed cells.
    pub fn moves_made(&self) -> &BTreeSet<Cell> {
        &self.moves_made
    }

    /// The knowledge base.
    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    /// Every observation received, in order.
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Grid height.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Grid width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Every cell of the grid in row-major order.
    pub fn all_cells(&self) -> impl Iterator<Item = Cell> {
        Cell::all(self.height, self.width)
    }

    fn mark(&mut self, cell: Cell, mark: Mark) -> Result<bool, KnowledgeError> {
        self.check_bounds(cell)?;
        if !self.classify(cell, mark)? {
            debug!("Cell already classified, ignoring");
            return Ok(false);
        }
        self.settle(Deductions::new())?;
        self.check_invariants()?;
        Ok(true)
    }

    /// Adds a classification to the global sets and to every sentence.
    fn classify(&mut self, cell: Cell, mark: Mark) -> Result<bool, KnowledgeError> {
        if !self.record(cell, mark)? {
            return Ok(false);
        }
        self.knowledge.apply_mark(cell, mark)?;
        Ok(true)
    }

    /// Adds a classification to the global sets only.
    fn record(&mut self, cell: Cell, mark: Mark) -> Result<bool, KnowledgeError> {
        let (own, other) = match mark {
            Mark::Mine => (&mut self.mines, &self.safes),
            Mark::Safe => (&mut self.safes, &self.mines),
        };
        if other.contains(&cell) {
            return Err(KnowledgeError::contradiction(cell));
        }
        Ok(own.insert(cell))
    }

    /// Settles the knowledge base and merges what it learned.
    fn settle(&mut self, seed: Deductions) -> Result<(), KnowledgeError> {
        let learned = self.knowledge.settle(seed)?;
        let mut mines = 0;
        let mut safes = 0;
        for (cell, mark) in learned.iter() {
            if self.record(cell, mark)? {
                match mark {
                    Mark::Mine => mines += 1,
                    Mark::Safe => safes += 1,
                }
            }
        }
        if mines + safes > 0 {
            info!(mines, safes, "Deduced new cells");
        }
        Ok(())
    }

    /// Sentence over the unknown neighbours of an observed cell.
    ///
    /// Known mines are subtracted from `count`; known cells are left out.
    /// Returns `None` when every neighbour is already known.
    fn neighbor_sentence(&self, cell: Cell, count: usize) -> Result<Option<Sentence>, KnowledgeError> {
        let mut remaining = count;
        let mut cells = BTreeSet::new();
        for neighbor in cell.neighbors(self.height, self.width) {
            if self.mines.contains(&neighbor) {
                let Some(left) = remaining.checked_sub(1) else {
                    return Err(KnowledgeError::invariant(format!(
                        "{cell} reports {count} mines but has more known mine neighbours"
                    )));
                };
                remaining = left;
            } else if !self.safes.contains(&neighbor) {
                cells.insert(neighbor);
            }
        }

        if cells.is_empty() {
            if remaining > 0 {
                return Err(KnowledgeError::invariant(format!(
                    "{cell} reports {count} mines but only has known neighbours"
                )));
            }
            return Ok(None);
        }
        Sentence::new(cells, remaining).map(Some)
    }

    fn check_bounds(&self, cell: Cell) -> Result<(), KnowledgeError> {
        if cell.in_bounds(self.height, self.width) {
            Ok(())
        } else {
            Err(KnowledgeError::out_of_bounds(cell))
        }
    }

    fn check_invariants(&self) -> Result<(), KnowledgeError> {
        AgentInvariants::check_all(self).map_err(|violations| {
            let descriptions = violations
                .iter()
                .map(|v| v.description.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            warn!(%descriptions, "Agent invariants violated");
            KnowledgeError::invariant(descriptions)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_observation_marks_cell_safe() {
        let mut agent = Agent::new(3, 3);
        agent.record_observation(Cell::new(1, 1), 1).unwrap();

        assert!(agent.has_made_move(Cell::new(1, 1)));
        assert!(agent.is_known_safe(Cell::new(1, 1)));
        assert_eq!(agent.observations().len(), 1);
        assert_eq!(agent.knowledge().len(), 1);
    }

    #[test]
    fn test_zero_count_clears_neighbors() {
        let mut agent = Agent::new(3, 3);
        agent.record_observation(Cell::new(0, 0), 0).unwrap();

        for cell in [Cell::new(0, 1), Cell::new(1, 0), Cell::new(1, 1)] {
            assert!(agent.is_known_safe(cell));
        }
        assert!(agent.knowledge().is_empty());
    }

    #[test]
    fn test_repeated_observation_is_noop() {
        let mut agent = Agent::new(3, 3);
        agent.record_observation(Cell::new(1, 1), 1).unwrap();
        let before = agent.clone();

        agent.record_observation(Cell::new(1, 1), 1).unwrap();
        assert_eq!(agent, before);
    }

    #[test]
    fn test_out_of_bounds_observation_fails() {
        let mut agent = Agent::new(3, 3);
        let err = agent.record_observation(Cell::new(3, 0), 0).unwrap_err();
        assert_eq!(err.kind(), &KnowledgeErrorKind::OutOfBounds(Cell::new(3, 0)));
    }

    #[test]
    fn test_observing_known_mine_fails() {
        let mut agent = Agent::new(3, 3);
        agent.mark_mine(Cell::new(0, 0)).unwrap();
        let err = agent.record_observation(Cell::new(0, 0), 0).unwrap_err();
        assert_eq!(err.kind(), &KnowledgeErrorKind::Contradiction(Cell::new(0, 0)));
    }

    #[test]
    fn test_impossible_count_fails() {
        let mut agent = Agent::new(3, 3);
        // A corner has three neighbours.
        assert!(agent.record_observation(Cell::new(0, 0), 4).is_err());
    }

    #[test]
    fn test_rejected_observation_leaves_no_trace() {
        let mut agent = Agent::new(3, 3);
        let before = agent.clone();
        assert!(agent.record_observation(Cell::new(0, 0), 4).is_err());
        assert_eq!(agent, before);

        agent.record_observation(Cell::new(0, 0), 1).unwrap();
        assert!(agent.has_made_move(Cell::new(0, 0)));
        assert_eq!(agent.observations().len(), 1);
        assert_eq!(agent.knowledge().len(), 1);
    }

    #[test]
    fn test_failed_settle_rolls_back() {
        let knowledge = KnowledgeBase::with_max_passes(1);
        let mut agent = Agent::with_knowledge(3, 3, knowledge);
        agent.record_observation(Cell::new(0, 0), 1).unwrap();
        let before = agent.clone();

        // Clearing (1, 2) resolves the corner's sentence, which needs a
        // second pass.
        let err = agent.record_observation(Cell::new(1, 2), 0).unwrap_err();
        assert_eq!(err.kind(), &KnowledgeErrorKind::IterationLimit(1));
        assert_eq!(agent, before);
    }

    #[test]
    fn test_known_mines_are_subtracted() {
        let mut agent = Agent::new(3, 3);
        agent.mark_mine(Cell::new(0, 1)).unwrap();
        agent.record_observation(Cell::new(0, 0), 1).unwrap();

        // The single mine is accounted for, so the rest are safe.
        assert!(agent.is_known_safe(Cell::new(1, 0)));
        assert!(agent.is_known_safe(Cell::new(1, 1)));
    }

    #[test]
    fn test_marks_are_idempotent() {
        let mut agent = Agent::new(3, 3);
        agent.record_observation(Cell::new(1, 1), 2).unwrap();

        assert!(agent.mark_mine(Cell::new(0, 0)).unwrap());
        let once = agent.clone();
        assert!(!agent.mark_mine(Cell::new(0, 0)).unwrap());
        assert_eq!(agent, once);

        assert!(agent.mark_safe(Cell::new(2, 2)).unwrap());
        let once = agent.clone();
        assert!(!agent.mark_safe(Cell::new(2, 2)).unwrap());
        assert_eq!(agent, once);
    }

    #[test]
    fn test_opposite_mark_is_contradiction() {
        let mut agent = Agent::new(3, 3);
        agent.mark_safe(Cell::new(2, 2)).unwrap();
        assert!(agent.mark_mine(Cell::new(2, 2)).is_err());
    }

    #[test]
    fn test_safe_move_is_stable() {
        let mut agent = Agent::new(3, 3);
        agent.record_observation(Cell::new(1, 1), 0).unwrap();

        let first = agent.safe_move();
        assert_eq!(first, Some(Cell::new(0, 0)));
        assert_eq!(agent.safe_move(), first);
    }

    #[test]
    fn test_random_move_avoids_known_cells() {
        let mut agent = Agent::new(2, 2);
        agent.mark_mine(Cell::new(0, 0)).unwrap();
        agent.mark_safe(Cell::new(0, 1)).unwrap();

        let unknown = [Cell::new(1, 0), Cell::new(1, 1)];
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let cell = agent.random_move(&mut rng).unwrap();
            assert!(unknown.contains(&cell), "picked {cell}");
        }
    }

    #[test]
    fn test_random_move_exhausted() {
        let mut agent = Agent::new(1, 2);
        agent.record_observation(Cell::new(0, 0), 1).unwrap();
        assert!(agent.is_known_mine(Cell::new(0, 1)));

        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(agent.safe_move(), None);
        assert_eq!(agent.random_move(&mut rng), None);
        assert_eq!(agent.next_move(&mut rng), None);
    }

    #[test]
    fn test_next_move_prefers_safe_cells() {
        let mut agent = Agent::new(3, 3);
        agent.record_observation(Cell::new(0, 0), 0).unwrap();

        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(agent.next_move(&mut rng), agent.safe_move());
    }

    #[test]
    fn test_replay_on_settled_state_is_noop() {
        let mut agent = Agent::new(3, 3).with_replay(true);
        agent.record_observation(Cell::new(1, 1), 1).unwrap();
        agent.record_observation(Cell::new(2, 2), 0).unwrap();

        let before = agent.clone();
        assert!(!agent.replay().unwrap());
        assert_eq!(agent, before);
    }
}
