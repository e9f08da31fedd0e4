//! The knowledge base: live sentences and the rules that combine them.
//!
//! Two rules produce knowledge:
//!
//! - **Direct resolution** classifies every cell of a sentence whose count
//!   is zero (all safe) or equals its size (all mines).
//! - **Subset elimination** takes two sentences where one cell set contains
//!   the other and derives a sentence over the set difference, carrying the
//!   difference of their counts.
//!
//! [`KnowledgeBase::settle`] alternates mark propagation, resolution and
//! elimination until a pass changes nothing.

use crate::{Cell, KnowledgeError, KnowledgeErrorKind, Sentence};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use tracing::{debug, instrument, trace};

/// Pass limit for [`KnowledgeBase::settle`].
pub const DEFAULT_MAX_PASSES: usize = 4096;

/// Classification of a cell.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
pub enum Mark {
    /// The cell holds a mine.
    Mine,
    /// The cell is safe to reveal.
    Safe,
}

/// Cells classified by one or more resolution steps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deductions {
    mines: BTreeSet<Cell>,
    safes: BTreeSet<Cell>,
}

impl Deductions {
    /// Creates an empty set of deductions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies direct resolution to one sentence.
    ///
    /// Returns `None` for vacuous or undetermined sentences.
    pub fn resolve(sentence: &Sentence) -> Option<Self> {
        if sentence.is_vacuous() {
            return None;
        }
        if let Some(mines) = sentence.known_mines() {
            return Some(Self {
                mines: mines.clone(),
                safes: BTreeSet::new(),
            });
        }
        sentence.known_safes().map(|safes| Self {
            mines: BTreeSet::new(),
            safes: safes.clone(),
        })
    }

    /// Cells deduced to be mines.
    pub fn mines(&self) -> &BTreeSet<Cell> {
        &self.mines
    }

    /// Cells deduced to be safe.
    pub fn safes(&self) -> &BTreeSet<Cell> {
        &self.safes
    }

    /// Returns true if nothing was deduced.
    pub fn is_empty(&self) -> bool {
        self.mines.is_empty() && self.safes.is_empty()
    }

    /// Number of classified cells.
    pub fn len(&self) -> usize {
        self.mines.len() + self.safes.len()
    }

    /// Records a classification; returns whether it was new.
    ///
    /// # Errors
    ///
    /// Returns a contradiction if the cell already has the opposite mark.
    #[track_caller]
    pub fn insert(&mut self, cell: Cell, mark: Mark) -> Result<bool, KnowledgeError> {
        let (own, other) = match mark {
            Mark::Mine => (&mut self.mines, &self.safes),
            Mark::Safe => (&mut self.safes, &self.mines),
        };
        if other.contains(&cell) {
            return Err(KnowledgeError::contradiction(cell));
        }
        Ok(own.insert(cell))
    }

    /// Merges another set of deductions into this one.
    ///
    /// # Errors
    ///
    /// Returns a contradiction if the two sets disagree about a cell.
    #[track_caller]
    pub fn absorb(&mut self, other: Deductions) -> Result<(), KnowledgeError> {
        for (cell, mark) in other.iter() {
            self.insert(cell, mark)?;
        }
        Ok(())
    }

    /// Every classification, mines first, each group in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Cell, Mark)> + '_ {
        self.mines
            .iter()
            .map(|cell| (*cell, Mark::Mine))
            .chain(self.safes.iter().map(|cell| (*cell, Mark::Safe)))
    }
}

/// Ordered collection of live sentences under a single owner.
///
/// Sentences are mutated only through [`KnowledgeBase::apply_mark`], so
/// removing a cell from every sentence is one operation. Cell sets produced
/// by subset elimination are remembered and never derived twice, which
/// bounds the work of the fixpoint loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnowledgeBase {
    sentences: Vec<Sentence>,
    derived: BTreeSet<BTreeSet<Cell>>,
    max_passes: usize,
    revision: u64,
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::new()
    }
}

impl KnowledgeBase {
    /// Creates an empty knowledge base with [`DEFAULT_MAX_PASSES`].
    pub fn new() -> Self {
        Self::with_max_passes(DEFAULT_MAX_PASSES)
    }

    /// Creates an empty knowledge base with a custom pass limit.
    pub fn with_max_passes(max_passes: usize) -> Self {
        Self {
            sentences: Vec::new(),
            derived: BTreeSet::new(),
            max_passes: max_passes.max(1),
            revision: 0,
        }
    }

    /// Live sentences in insertion order.
    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }

    /// Number of live sentences.
    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    /// Returns true if no sentence is live.
    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    /// Returns true if a structurally equal sentence is live.
    pub fn contains(&self, sentence: &Sentence) -> bool {
        self.sentences.contains(sentence)
    }

    /// Cell sets already produced by subset elimination.
    pub fn derived_sets(&self) -> &BTreeSet<BTreeSet<Cell>> {
        &self.derived
    }

    /// Pass limit of the fixpoint loop.
    pub fn max_passes(&self) -> usize {
        self.max_passes
    }

    /// Adds a sentence.
    ///
    /// A sentence that resolves directly is not stored; its cells are
    /// returned instead. Otherwise it is stored (unless vacuous or already
    /// present) and subset elimination runs against every other live
    /// sentence. Derived sentences go through the same procedure, and their
    /// resolutions are collected in the result.
    ///
    /// Marks in the result have not been applied yet; pass them to
    /// [`KnowledgeBase::settle`].
    ///
    /// # Errors
    ///
    /// Fails if a derivation breaks a sentence invariant or the result
    /// classifies a cell both ways.
    #[instrument(skip(self, sentence), fields(sentence = %sentence))]
    pub fn ingest(&mut self, sentence: Sentence) -> Result<Deductions, KnowledgeError> {
        let mut learned = Deductions::new();
        let mut queue = VecDeque::from([sentence]);

        while let Some(sentence) = queue.pop_front() {
            self.check_conflict(&sentence)?;
            if let Some(resolved) = Deductions::resolve(&sentence) {
                debug!(%sentence, "Sentence resolved directly");
                learned.absorb(resolved)?;
                continue;
            }
            let Some(stored) = self.store(sentence)? else {
                continue;
            };

            // Derive from a snapshot of the live list, then commit.
            let candidates = self.sentences[..stored]
                .iter()
                .chain(&self.sentences[stored + 1..])
                .map(|other| subset_difference(&self.sentences[stored], other))
                .collect::<Result<Vec<_>, _>>()?;
            queue.extend(self.register(candidates.into_iter().flatten()));
        }

        Ok(learned)
    }

    /// Applies a mark to every live sentence, then drops sentences left
    /// without cells and duplicates.
    ///
    /// Returns whether any sentence changed.
    ///
    /// # Errors
    ///
    /// Fails if the mark contradicts a sentence.
    #[instrument(level = "debug", skip(self))]
    pub fn apply_mark(&mut self, cell: Cell, mark: Mark) -> Result<bool, KnowledgeError> {
        let mut changed = false;
        for sentence in &mut self.sentences {
            changed |= match mark {
                Mark::Mine => sentence.mark_mine(cell)?,
                Mark::Safe => sentence.mark_safe(cell)?,
            };
        }
        if changed {
            self.prune()?;
        }
        Ok(changed)
    }

    /// Runs the fixpoint loop.
    ///
    /// Each pass propagates pending marks into every sentence, takes every
    /// directly resolvable sentence out as new pending marks, and if there
    /// were none, runs subset elimination across all live pairs. The loop
    /// stops after a pass that yields no mark and stores no sentence.
    ///
    /// Returns every mark applied, `seed` included.
    ///
    /// # Errors
    ///
    /// Fails on contradictory knowledge or when the pass limit is reached.
    #[instrument(skip(self, seed), fields(seed = seed.len(), sentences = self.sentences.len()))]
    pub fn settle(&mut self, seed: Deductions) -> Result<Deductions, KnowledgeError> {
        let mut learned = Deductions::new();
        let mut pending = seed;

        for pass in 0..self.max_passes {
            for (cell, mark) in pending.iter() {
                self.apply_mark(cell, mark)?;
            }
            learned.absorb(pending)?;

            pending = self.take_resolved()?;
            if !pending.is_empty() {
                trace!(pass, resolved = pending.len(), "Resolved live sentences");
                continue;
            }

            let revision = self.revision;
            let derived = self.derive_all()?;
            for sentence in derived {
                pending.absorb(self.ingest(sentence)?)?;
            }
            if pending.is_empty() && revision == self.revision {
                debug!(
                    passes = pass + 1,
                    mines = learned.mines().len(),
                    safes = learned.safes().len(),
                    sentences = self.sentences.len(),
                    "Knowledge settled"
                );
                return Ok(learned);
            }
        }

        Err(KnowledgeError::new(KnowledgeErrorKind::IterationLimit(
            self.max_passes,
        )))
    }

    /// Stores a sentence unless it is vacuous or already live.
    ///
    /// Returns the index of the stored sentence.
    fn store(&mut self, sentence: Sentence) -> Result<Option<usize>, KnowledgeError> {
        if sentence.is_vacuous() {
            return Ok(None);
        }
        self.check_conflict(&sentence)?;
        if self.contains(&sentence) {
            return Ok(None);
        }
        trace!(%sentence, "Storing sentence");
        self.sentences.push(sentence);
        self.revision += 1;
        Ok(Some(self.sentences.len() - 1))
    }

    /// Fails if a live sentence covers the same cells with another count.
    fn check_conflict(&self, sentence: &Sentence) -> Result<(), KnowledgeError> {
        match self
            .sentences
            .iter()
            .find(|live| live.cells() == sentence.cells())
        {
            Some(existing) if existing.count() != sentence.count() => Err(
                KnowledgeError::invariant(format!("{sentence} conflicts with {existing}")),
            ),
            _ => Ok(()),
        }
    }

    /// Keeps the candidates whose cell set has not been derived before.
    fn register(&mut self, candidates: impl IntoIterator<Item = Sentence>) -> Vec<Sentence> {
        candidates
            .into_iter()
            .filter(|sentence| self.derived.insert(sentence.cells().clone()))
            .collect()
    }

    /// Subset elimination across every pair of live sentences.
    fn derive_all(&mut self) -> Result<Vec<Sentence>, KnowledgeError> {
        let mut candidates = Vec::new();
        for (idx, first) in self.sentences.iter().enumerate() {
            for second in &self.sentences[idx + 1..] {
                if let Some(sentence) = subset_difference(first, second)? {
                    candidates.push(sentence);
                }
            }
        }
        Ok(self.register(candidates))
    }

    /// Removes every directly resolvable sentence and returns its cells.
    fn take_resolved(&mut self) -> Result<Deductions, KnowledgeError> {
        let (resolved, live): (Vec<Sentence>, Vec<Sentence>) = std::mem::take(&mut self.sentences)
            .into_iter()
            .partition(|sentence| Deductions::resolve(sentence).is_some());
        self.sentences = live;

        let mut deductions = Deductions::new();
        for sentence in &resolved {
            if let Some(cells) = Deductions::resolve(sentence) {
                deductions.absorb(cells)?;
            }
        }
        Ok(deductions)
    }

    /// Drops vacuous sentences and structural duplicates, keeping the first
    /// occurrence.
    fn prune(&mut self) -> Result<(), KnowledgeError> {
        let mut seen: BTreeMap<&BTreeSet<Cell>, &Sentence> = BTreeMap::new();
        let mut keep = Vec::with_capacity(self.sentences.len());
        for sentence in &self.sentences {
            if sentence.is_vacuous() {
                keep.push(false);
                continue;
            }
            match seen.get(sentence.cells()) {
                Some(first) if first.count() == sentence.count() => keep.push(false),
                Some(first) => {
                    return Err(KnowledgeError::invariant(format!(
                        "{sentence} conflicts with {first}"
                    )));
                }
                None => {
                    seen.insert(sentence.cells(), sentence);
                    keep.push(true);
                }
            }
        }

        let mut keep = keep.into_iter();
        self.sentences.retain(|_| keep.next().unwrap_or(false));
        Ok(())
    }
}

/// Subset elimination for one pair.
///
/// When the smaller cell set is a proper subset of the larger, returns the
/// sentence over `larger - smaller` with `larger.count - smaller.count`.
fn subset_difference(a: &Sentence, b: &Sentence) -> Result<Option<Sentence>, KnowledgeError> {
    if a.is_vacuous() || b.is_vacuous() || a.cells() == b.cells() {
        return Ok(None);
    }
    let (smaller, larger) = if a.len() < b.len() { (a, b) } else { (b, a) };
    if !smaller.cells().is_subset(larger.cells()) {
        return Ok(None);
    }
    let Some(count) = larger.count().checked_sub(smaller.count()) else {
        return Err(KnowledgeError::invariant(format!(
            "{smaller} holds more mines than its superset {larger}"
        )));
    };
    let cells = larger.cells().difference(smaller.cells()).copied();
    Sentence::new(cells, count).map(Some)
}
