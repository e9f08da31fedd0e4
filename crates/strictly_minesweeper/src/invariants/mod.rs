//! First-class invariants for the deducing agent.
//!
//! Invariants are logical properties that must hold after every observation.
//! They are testable independently and serve as documentation of the
//! agent's guarantees.

/// A logical property that must hold for a given state.
pub trait Invariant<S> {
    /// Checks if the invariant holds for the given state.
    fn holds(state: &S) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// Violation of an invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub description: String,
}

impl InvariantViolation {
    /// Creates a new invariant violation.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// A set of invariants that can be checked together.
///
/// Implemented for tuples of up to four invariants.
pub trait InvariantSet<S> {
    /// Checks all invariants in the set.
    ///
    /// Returns Ok(()) if all invariants hold, or Err with a list of
    /// violations if any invariant fails.
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>>;
}

macro_rules! impl_invariant_set {
    ($($inv:ident),+) => {
        impl<S, $($inv),+> InvariantSet<S> for ($($inv,)+)
        where
            $($inv: Invariant<S>,)+
        {
            fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
                let mut violations = Vec::new();
                $(
                    if !$inv::holds(state) {
                        violations.push(InvariantViolation::new($inv::description()));
                    }
                )+
                if violations.is_empty() {
                    Ok(())
                } else {
                    Err(violations)
                }
            }
        }
    };
}

impl_invariant_set!(I1);
impl_invariant_set!(I1, I2);
impl_invariant_set!(I1, I2, I3);
impl_invariant_set!(I1, I2, I3, I4);

pub mod disjoint_knowledge;
pub mod moves_are_safe;
pub mod purged_sentences;
pub mod sentence_bounds;

pub use disjoint_knowledge::DisjointKnowledgeInvariant;
pub use moves_are_safe::MovesAreSafeInvariant;
pub use purged_sentences::PurgedSentencesInvariant;
pub use sentence_bounds::SentenceBoundsInvariant;

/// All agent invariants as a composable set.
pub type AgentInvariants = (
    SentenceBoundsInvariant,
    DisjointKnowledgeInvariant,
    MovesAreSafeInvariant,
    PurgedSentencesInvariant,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Agent, Cell};

    #[test]
    fn test_invariant_set_holds_for_new_agent() {
        let agent = Agent::new(4, 4);
        assert!(AgentInvariants::check_all(&agent).is_ok());
    }

    #[test]
    fn test_invariant_set_holds_after_observations() {
        let mut agent = Agent::new(4, 4);
        agent.record_observation(Cell::new(0, 0), 1).unwrap();
        agent.record_observation(Cell::new(3, 3), 0).unwrap();
        assert!(AgentInvariants::check_all(&agent).is_ok());
    }

    #[test]
    fn test_invariant_set_reports_every_violation() {
        let mut agent = Agent::new(4, 4);
        agent.record_observation(Cell::new(0, 0), 1).unwrap();

        // Corrupt the agent behind the knowledge base's back.
        agent.mines.insert(Cell::new(0, 1));
        agent.moves_made.insert(Cell::new(3, 3));

        let violations = AgentInvariants::check_all(&agent).unwrap_err();
        assert_eq!(violations.len(), 2);
    }

    #[test]
    fn test_two_invariants_as_set() {
        let agent = Agent::new(2, 2);
        type TwoInvariants = (SentenceBoundsInvariant, MovesAreSafeInvariant);
        assert!(TwoInvariants::check_all(&agent).is_ok());
    }
}
