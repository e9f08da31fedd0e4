//! Sentence bounds invariant: every live sentence is satisfiable on its own.

use super::Invariant;
use crate::Agent;

/// Invariant: every live sentence has cells and `count <= |cells|`.
pub struct SentenceBoundsInvariant;

impl Invariant<Agent> for SentenceBoundsInvariant {
    fn holds(agent: &Agent) -> bool {
        agent
            .knowledge()
            .sentences()
            .iter()
            .all(|sentence| !sentence.is_vacuous() && sentence.count() <= sentence.len())
    }

    fn description() -> &'static str {
        "Every live sentence has cells and no more mines than cells"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Cell;

    #[test]
    fn test_holds_with_live_sentences() {
        let mut agent = Agent::new(3, 3);
        agent.record_observation(Cell::new(1, 1), 2).unwrap();
        assert!(!agent.knowledge().is_empty());
        assert!(SentenceBoundsInvariant::holds(&agent));
    }
}
