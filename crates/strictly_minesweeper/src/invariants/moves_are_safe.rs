//! Moves are safe invariant: every revealed cell is known safe.

use super::Invariant;
use crate::Agent;

/// Invariant: every move made is a known safe cell.
pub struct MovesAreSafeInvariant;

impl Invariant<Agent> for MovesAreSafeInvariant {
    fn holds(agent: &Agent) -> bool {
        agent.moves_made().is_subset(agent.safes())
    }

    fn description() -> &'static str {
        "Every move made is a known safe cell"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Cell;

    #[test]
    fn test_detects_unsafe_move() {
        let mut agent = Agent::new(3, 3);
        agent.record_observation(Cell::new(2, 2), 1).unwrap();
        assert!(MovesAreSafeInvariant::holds(&agent));

        agent.moves_made.insert(Cell::new(0, 0));
        assert!(!MovesAreSafeInvariant::holds(&agent));
    }
}
