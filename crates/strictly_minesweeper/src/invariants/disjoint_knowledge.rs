//! Disjoint knowledge invariant: no cell is both a mine and safe.

use super::Invariant;
use crate::Agent;

/// Invariant: the known mines and known safe cells never overlap.
pub struct DisjointKnowledgeInvariant;

impl Invariant<Agent> for DisjointKnowledgeInvariant {
    fn holds(agent: &Agent) -> bool {
        agent.mines().is_disjoint(agent.safes())
    }

    fn description() -> &'static str {
        "Known mines and known safe cells are disjoint"
    }
}
