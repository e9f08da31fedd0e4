//! Purged sentences invariant: classified cells leave every sentence.

use super::Invariant;
use crate::Agent;

/// Invariant: no live sentence mentions a known mine or known safe cell.
pub struct PurgedSentencesInvariant;

impl Invariant<Agent> for PurgedSentencesInvariant {
    fn holds(agent: &Agent) -> bool {
        agent.knowledge().sentences().iter().all(|sentence| {
            sentence.cells().is_disjoint(agent.mines())
                && sentence.cells().is_disjoint(agent.safes())
        })
    }

    fn description() -> &'static str {
        "No live sentence mentions a classified cell"
    }
}
