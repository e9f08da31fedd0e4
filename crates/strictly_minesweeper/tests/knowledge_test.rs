//! Deduction scenarios for the knowledge base and agent.

use rand::SeedableRng;
use rand::rngs::StdRng;
use strictly_minesweeper::{
    Agent, AgentInvariants, Cell, InvariantSet, KnowledgeBase, KnowledgeErrorKind, Minefield,
    Sentence,
};

fn cell(row: usize, col: usize) -> Cell {
    Cell::new(row, col)
}

#[test]
fn test_subset_rule_derives_safe_cell() {
    let mut kb = KnowledgeBase::new();
    let a = Sentence::new([cell(0, 0), cell(0, 1), cell(0, 2)], 1).unwrap();
    let b = Sentence::new([cell(0, 0), cell(0, 1)], 1).unwrap();

    assert!(kb.ingest(a).unwrap().is_empty());
    let deductions = kb.ingest(b).unwrap();

    assert!(deductions.safes().contains(&cell(0, 2)));
    assert!(deductions.mines().is_empty());
}

#[test]
fn test_three_by_three_scenario() {
    // Single mine at (0, 0).
    let mut agent = Agent::new(3, 3);

    agent.record_observation(cell(1, 1), 1).unwrap();
    assert!(agent.is_known_safe(cell(1, 1)));
    assert!(agent.mines().is_empty());

    agent.record_observation(cell(2, 2), 0).unwrap();
    assert!(agent.is_known_safe(cell(1, 2)));
    assert!(agent.is_known_safe(cell(2, 1)));

    agent.record_observation(cell(0, 1), 1).unwrap();
    assert!(agent.is_known_safe(cell(2, 0)));
    assert_eq!(agent.safe_move(), Some(cell(1, 2)));

    agent.record_observation(cell(0, 2), 0).unwrap();
    agent.record_observation(cell(1, 0), 1).unwrap();

    assert!(agent.is_known_mine(cell(0, 0)));
    assert_eq!(agent.mines().len(), 1);
    assert_eq!(agent.safes().len(), 8);
    assert!(agent.knowledge().is_empty());
    assert!(AgentInvariants::check_all(&agent).is_ok());
}

#[test]
fn test_marks_are_idempotent() {
    let mut agent = Agent::new(3, 3);
    agent.record_observation(cell(1, 1), 2).unwrap();

    assert!(agent.mark_mine(cell(0, 0)).unwrap());
    let once = agent.clone();
    assert!(!agent.mark_mine(cell(0, 0)).unwrap());
    assert_eq!(agent, once);

    assert!(agent.mark_safe(cell(2, 2)).unwrap());
    let once = agent.clone();
    assert!(!agent.mark_safe(cell(2, 2)).unwrap());
    assert_eq!(agent, once);
}

#[test]
fn test_replay_on_settled_state_learns_nothing() {
    let mut agent = Agent::new(3, 3);
    agent.record_observation(cell(0, 0), 1).unwrap();
    agent.record_observation(cell(2, 2), 1).unwrap();
    let before = agent.clone();

    assert!(!agent.replay().unwrap());
    assert_eq!(agent, before);
}

#[test]
fn test_contradictory_observation_fails() {
    let mut agent = Agent::new(2, 2);
    agent.record_observation(cell(0, 0), 0).unwrap();

    // Every neighbour of (1, 1) is already known safe.
    let err = agent.record_observation(cell(1, 1), 1).unwrap_err();
    assert!(matches!(err.kind(), KnowledgeErrorKind::InvariantViolation(_)));
}

/// Observes cells in the order the agent picks them, falling back to the
/// first truly safe hidden cell when the agent has nothing certain.
fn play_with_oracle(field: &Minefield) -> Agent {
    let mut agent = Agent::new(field.height(), field.width());
    loop {
        let next = agent.safe_move().or_else(|| {
            Cell::all(field.height(), field.width())
                .find(|c| !field.is_mine(*c) && !agent.has_made_move(*c))
        });
        let Some(next) = next else {
            return agent;
        };
        assert!(!field.is_mine(next), "agent called {next} safe but it is a mine");

        let before_mines = agent.mines().clone();
        let before_safes = agent.safes().clone();
        agent
            .record_observation(next, usize::from(field.nearby_mines(next)))
            .unwrap();

        assert!(agent.mines().is_superset(&before_mines));
        assert!(agent.safes().is_superset(&before_safes));
        assert!(AgentInvariants::check_all(&agent).is_ok());
    }
}

#[test]
fn test_deductions_are_sound_on_random_boards() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..25 {
        let field = Minefield::random(6, 7, 9, &mut rng).unwrap();
        let agent = play_with_oracle(&field);

        for mine in agent.mines() {
            assert!(field.is_mine(*mine), "{mine} deduced as mine but is safe");
        }
        for safe in agent.safes() {
            assert!(!field.is_mine(*safe), "{safe} deduced as safe but is a mine");
        }
        assert_eq!(agent.moves_made().len(), field.safe_cell_count());
    }
}

#[test]
fn test_fully_observed_board_identifies_bordering_mines() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..10 {
        let field = Minefield::random(5, 5, 4, &mut rng).unwrap();
        let agent = play_with_oracle(&field);

        // Every safe cell is known, so each revealed count pins its mines.
        for mine in field.mines() {
            let borders_safe_cell = mine
                .neighbors(field.height(), field.width())
                .any(|n| !field.is_mine(n));
            assert_eq!(agent.is_known_mine(*mine), borders_safe_cell, "{mine}");
        }
    }
}

#[test]
fn test_replay_agent_matches_plain_agent_on_truth() {
    let mut rng = StdRng::seed_from_u64(3);
    let field = Minefield::random(6, 6, 6, &mut rng).unwrap();

    let mut plain = Agent::new(6, 6);
    let mut replaying = Agent::new(6, 6).with_replay(true);
    for c in Cell::all(6, 6).filter(|c| !field.is_mine(*c)) {
        let count = usize::from(field.nearby_mines(c));
        plain.record_observation(c, count).unwrap();
        replaying.record_observation(c, count).unwrap();
    }

    assert!(replaying.mines().is_superset(plain.mines()));
    assert!(replaying.mines().is_subset(field.mines()));
}

#[test]
fn test_sentence_serializes() {
    let sentence = Sentence::new([cell(0, 1), cell(1, 0)], 1).unwrap();
    let json = serde_json::to_string(&sentence).unwrap();
    let back: Sentence = serde_json::from_str(&json).unwrap();
    assert_eq!(back, sentence);
}
