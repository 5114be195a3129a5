//! Invariants that hold for every reachable puzzle state.
//!
//! The engine debug-asserts them after each applied move. They are public so
//! tests and callers can check any [`PuzzleState`] independently.

use super::puzzle::PuzzleState;
use super::types::{Disk, Peg};
use tracing::warn;

/// A logical property that must hold for a given state.
pub trait Invariant<S> {
    /// Checks if the invariant holds for the given state.
    fn holds(state: &S) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// Violation of an invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Description of the violated invariant.
    pub description: String,
}

impl Violation {
    /// Creates a new violation.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// Invariant: the pegs together hold exactly disks `1..=N`, each once.
pub struct DiskConservation;

impl Invariant<PuzzleState> for DiskConservation {
    fn holds(state: &PuzzleState) -> bool {
        let mut all: Vec<Disk> = Peg::ALL
            .iter()
            .flat_map(|peg| state.disks(*peg).iter().copied())
            .collect();
        all.sort_unstable();

        let expected = (1..=state.num_disks()).map(Disk::new);
        let valid = all.len() == state.num_disks() as usize && all.into_iter().eq(expected);
        if !valid {
            warn!(num_disks = state.num_disks(), "Disk conservation violated");
        }
        valid
    }

    fn description() -> &'static str {
        "Pegs hold exactly disks 1..=N with no duplicates or omissions"
    }
}

/// Invariant: every peg is strictly increasing in size from top to bottom.
pub struct OrderedPegs;

impl Invariant<PuzzleState> for OrderedPegs {
    fn holds(state: &PuzzleState) -> bool {
        let valid = Peg::ALL
            .iter()
            .all(|peg| state.disks(*peg).windows(2).all(|pair| pair[0] < pair[1]));
        if !valid {
            warn!("Peg ordering violated");
        }
        valid
    }

    fn description() -> &'static str {
        "Each peg is strictly increasing in size from top to bottom"
    }
}

/// Checks every puzzle invariant, collecting all violations.
pub fn check_all(state: &PuzzleState) -> Result<(), Vec<Violation>> {
    let mut violations = Vec::new();

    if !DiskConservation::holds(state) {
        violations.push(Violation::new(DiskConservation::description()));
    }

    if !OrderedPegs::holds(state) {
        violations.push(Violation::new(OrderedPegs::description()));
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Move, Puzzle};

    #[test]
    fn test_fresh_puzzle_holds() {
        let puzzle = Puzzle::new(4).unwrap();
        assert!(check_all(&puzzle.snapshot()).is_ok());
    }

    #[test]
    fn test_holds_after_moves() {
        let mut puzzle = Puzzle::new(3).unwrap();
        puzzle.apply_move(Move::new(Peg::A, Peg::C)).unwrap();
        puzzle.apply_move(Move::new(Peg::A, Peg::B)).unwrap();
        assert!(check_all(&puzzle.snapshot()).is_ok());
    }

    #[test]
    fn test_detects_duplicated_disk() {
        let mut state = Puzzle::new(3).unwrap().snapshot();
        state.pegs[Peg::C.index()].push(Disk::new(1));

        let violations = check_all(&state).unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].description, DiskConservation::description());
    }

    #[test]
    fn test_detects_misordered_peg() {
        let mut state = Puzzle::new(3).unwrap().snapshot();
        state.pegs[Peg::A.index()].swap(0, 2);

        assert!(DiskConservation::holds(&state));
        assert!(!OrderedPegs::holds(&state));
    }
}
