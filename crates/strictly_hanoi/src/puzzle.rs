//! The puzzle engine.
//!
//! [`Puzzle`] is the sole authority on peg contents. Every mutation goes
//! through [`Puzzle::apply_move`], which re-checks the rules against the
//! live state first.

use super::contracts::{IllegalMove, LegalMove};
use super::error::ConfigurationError;
use super::invariants::check_all;
use super::types::{Disk, Move, Peg};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use tracing::{debug, instrument};

/// Largest supported disk count. The full solution for 64 disks is
/// `2^64 - 1` moves, exactly `u64::MAX`, so the move counter never overflows
/// while replaying it.
pub const MAX_DISKS: u32 = 64;

/// Complete puzzle state: every peg's disks, top first, plus the move counter.
///
/// Values of this type are plain data. [`Puzzle::snapshot`] hands out copies,
/// so holding one never aliases the engine. Deserialization checks the disk
/// count and every invariant, so a decoded state is always reachable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPuzzleState")]
pub struct PuzzleState {
    pub(crate) num_disks: u32,
    pub(crate) pegs: [Vec<Disk>; 3],
    pub(crate) moves: u64,
}

#[derive(Deserialize)]
struct RawPuzzleState {
    num_disks: u32,
    pegs: [Vec<Disk>; 3],
    moves: u64,
}

impl TryFrom<RawPuzzleState> for PuzzleState {
    type Error = String;

    fn try_from(raw: RawPuzzleState) -> Result<Self, Self::Error> {
        if !(1..=MAX_DISKS).contains(&raw.num_disks) {
            return Err(format!(
                "num_disks must be between 1 and {MAX_DISKS} (got {})",
                raw.num_disks
            ));
        }
        let state = Self {
            num_disks: raw.num_disks,
            pegs: raw.pegs,
            moves: raw.moves,
        };
        check_all(&state).map_err(|violations| {
            violations
                .iter()
                .map(|v| v.description.as_str())
                .collect::<Vec<_>>()
                .join("; ")
        })?;
        Ok(state)
    }
}

impl PuzzleState {
    /// Canonical start: all disks on `start`, smallest on top.
    fn stacked_on(num_disks: u32, start: Peg) -> Self {
        let mut pegs: [Vec<Disk>; 3] = Default::default();
        pegs[start.index()] = (1..=num_disks).map(Disk::new).collect();
        Self {
            num_disks,
            pegs,
            moves: 0,
        }
    }

    /// Number of disks in the puzzle.
    pub fn num_disks(&self) -> u32 {
        self.num_disks
    }

    /// Number of moves applied so far.
    pub fn moves(&self) -> u64 {
        self.moves
    }

    /// Disks on `peg`, listed from top to bottom.
    pub fn disks(&self, peg: Peg) -> &[Disk] {
        &self.pegs[peg.index()]
    }

    /// The top disk on `peg`, if any.
    pub fn top(&self, peg: Peg) -> Option<Disk> {
        self.pegs[peg.index()].first().copied()
    }

    /// Returns true if `goal` holds every disk.
    pub fn all_on(&self, goal: Peg) -> bool {
        self.disks(goal).len() == self.num_disks as usize
    }
}

/// Tower of Hanoi engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Puzzle {
    start: Peg,
    state: PuzzleState,
}

impl Puzzle {
    /// Creates a puzzle with all disks on [`Peg::A`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] if `num_disks` is zero or exceeds
    /// [`MAX_DISKS`].
    pub fn new(num_disks: u32) -> Result<Self, ConfigurationError> {
        Self::with_start(num_disks, Peg::A)
    }

    /// Creates a puzzle with all disks on `start`.
    #[instrument]
    pub fn with_start(num_disks: u32, start: Peg) -> Result<Self, ConfigurationError> {
        if num_disks < 1 {
            return Err(ConfigurationError::TooFewDisks(num_disks));
        }
        if num_disks > MAX_DISKS {
            return Err(ConfigurationError::TooManyDisks {
                requested: num_disks,
                max: MAX_DISKS,
            });
        }
        debug!("Creating puzzle");
        Ok(Self {
            start,
            state: PuzzleState::stacked_on(num_disks, start),
        })
    }

    /// Restores the starting configuration, keeping the disk count and start peg.
    #[instrument(skip(self), fields(num_disks = self.state.num_disks))]
    pub fn reset(&mut self) {
        debug!("Resetting puzzle");
        self.state = PuzzleState::stacked_on(self.state.num_disks, self.start);
    }

    /// Number of disks in the puzzle.
    pub fn num_disks(&self) -> u32 {
        self.state.num_disks
    }

    /// Peg the disks started on.
    pub fn start(&self) -> Peg {
        self.start
    }

    /// Number of moves applied so far.
    pub fn moves(&self) -> u64 {
        self.state.moves
    }

    /// Checks a move against the current state, naming the rule it breaks.
    pub fn check_move(&self, mv: Move) -> Result<(), IllegalMove> {
        LegalMove::check(&mv, &self.state)
    }

    /// Returns true if `mv` may be applied to the current state.
    pub fn is_legal(&self, mv: Move) -> bool {
        self.check_move(mv).is_ok()
    }

    /// Moves the top disk of `mv.source` onto `mv.destination`.
    ///
    /// Returns the disk that moved.
    ///
    /// # Errors
    ///
    /// Returns [`IllegalMove`] and leaves the state untouched if the move
    /// breaks a rule.
    #[instrument(skip(self), fields(source = %mv.source, destination = %mv.destination))]
    pub fn apply_move(&mut self, mv: Move) -> Result<Disk, IllegalMove> {
        self.check_move(mv)?;

        let disk = self.state.pegs[mv.source.index()].remove(0);
        self.state.pegs[mv.destination.index()].insert(0, disk);
        self.state.moves += 1;

        debug!(disk = %disk, moves = self.state.moves, "Move applied");
        debug_assert!(
            check_all(&self.state).is_ok(),
            "Puzzle invariants violated after {mv}"
        );
        Ok(disk)
    }

    /// Returns true if every disk is on `goal`.
    pub fn is_solved(&self, goal: Peg) -> bool {
        self.state.all_on(goal)
    }

    /// Returns a copy of the full state.
    pub fn snapshot(&self) -> PuzzleState {
        self.state.clone()
    }

    /// All moves that are legal right now, in peg label order.
    pub fn valid_moves(&self) -> Vec<Move> {
        Peg::iter()
            .flat_map(|source| Peg::iter().map(move |destination| Move::new(source, destination)))
            .filter(|mv| self.is_legal(*mv))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let puzzle = Puzzle::new(3).unwrap();
        let state = puzzle.snapshot();
        assert_eq!(state.disks(Peg::A), &[Disk::new(1), Disk::new(2), Disk::new(3)]);
        assert!(state.disks(Peg::B).is_empty());
        assert!(state.disks(Peg::C).is_empty());
        assert_eq!(state.moves(), 0);
    }

    #[test]
    fn test_zero_disks_rejected() {
        assert_eq!(Puzzle::new(0), Err(ConfigurationError::TooFewDisks(0)));
    }

    #[test]
    fn test_too_many_disks_rejected() {
        assert!(matches!(
            Puzzle::new(MAX_DISKS + 1),
            Err(ConfigurationError::TooManyDisks { .. })
        ));
        assert!(Puzzle::new(MAX_DISKS).is_ok());
        assert_eq!(
            Puzzle::new(65),
            Err(ConfigurationError::TooManyDisks {
                requested: 65,
                max: 64
            })
        );
    }

    #[test]
    fn test_deserialize_round_trips_reachable_state() {
        let mut puzzle = Puzzle::new(3).unwrap();
        puzzle.apply_move(Move::new(Peg::A, Peg::C)).unwrap();
        let json = serde_json::to_string(&puzzle.snapshot()).unwrap();
        let state: PuzzleState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, puzzle.snapshot());
    }

    #[test]
    fn test_deserialize_rejects_broken_conservation() {
        let json = r#"{"num_disks":1,"pegs":[[1,2,3],[],[]],"moves":0}"#;
        let err = serde_json::from_str::<PuzzleState>(json).unwrap_err();
        assert!(err.to_string().contains("no duplicates or omissions"));
    }

    #[test]
    fn test_deserialize_rejects_misordered_peg() {
        let json = r#"{"num_disks":2,"pegs":[[2,1],[],[]],"moves":0}"#;
        let err = serde_json::from_str::<PuzzleState>(json).unwrap_err();
        assert!(err.to_string().contains("strictly increasing"));
    }

    #[test]
    fn test_deserialize_rejects_zero_disks() {
        let json = r#"{"num_disks":0,"pegs":[[],[],[]],"moves":0}"#;
        assert!(serde_json::from_str::<PuzzleState>(json).is_err());
    }

    #[test]
    fn test_apply_increments_counter() {
        let mut puzzle = Puzzle::new(2).unwrap();
        let disk = puzzle.apply_move(Move::new(Peg::A, Peg::B)).unwrap();
        assert_eq!(disk, Disk::new(1));
        assert_eq!(puzzle.moves(), 1);
        assert_eq!(puzzle.snapshot().top(Peg::B), Some(Disk::new(1)));
    }

    #[test]
    fn test_rejected_move_leaves_state_unchanged() {
        let mut puzzle = Puzzle::new(3).unwrap();
        puzzle.apply_move(Move::new(Peg::A, Peg::B)).unwrap();
        let before = puzzle.snapshot();

        let result = puzzle.apply_move(Move::new(Peg::A, Peg::B));
        assert!(result.is_err());
        assert_eq!(puzzle.snapshot(), before);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut puzzle = Puzzle::new(2).unwrap();
        let snapshot = puzzle.snapshot();
        puzzle.apply_move(Move::new(Peg::A, Peg::C)).unwrap();
        assert_eq!(snapshot.moves(), 0);
        assert_eq!(snapshot.disks(Peg::A).len(), 2);
    }

    #[test]
    fn test_valid_moves_from_start() {
        let puzzle = Puzzle::new(3).unwrap();
        assert_eq!(
            puzzle.valid_moves(),
            vec![Move::new(Peg::A, Peg::B), Move::new(Peg::A, Peg::C)]
        );
    }

    #[test]
    fn test_reset_restores_start() {
        let mut puzzle = Puzzle::with_start(3, Peg::B).unwrap();
        puzzle.apply_move(Move::new(Peg::B, Peg::A)).unwrap();
        puzzle.reset();
        assert_eq!(puzzle.moves(), 0);
        assert_eq!(puzzle.snapshot().disks(Peg::B).len(), 3);
    }

    #[test]
    fn test_single_disk_solved_after_one_move() {
        let mut puzzle = Puzzle::new(1).unwrap();
        assert!(!puzzle.is_solved(Peg::C));
        puzzle.apply_move(Move::new(Peg::A, Peg::C)).unwrap();
        assert!(puzzle.is_solved(Peg::C));
    }
}
