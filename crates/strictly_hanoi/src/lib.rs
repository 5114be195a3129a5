//! Pure Tower of Hanoi puzzle logic.
//!
//! This crate has no I/O. It provides:
//!
//! - **Types**: [`Peg`], [`Disk`] and [`Move`]
//! - **Engine**: [`Puzzle`], the only owner of peg contents, with
//!   [`PuzzleState`] snapshots
//! - **Contracts**: the move preconditions, reported as [`IllegalMove`]
//! - **Invariants**: disk conservation and per-peg ordering
//! - **Planner**: the minimal move sequence, via [`Plan`] or [`plan`], and
//!   [`next_optimal_move`] from any reachable state
//!
//! # Example
//!
//! ```
//! use strictly_hanoi::{Peg, Puzzle, plan};
//!
//! let mut puzzle = Puzzle::new(3)?;
//! for mv in plan(3, Peg::A, Peg::B, Peg::C) {
//!     puzzle.apply_move(mv)?;
//! }
//! assert!(puzzle.is_solved(Peg::C));
//! assert_eq!(puzzle.moves(), 7);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]

mod contracts;
mod error;
mod invariants;
mod planner;
mod puzzle;
mod types;

pub use contracts::{DistinctPegs, IllegalMove, LegalMove, SmallerOntoLarger, SourceNotEmpty};
pub use error::ConfigurationError;
pub use invariants::{DiskConservation, Invariant, OrderedPegs, Violation, check_all};
pub use planner::{Plan, next_optimal_move, optimal_move_count, plan};
pub use puzzle::{MAX_DISKS, Puzzle, PuzzleState};
pub use types::{Disk, Move, Peg};
