//! Move preconditions.
//!
//! Each rule is a zero-sized checker that inspects a [`PuzzleState`] and a
//! [`Move`] and either passes or names the rule that was broken. The engine
//! runs [`LegalMove`] before every mutation, so callers never see a
//! half-applied move.

use super::puzzle::PuzzleState;
use super::types::{Disk, Move, Peg};
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// A proposed move broke one of the puzzle rules.
///
/// Always recoverable: the puzzle is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, Error)]
pub enum IllegalMove {
    /// Source and destination name the same peg.
    #[display("Cannot move disk from {_0} to {_0}: source and target must differ")]
    SamePeg(#[error(not(source))] Peg),

    /// The source peg holds no disks.
    #[display("Cannot move disk from {_0}: tower {_0} is empty")]
    EmptySource(#[error(not(source))] Peg),

    /// The top disk of the source is larger than the top disk of the destination.
    #[display(
        "Cannot move disk {disk} from {from} onto smaller disk {onto} on {to}: \
         a larger disk cannot be placed on a smaller one"
    )]
    LargerOntoSmaller {
        /// Peg the disk would leave.
        from: Peg,
        /// Peg the disk would land on.
        to: Peg,
        /// The disk being moved.
        disk: Disk,
        /// The smaller disk currently on top of the destination.
        onto: Disk,
    },
}

/// Precondition: source and destination differ.
pub struct DistinctPegs;

impl DistinctPegs {
    /// Checks that the move goes somewhere.
    #[instrument(level = "trace")]
    pub fn check(mv: &Move) -> Result<(), IllegalMove> {
        if mv.source == mv.destination {
            Err(IllegalMove::SamePeg(mv.source))
        } else {
            Ok(())
        }
    }
}

/// Precondition: the source peg has a disk to move.
pub struct SourceNotEmpty;

impl SourceNotEmpty {
    /// Checks that the source peg is not empty.
    #[instrument(level = "trace", skip(state))]
    pub fn check(mv: &Move, state: &PuzzleState) -> Result<(), IllegalMove> {
        if state.top(mv.source).is_none() {
            Err(IllegalMove::EmptySource(mv.source))
        } else {
            Ok(())
        }
    }
}

/// Precondition: the moving disk is smaller than whatever it lands on.
pub struct SmallerOntoLarger;

impl SmallerOntoLarger {
    /// Checks the size ordering between the two top disks.
    ///
    /// An empty source passes here; [`SourceNotEmpty`] reports it.
    #[instrument(level = "trace", skip(state))]
    pub fn check(mv: &Move, state: &PuzzleState) -> Result<(), IllegalMove> {
        match (state.top(mv.source), state.top(mv.destination)) {
            (Some(disk), Some(onto)) if disk > onto => Err(IllegalMove::LargerOntoSmaller {
                from: mv.source,
                to: mv.destination,
                disk,
                onto,
            }),
            _ => Ok(()),
        }
    }
}

/// Composite precondition: a move is legal when every rule passes.
pub struct LegalMove;

impl LegalMove {
    /// Validates all preconditions, reporting the first rule broken.
    #[instrument(level = "trace", skip(state))]
    pub fn check(mv: &Move, state: &PuzzleState) -> Result<(), IllegalMove> {
        DistinctPegs::check(mv)?;
        SourceNotEmpty::check(mv, state)?;
        SmallerOntoLarger::check(mv, state)?;
        Ok(())
    }
}
