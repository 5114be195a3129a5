//! Core domain types for the Tower of Hanoi.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};
use tracing::instrument;

/// One of the three pegs.
///
/// Parsing is case-insensitive, so `"a"` and `"A"` both name [`Peg::A`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum Peg {
    /// The first peg, canonical start.
    A,
    /// The second peg, canonical auxiliary.
    B,
    /// The third peg, canonical goal.
    C,
}

impl Peg {
    /// All pegs in label order.
    pub const ALL: [Peg; 3] = [Peg::A, Peg::B, Peg::C];

    /// Slot of this peg in a three-element array.
    pub fn index(self) -> usize {
        match self {
            Peg::A => 0,
            Peg::B => 1,
            Peg::C => 2,
        }
    }

    /// Returns the peg that is neither `self` nor `other`.
    ///
    /// Returns `None` when both arguments name the same peg.
    #[instrument]
    pub fn third(self, other: Peg) -> Option<Peg> {
        if self == other {
            return None;
        }
        Peg::iter().find(|p| *p != self && *p != other)
    }
}

/// A disk, identified by its size. Larger numbers are larger disks.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct Disk(u32);

impl Disk {
    /// Creates a disk of the given size.
    pub fn new(size: u32) -> Self {
        Self(size)
    }

    /// Returns the size of the disk.
    pub fn size(self) -> u32 {
        self.0
    }
}

/// A request to move the top disk of `source` onto `destination`.
///
/// A move is only a request. [`crate::Puzzle::apply_move`] decides whether
/// it is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    /// Peg the disk is taken from.
    pub source: Peg,
    /// Peg the disk is placed on.
    pub destination: Peg,
}

impl Move {
    /// Creates a new move.
    pub fn new(source: Peg, destination: Peg) -> Self {
        Self {
            source,
            destination,
        }
    }

    /// Returns the source peg.
    pub fn source(&self) -> Peg {
        self.source
    }

    /// Returns the destination peg.
    pub fn destination(&self) -> Peg {
        self.destination
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} → {}", self.source, self.destination)
    }
}

impl From<(Peg, Peg)> for Move {
    fn from((source, destination): (Peg, Peg)) -> Self {
        Self::new(source, destination)
    }
}
