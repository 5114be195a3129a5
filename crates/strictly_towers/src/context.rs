//! The append-only exchange buffer shared between a session and its oracle.

use serde::{Deserialize, Serialize};
use strictly_hanoi::{Disk, IllegalMove, Move, Peg, PuzzleState};

/// One entry in a session's context buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Exchange {
    /// The puzzle as it stood at the start of an iteration.
    State {
        /// Iteration this description opened (1-based).
        iteration: u32,
        /// Output of [`describe_state`].
        description: String,
    },
    /// A proposal that was applied.
    Accepted {
        /// The proposed move.
        mv: Move,
        /// The disk that moved.
        disk: Disk,
    },
    /// A proposal the puzzle refused.
    Rejected {
        /// The proposed move.
        mv: Move,
        /// The rule it broke.
        reason: IllegalMove,
    },
    /// The oracle produced no usable proposal.
    NoProposal {
        /// Why nothing was proposed.
        reason: String,
    },
}

impl Exchange {
    /// The move this entry is about, if it carries one.
    pub fn proposed_move(&self) -> Option<Move> {
        match self {
            Exchange::Accepted { mv, .. } | Exchange::Rejected { mv, .. } => Some(*mv),
            Exchange::State { .. } | Exchange::NoProposal { .. } => None,
        }
    }
}

impl std::fmt::Display for Exchange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Exchange::State { description, .. } => write!(
                f,
                "Current state of the towers:\n{description}\n\n\
                 Please make the next move to solve the puzzle."
            ),
            Exchange::Accepted { mv, disk } => write!(
                f,
                "Successfully moved disk {disk} from {} to {}",
                mv.source, mv.destination
            ),
            Exchange::Rejected { mv, reason } => write!(
                f,
                "Invalid move from {} to {}: {reason}",
                mv.source, mv.destination
            ),
            Exchange::NoProposal { reason } => write!(
                f,
                "No move was made ({reason}). \
                 Call move_disk with a source and target tower (A, B, or C)."
            ),
        }
    }
}

/// Ordered record of everything exchanged with the oracle so far.
///
/// Only the session appends; oracles get a shared reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    entries: Vec<Exchange>,
}

impl Context {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, entry: Exchange) {
        self.entries.push(entry);
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> &[Exchange] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The most recent entry.
    pub fn last(&self) -> Option<&Exchange> {
        self.entries.last()
    }

    /// Moves that were rejected, oldest first.
    pub fn rejected_moves(&self) -> impl Iterator<Item = (Move, IllegalMove)> + '_ {
        self.entries.iter().filter_map(|e| match e {
            Exchange::Rejected { mv, reason } => Some((*mv, *reason)),
            _ => None,
        })
    }
}

/// Describes a puzzle state for an oracle.
///
/// One line with the move count, then one line per tower listing its disks
/// top first and naming the top disk.
pub fn describe_state(state: &PuzzleState) -> String {
    let mut lines = Vec::with_capacity(4);
    lines.push(format!("Moves so far: {}", state.moves()));

    for peg in Peg::ALL {
        let disks = state.disks(peg);
        match disks.first() {
            Some(top) => {
                let listed = disks
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                lines.push(format!("Tower {peg}: [{listed}] (top disk is {top})"));
            }
            None => lines.push(format!("Tower {peg}: [] (empty)")),
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use strictly_hanoi::Puzzle;

    #[test]
    fn test_describe_initial_state() {
        let puzzle = Puzzle::new(3).unwrap();
        assert_eq!(
            describe_state(&puzzle.snapshot()),
            "Moves so far: 0\n\
             Tower A: [1, 2, 3] (top disk is 1)\n\
             Tower B: [] (empty)\n\
             Tower C: [] (empty)"
        );
    }

    #[test]
    fn test_describe_after_move() {
        let mut puzzle = Puzzle::new(2).unwrap();
        puzzle.apply_move(Move::new(Peg::A, Peg::B)).unwrap();
        let text = describe_state(&puzzle.snapshot());
        assert!(text.starts_with("Moves so far: 1"));
        assert!(text.contains("Tower A: [2] (top disk is 2)"));
        assert!(text.contains("Tower B: [1] (top disk is 1)"));
    }

    #[test]
    fn test_rejection_feedback_names_both_pegs_and_rule() {
        let entry = Exchange::Rejected {
            mv: Move::new(Peg::B, Peg::C),
            reason: IllegalMove::EmptySource(Peg::B),
        };
        let text = entry.to_string();
        assert!(text.starts_with("Invalid move from B to C:"));
        assert!(text.contains("empty"));
    }

    #[test]
    fn test_rejected_moves_iterator() {
        let mut context = Context::new();
        context.push(Exchange::NoProposal {
            reason: "timeout".to_string(),
        });
        context.push(Exchange::Rejected {
            mv: Move::new(Peg::B, Peg::A),
            reason: IllegalMove::EmptySource(Peg::B),
        });
        let rejected: Vec<_> = context.rejected_moves().collect();
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].0, Move::new(Peg::B, Peg::A));
    }
}
