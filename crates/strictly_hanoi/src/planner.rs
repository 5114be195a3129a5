//! The optimal move planner.
//!
//! [`Plan`] yields the classic divide-and-conquer sequence using an explicit
//! work stack, so it needs O(n) memory no matter how long the sequence is.
//! Move order is identical to the recursive formulation:
//! move `n-1` disks out of the way, move the largest, move `n-1` back on top.

use super::puzzle::PuzzleState;
use super::types::{Move, Peg};
use tracing::{instrument, trace};

/// Number of moves in the minimal solution for `num_disks` disks: `2^n - 1`.
///
/// Returns `None` if the count does not fit in a `u64`.
pub fn optimal_move_count(num_disks: u32) -> Option<u64> {
    match num_disks {
        64 => Some(u64::MAX),
        n => 1u64.checked_shl(n).map(|p| p - 1),
    }
}

#[derive(Debug, Clone, Copy)]
enum Frame {
    Transfer {
        n: u32,
        source: Peg,
        auxiliary: Peg,
        destination: Peg,
    },
    Emit(Move),
}

/// Lazy iterator over the minimal move sequence.
#[derive(Debug, Clone)]
pub struct Plan {
    stack: Vec<Frame>,
    remaining: Option<u64>,
}

impl Plan {
    /// Plans `n` disks from `source` to `destination` via `auxiliary`.
    #[instrument]
    pub fn new(n: u32, source: Peg, auxiliary: Peg, destination: Peg) -> Self {
        let mut stack = Vec::with_capacity(2 * n.min(64) as usize);
        if n > 0 {
            stack.push(Frame::Transfer {
                n,
                source,
                auxiliary,
                destination,
            });
        }
        Self {
            stack,
            remaining: optimal_move_count(n),
        }
    }

    /// Plans `n` disks between two distinct pegs, using the third as auxiliary.
    ///
    /// Returns `None` if `source == destination`.
    pub fn between(n: u32, source: Peg, destination: Peg) -> Option<Self> {
        let auxiliary = source.third(destination)?;
        Some(Self::new(n, source, auxiliary, destination))
    }

    /// Moves not yet yielded, or `None` if the count overflows `u64`.
    pub fn remaining(&self) -> Option<u64> {
        self.remaining
    }
}

impl Iterator for Plan {
    type Item = Move;

    fn next(&mut self) -> Option<Move> {
        while let Some(frame) = self.stack.pop() {
            match frame {
                Frame::Emit(mv) => {
                    self.remaining = self.remaining.map(|r| r.saturating_sub(1));
                    return Some(mv);
                }
                Frame::Transfer {
                    n,
                    source,
                    auxiliary,
                    destination,
                } => {
                    // Pushed in reverse so they pop in execution order.
                    if n > 1 {
                        self.stack.push(Frame::Transfer {
                            n: n - 1,
                            source: auxiliary,
                            auxiliary: source,
                            destination,
                        });
                    }
                    self.stack.push(Frame::Emit(Move::new(source, destination)));
                    if n > 1 {
                        self.stack.push(Frame::Transfer {
                            n: n - 1,
                            source,
                            auxiliary: destination,
                            destination: auxiliary,
                        });
                    }
                }
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.remaining.and_then(|r| usize::try_from(r).ok()) {
            Some(r) => (r, Some(r)),
            None => (usize::MAX, None),
        }
    }
}

/// Collects the full minimal move sequence.
///
/// Prefer iterating a [`Plan`] directly for large `n`.
#[instrument]
pub fn plan(n: u32, source: Peg, auxiliary: Peg, destination: Peg) -> Vec<Move> {
    let moves: Vec<Move> = Plan::new(n, source, auxiliary, destination).collect();
    trace!(count = moves.len(), "Plan generated");
    moves
}

/// The next move of a minimal solution from an arbitrary state.
///
/// Walks the disks from largest to smallest, tracking where each one needs to
/// go; the smallest disk that is not yet where it belongs is the one to move.
/// Returns `None` when every disk is already on `goal`.
pub fn next_optimal_move(state: &PuzzleState, goal: Peg) -> Option<Move> {
    let mut target = goal;
    let mut next = None;
    for size in (1..=state.num_disks()).rev() {
        let at = Peg::ALL
            .into_iter()
            .find(|peg| state.disks(*peg).iter().any(|d| d.size() == size))?;
        if at != target {
            next = Some(Move::new(at, target));
            target = at.third(target)?;
        }
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Puzzle;

    fn plan_recursive(n: u32, source: Peg, auxiliary: Peg, destination: Peg) -> Vec<Move> {
        match n {
            0 => Vec::new(),
            1 => vec![Move::new(source, destination)],
            _ => {
                let mut moves = plan_recursive(n - 1, source, destination, auxiliary);
                moves.push(Move::new(source, destination));
                moves.extend(plan_recursive(n - 1, auxiliary, source, destination));
                moves
            }
        }
    }

    #[test]
    fn test_zero_disks_is_empty() {
        assert!(plan(0, Peg::A, Peg::B, Peg::C).is_empty());
    }

    #[test]
    fn test_one_disk() {
        assert_eq!(plan(1, Peg::A, Peg::B, Peg::C), vec![Move::new(Peg::A, Peg::C)]);
    }

    #[test]
    fn test_matches_recursive_order() {
        for n in 0..=10 {
            assert_eq!(
                plan(n, Peg::A, Peg::B, Peg::C),
                plan_recursive(n, Peg::A, Peg::B, Peg::C),
                "ordering differs for n = {n}"
            );
        }
        assert_eq!(
            plan(5, Peg::B, Peg::C, Peg::A),
            plan_recursive(5, Peg::B, Peg::C, Peg::A)
        );
    }

    #[test]
    fn test_size_hint_is_exact() {
        let mut p = Plan::new(4, Peg::A, Peg::B, Peg::C);
        assert_eq!(p.size_hint(), (15, Some(15)));
        p.next();
        assert_eq!(p.size_hint(), (14, Some(14)));
        assert_eq!(p.remaining(), Some(14));
    }

    #[test]
    fn test_optimal_move_count() {
        assert_eq!(optimal_move_count(0), Some(0));
        assert_eq!(optimal_move_count(3), Some(7));
        assert_eq!(optimal_move_count(63), Some((1u64 << 63) - 1));
        assert_eq!(optimal_move_count(64), Some(u64::MAX));
        assert_eq!(optimal_move_count(65), None);
    }

    #[test]
    fn test_between_derives_auxiliary() {
        let moves: Vec<Move> = Plan::between(2, Peg::C, Peg::A).unwrap().collect();
        assert_eq!(
            moves,
            vec![
                Move::new(Peg::C, Peg::B),
                Move::new(Peg::C, Peg::A),
                Move::new(Peg::B, Peg::A),
            ]
        );
        assert!(Plan::between(2, Peg::A, Peg::A).is_none());
    }

    #[test]
    fn test_next_optimal_move_follows_plan() {
        let mut puzzle = Puzzle::new(4).unwrap();
        for expected in plan(4, Peg::A, Peg::B, Peg::C) {
            let mv = next_optimal_move(&puzzle.snapshot(), Peg::C).unwrap();
            assert_eq!(mv, expected);
            puzzle.apply_move(mv).unwrap();
        }
        assert!(next_optimal_move(&puzzle.snapshot(), Peg::C).is_none());
    }

    #[test]
    fn test_next_optimal_move_recovers_from_detour() {
        let mut puzzle = Puzzle::new(3).unwrap();
        puzzle.apply_move(Move::new(Peg::A, Peg::B)).unwrap();
        puzzle.apply_move(Move::new(Peg::B, Peg::C)).unwrap();
        puzzle.apply_move(Move::new(Peg::C, Peg::B)).unwrap();

        let mut guard = 0;
        while let Some(mv) = next_optimal_move(&puzzle.snapshot(), Peg::C) {
            puzzle.apply_move(mv).unwrap();
            guard += 1;
            assert!(guard <= 7);
        }
        assert!(puzzle.is_solved(Peg::C));
    }
}
