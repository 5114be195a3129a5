//! Offline oracle backed by the optimal planner.

use super::{Oracle, OracleError};
use crate::context::{Context, Exchange};
use strictly_hanoi::{Move, Peg, Puzzle, next_optimal_move};
use tracing::{debug, instrument, warn};

/// Oracle that proposes the optimal continuation from the live state.
///
/// Keeps a private replica of the puzzle and replays accepted moves from the
/// context onto it, so it recovers from any position it is handed.
#[derive(Debug, Clone)]
pub struct PlannerOracle {
    replica: Puzzle,
    goal: Peg,
    seen: usize,
}

impl PlannerOracle {
    /// Creates an oracle tracking `puzzle` towards `goal`.
    pub fn new(puzzle: &Puzzle, goal: Peg) -> Self {
        Self {
            replica: puzzle.clone(),
            goal,
            seen: 0,
        }
    }

    fn catch_up(&mut self, context: &Context) {
        for entry in context.entries().iter().skip(self.seen) {
            if let Exchange::Accepted { mv, .. } = entry
                && let Err(e) = self.replica.apply_move(*mv)
            {
                warn!(%mv, error = %e, "Accepted move does not replay on replica");
            }
        }
        self.seen = context.len();
    }
}

#[async_trait::async_trait]
impl Oracle for PlannerOracle {
    #[instrument(skip(self, context), fields(goal = %self.goal))]
    async fn propose(&mut self, context: &Context) -> Result<Move, OracleError> {
        self.catch_up(context);
        let mv = next_optimal_move(&self.replica.snapshot(), self.goal)
            .ok_or_else(|| OracleError::Declined("puzzle already solved".to_string()))?;
        debug!(%mv, "Planner proposed a move");
        Ok(mv)
    }

    fn name(&self) -> &str {
        "planner"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strictly_hanoi::{Disk, plan};

    #[tokio::test]
    async fn test_follows_optimal_plan() {
        let mut puzzle = Puzzle::new(3).unwrap();
        let mut oracle = PlannerOracle::new(&puzzle, Peg::C);
        let mut context = Context::new();

        for expected in plan(3, Peg::A, Peg::B, Peg::C) {
            let mv = oracle.propose(&context).await.unwrap();
            assert_eq!(mv, expected);
            let disk = puzzle.apply_move(mv).unwrap();
            context.push(Exchange::Accepted { mv, disk });
        }
        assert!(puzzle.is_solved(Peg::C));
        assert!(matches!(
            oracle.propose(&context).await,
            Err(OracleError::Declined(_))
        ));
    }

    #[tokio::test]
    async fn test_recovers_after_detour() {
        let mut puzzle = Puzzle::new(2).unwrap();
        let mut oracle = PlannerOracle::new(&puzzle, Peg::C);
        let mut context = Context::new();

        // A suboptimal opening move made by someone else.
        let detour = Move::new(Peg::A, Peg::C);
        puzzle.apply_move(detour).unwrap();
        context.push(Exchange::Accepted {
            mv: detour,
            disk: Disk::new(1),
        });

        while !puzzle.is_solved(Peg::C) {
            let mv = oracle.propose(&context).await.unwrap();
            let disk = puzzle.apply_move(mv).unwrap();
            context.push(Exchange::Accepted { mv, disk });
        }
        assert!(puzzle.moves() <= 5);
    }
}
