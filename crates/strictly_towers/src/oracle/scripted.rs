//! Oracle that replays a fixed script of replies.

use super::{Oracle, OracleError};
use crate::context::Context;
use std::collections::VecDeque;
use strictly_hanoi::Move;

/// Replays canned replies in order, then declines.
///
/// Useful for driving a session through exact sequences of good, bad and
/// missing proposals.
#[derive(Debug, Clone, Default)]
pub struct ScriptedOracle {
    replies: VecDeque<Result<Move, OracleError>>,
    repeat: Option<Result<Move, OracleError>>,
    calls: usize,
}

impl ScriptedOracle {
    /// Proposes each move in turn.
    pub fn from_moves(moves: impl IntoIterator<Item = Move>) -> Self {
        Self::from_replies(moves.into_iter().map(Ok))
    }

    /// Returns each reply in turn.
    pub fn from_replies(replies: impl IntoIterator<Item = Result<Move, OracleError>>) -> Self {
        Self {
            replies: replies.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Proposes the same move forever.
    pub fn always(mv: Move) -> Self {
        Self {
            repeat: Some(Ok(mv)),
            ..Self::default()
        }
    }

    /// Fails the same way forever.
    pub fn failing(error: OracleError) -> Self {
        Self {
            repeat: Some(Err(error)),
            ..Self::default()
        }
    }

    /// Number of times [`Oracle::propose`] was called.
    pub fn calls(&self) -> usize {
        self.calls
    }
}

#[async_trait::async_trait]
impl Oracle for ScriptedOracle {
    async fn propose(&mut self, _context: &Context) -> Result<Move, OracleError> {
        self.calls += 1;
        if let Some(reply) = self.replies.pop_front() {
            return reply;
        }
        match &self.repeat {
            Some(reply) => reply.clone(),
            None => Err(OracleError::Declined("script exhausted".to_string())),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strictly_hanoi::Peg;

    #[tokio::test]
    async fn test_replays_then_declines() {
        let mv = Move::new(Peg::A, Peg::C);
        let mut oracle = ScriptedOracle::from_replies([
            Ok(mv),
            Err(OracleError::Unavailable("timeout".to_string())),
        ]);
        let context = Context::new();

        assert_eq!(oracle.propose(&context).await, Ok(mv));
        assert!(matches!(
            oracle.propose(&context).await,
            Err(OracleError::Unavailable(_))
        ));
        assert!(matches!(
            oracle.propose(&context).await,
            Err(OracleError::Declined(_))
        ));
        assert_eq!(oracle.calls(), 3);
    }

    #[tokio::test]
    async fn test_always_repeats() {
        let mv = Move::new(Peg::B, Peg::C);
        let mut oracle = ScriptedOracle::always(mv);
        let context = Context::new();
        for _ in 0..5 {
            assert_eq!(oracle.propose(&context).await, Ok(mv));
        }
    }
}
