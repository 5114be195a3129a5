//! Oracle trait and implementations.
//!
//! An oracle proposes one move per call. It is never trusted: the session
//! checks every proposal against the live puzzle, and any error returned
//! here just means "no proposal this iteration".

mod llm;
mod planner;
mod scripted;

pub use llm::{LlmOracle, MoveDiskArgs};
pub use planner::PlannerOracle;
pub use scripted::ScriptedOracle;

use crate::context::Context;
use crate::llm_client::LlmClient;
use crate::oracle_config::{ConfigError, OracleConfig, OracleProvider};
use derive_more::{Display, Error};
use strictly_hanoi::{Move, Peg, Puzzle};
use tracing::{info, instrument};

/// Why an oracle produced no proposal.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum OracleError {
    /// The oracle could not be reached (transport failure, timeout).
    #[display("oracle unavailable: {_0}")]
    Unavailable(#[error(not(source))] String),
    /// The oracle answered, but not with a well-formed move.
    #[display("oracle output unparsable: {_0}")]
    Unparsable(#[error(not(source))] String),
    /// The oracle answered without proposing anything.
    #[display("oracle declined to move: {_0}")]
    Declined(#[error(not(source))] String),
}

/// Something that proposes moves.
#[async_trait::async_trait]
pub trait Oracle: Send {
    /// Proposes the next move given everything exchanged so far.
    ///
    /// The last entry of `context` is always the current state description.
    async fn propose(&mut self, context: &Context) -> Result<Move, OracleError>;

    /// Returns the oracle's display name.
    fn name(&self) -> &str;
}

#[async_trait::async_trait]
impl<T: Oracle + ?Sized> Oracle for Box<T> {
    async fn propose(&mut self, context: &Context) -> Result<Move, OracleError> {
        (**self).propose(context).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Builds the oracle selected by `config` for `puzzle`.
///
/// LLM providers need their API key in the environment.
#[instrument(skip(config), fields(provider = %config.provider(), model = %config.model()))]
pub fn build_oracle(
    config: &OracleConfig,
    puzzle: &Puzzle,
    goal: Peg,
) -> Result<Box<dyn Oracle>, ConfigError> {
    info!("Building oracle");
    match config.provider() {
        OracleProvider::Planner => Ok(Box::new(PlannerOracle::new(puzzle, goal))),
        OracleProvider::OpenAI | OracleProvider::Anthropic => {
            let llm_config = config.create_llm_config()?;
            let client = LlmClient::new(llm_config)
                .map_err(|e| ConfigError::new(format!("Failed to create LLM client: {}", e)))?;
            Ok(Box::new(LlmOracle::new(
                client,
                puzzle.num_disks(),
                puzzle.start(),
                goal,
            )))
        }
    }
}
