//! Strictly Towers - Tower of Hanoi driven by a planner or an LLM oracle.
//!
//! The puzzle rules live in [`strictly_hanoi`]. This crate adds everything
//! around them.
//!
//! # Architecture
//!
//! - **Oracle**: anything that proposes moves, trusted for nothing
//!   ([`Oracle`], with LLM, planner and scripted implementations)
//! - **Session**: the bounded loop that validates proposals against a live
//!   puzzle ([`OracleSession`])
//! - **LLM client**: tool-calling transport for OpenAI and Anthropic
//! - **Display**: ASCII rendering of puzzle snapshots
//!
//! # Example
//!
//! ```no_run
//! use strictly_towers::{OracleSession, PlannerOracle, SessionConfig};
//! use strictly_hanoi::{Peg, Puzzle};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let puzzle = Puzzle::new(3)?;
//! let oracle = PlannerOracle::new(&puzzle, Peg::C);
//! let mut session = OracleSession::new(
//!     puzzle,
//!     oracle,
//!     SessionConfig::new(100, Peg::C),
//! )?;
//! let report = session.run().await;
//! assert!(report.is_solved());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod context;
mod display;
mod llm_client;
mod manual;
mod oracle;
mod oracle_config;
mod session;

// Crate-level exports - Context buffer
pub use context::{Context, Exchange, describe_state};

// Crate-level exports - Rendering
pub use display::render;

// Crate-level exports - LLM client
pub use llm_client::{
    ChatTurn, LlmClient, LlmConfig, LlmError, LlmProvider, LlmReply, ToolCall, ToolSpec,
};

// Crate-level exports - Manual play input
pub use manual::{ManualCommand, ManualInputError, parse_command};

// Crate-level exports - Oracles
pub use oracle::{
    LlmOracle, MoveDiskArgs, Oracle, OracleError, PlannerOracle, ScriptedOracle, build_oracle,
};

// Crate-level exports - Configuration
pub use oracle_config::{ConfigError, OracleConfig, OracleProvider};

// Crate-level exports - Session
pub use session::{
    OracleSession, SessionConfig, SessionEvent, SessionOutcome, SessionReport, SessionStatus,
};
