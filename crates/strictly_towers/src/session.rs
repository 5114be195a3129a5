//! Oracle-driven solving session.
//!
//! One session owns one puzzle and one oracle. Each iteration describes the
//! live state, asks the oracle for a move, and lets the puzzle judge it.
//! The iteration budget is the only way a session stops early.

use crate::context::{Context, Exchange, describe_state};
use crate::oracle::Oracle;
use crate::oracle_config::ConfigError;
use derive_getters::Getters;
use derive_new::new;
use std::time::{Duration, Instant};
use strictly_hanoi::{Disk, IllegalMove, Move, Peg, Puzzle, PuzzleState, optimal_move_count};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

/// Session parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters, new)]
pub struct SessionConfig {
    /// Maximum number of oracle round-trips.
    max_iterations: u32,
    /// Peg that must end up holding every disk.
    goal: Peg,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new(100, Peg::C)
    }
}

/// Where a session stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum SessionStatus {
    /// Still iterating.
    Running,
    /// Every disk reached the goal peg.
    Solved,
    /// The budget ran out first.
    Exhausted,
}

impl SessionStatus {
    /// Returns true for `Solved` and `Exhausted`.
    pub fn is_terminal(self) -> bool {
        self != SessionStatus::Running
    }
}

/// How a finished session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum SessionOutcome {
    /// Every disk reached the goal peg.
    Solved,
    /// The budget ran out first.
    Exhausted,
}

/// Progress notifications sent while a session runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The oracle is about to be asked.
    IterationStarted {
        /// Iteration number (1-based).
        iteration: u32,
    },
    /// A proposal was applied.
    Accepted {
        /// Iteration number.
        iteration: u32,
        /// The move.
        mv: Move,
        /// Disk that moved.
        disk: Disk,
        /// State after the move.
        state: PuzzleState,
    },
    /// A proposal broke a rule.
    Rejected {
        /// Iteration number.
        iteration: u32,
        /// The move.
        mv: Move,
        /// The rule it broke.
        reason: IllegalMove,
    },
    /// The oracle produced nothing usable.
    NoProposal {
        /// Iteration number.
        iteration: u32,
        /// Oracle error text.
        reason: String,
    },
    /// The session reached a terminal state.
    Finished {
        /// How it ended.
        outcome: SessionOutcome,
        /// Iterations used.
        iterations: u32,
        /// Moves applied.
        moves: u64,
    },
}

/// Summary of a finished session.
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct SessionReport {
    /// How the session ended.
    outcome: SessionOutcome,
    /// Oracle round-trips used.
    iterations: u32,
    /// Moves applied to the puzzle.
    moves: u64,
    /// Proposals the puzzle refused.
    rejections: u32,
    /// Iterations where the oracle proposed nothing.
    declined: u32,
    /// Puzzle state when the session ended.
    final_state: PuzzleState,
    /// Wall time spent inside [`OracleSession::step`].
    elapsed: Duration,
}

impl SessionReport {
    /// Returns true if the puzzle was solved.
    pub fn is_solved(&self) -> bool {
        self.outcome == SessionOutcome::Solved
    }

    /// Optimal move count as a percentage of the moves actually made.
    ///
    /// `None` unless solved with at least one move.
    pub fn efficiency(&self) -> Option<f64> {
        if !self.is_solved() || self.moves == 0 {
            return None;
        }
        let optimal = optimal_move_count(self.final_state.num_disks())?;
        Some(optimal as f64 / self.moves as f64 * 100.0)
    }
}

/// A bounded attempt to solve one puzzle with one oracle.
#[derive(Debug)]
pub struct OracleSession<O: Oracle> {
    puzzle: Puzzle,
    oracle: O,
    config: SessionConfig,
    context: Context,
    status: SessionStatus,
    iteration: u32,
    rejections: u32,
    declined: u32,
    elapsed: Duration,
    events: Option<mpsc::UnboundedSender<SessionEvent>>,
}

impl<O: Oracle> OracleSession<O> {
    /// Creates a session.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the budget is zero or the goal peg is the
    /// puzzle's start peg.
    #[instrument(skip(puzzle, oracle), fields(num_disks = puzzle.num_disks(), oracle = oracle.name()))]
    pub fn new(puzzle: Puzzle, oracle: O, config: SessionConfig) -> Result<Self, ConfigError> {
        if config.max_iterations == 0 {
            return Err(ConfigError::new(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        if config.goal == puzzle.start() {
            return Err(ConfigError::new(format!(
                "goal tower {} must differ from start tower {}",
                config.goal,
                puzzle.start()
            )));
        }

        let status = if puzzle.is_solved(config.goal) {
            SessionStatus::Solved
        } else {
            SessionStatus::Running
        };
        info!(max_iterations = config.max_iterations, goal = %config.goal, %status, "Session created");

        Ok(Self {
            puzzle,
            oracle,
            config,
            context: Context::new(),
            status,
            iteration: 0,
            rejections: 0,
            declined: 0,
            elapsed: Duration::ZERO,
            events: None,
        })
    }

    /// Sends progress events to `events` from now on.
    pub fn with_events(mut self, events: mpsc::UnboundedSender<SessionEvent>) -> Self {
        self.events = Some(events);
        self
    }

    fn emit(&self, event: SessionEvent) {
        if let Some(events) = &self.events
            && events.send(event).is_err()
        {
            debug!("Event receiver dropped");
        }
    }

    /// Runs one iteration and returns the resulting status.
    ///
    /// Does nothing once the session is terminal.
    #[instrument(skip(self), fields(iteration = self.iteration + 1))]
    pub async fn step(&mut self) -> SessionStatus {
        if self.status.is_terminal() {
            return self.status;
        }
        let started = Instant::now();

        self.iteration += 1;
        let iteration = self.iteration;
        self.emit(SessionEvent::IterationStarted { iteration });
        self.context.push(Exchange::State {
            iteration,
            description: describe_state(&self.puzzle.snapshot()),
        });

        match self.oracle.propose(&self.context).await {
            Err(e) => {
                warn!(error = %e, "No proposal");
                self.declined += 1;
                let reason = e.to_string();
                self.context.push(Exchange::NoProposal {
                    reason: reason.clone(),
                });
                self.emit(SessionEvent::NoProposal { iteration, reason });
            }
            Ok(mv) => match self.puzzle.apply_move(mv) {
                Ok(disk) => {
                    info!(%mv, %disk, moves = self.puzzle.moves(), "Move accepted");
                    self.context.push(Exchange::Accepted { mv, disk });
                    self.emit(SessionEvent::Accepted {
                        iteration,
                        mv,
                        disk,
                        state: self.puzzle.snapshot(),
                    });
                    if self.puzzle.is_solved(self.config.goal) {
                        self.status = SessionStatus::Solved;
                    }
                }
                Err(reason) => {
                    warn!(%mv, %reason, "Move rejected");
                    self.rejections += 1;
                    self.context.push(Exchange::Rejected { mv, reason });
                    self.emit(SessionEvent::Rejected {
                        iteration,
                        mv,
                        reason,
                    });
                }
            },
        }

        if self.status == SessionStatus::Running && iteration >= self.config.max_iterations {
            self.status = SessionStatus::Exhausted;
        }
        if let Some(outcome) = self.outcome() {
            info!(%outcome, iterations = iteration, moves = self.puzzle.moves(), "Session finished");
            self.emit(SessionEvent::Finished {
                outcome,
                iterations: iteration,
                moves: self.puzzle.moves(),
            });
        }

        self.elapsed += started.elapsed();
        self.status
    }

    /// Steps until the session is terminal.
    #[instrument(skip(self), fields(oracle = self.oracle.name()))]
    pub async fn run(&mut self) -> SessionReport {
        while !self.step().await.is_terminal() {}
        self.report()
    }

    /// Summary of the session so far.
    ///
    /// A session that is still running reports as exhausted.
    pub fn report(&self) -> SessionReport {
        SessionReport {
            outcome: self.outcome().unwrap_or(SessionOutcome::Exhausted),
            iterations: self.iteration,
            moves: self.puzzle.moves(),
            rejections: self.rejections,
            declined: self.declined,
            final_state: self.puzzle.snapshot(),
            elapsed: self.elapsed,
        }
    }

    fn outcome(&self) -> Option<SessionOutcome> {
        match self.status {
            SessionStatus::Running => None,
            SessionStatus::Solved => Some(SessionOutcome::Solved),
            SessionStatus::Exhausted => Some(SessionOutcome::Exhausted),
        }
    }

    /// Current status.
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Iterations used so far.
    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    /// Everything exchanged with the oracle.
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Copy of the live puzzle state.
    pub fn snapshot(&self) -> PuzzleState {
        self.puzzle.snapshot()
    }

    /// Session parameters.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The oracle being consulted.
    pub fn oracle(&self) -> &O {
        &self.oracle
    }
}
