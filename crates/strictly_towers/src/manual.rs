//! Line-oriented input for manual play.

use derive_more::{Display, Error};
use std::str::FromStr;
use strictly_hanoi::{Move, Peg};

/// A parsed line of manual input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManualCommand {
    /// Leave the game.
    Quit,
    /// Attempt a move.
    Move(Move),
}

/// Why a line of manual input could not be understood.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum ManualInputError {
    /// Not two whitespace-separated tokens.
    #[display("Invalid input. Please enter source and target towers separated by a space.")]
    Malformed,
    /// A token that is not A, B or C.
    #[display("Invalid towers. Please use A, B, or C (got {_0:?}).")]
    InvalidTower(#[error(not(source))] String),
}

/// Parses input like `A C` or `q`.
pub fn parse_command(line: &str) -> Result<ManualCommand, ManualInputError> {
    let line = line.trim();
    if line.eq_ignore_ascii_case("q") {
        return Ok(ManualCommand::Quit);
    }

    let tokens: Vec<&str> = line.split_whitespace().collect();
    let [source, target] = tokens.as_slice() else {
        return Err(ManualInputError::Malformed);
    };

    let parse = |token: &str| {
        Peg::from_str(token).map_err(|_| ManualInputError::InvalidTower(token.to_string()))
    };
    Ok(ManualCommand::Move(Move::new(parse(*source)?, parse(*target)?)))
}
