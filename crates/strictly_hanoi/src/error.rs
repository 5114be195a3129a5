//! Construction errors.

use derive_more::{Display, Error};

/// The puzzle could not be constructed with the requested parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum ConfigurationError {
    /// Fewer than one disk was requested.
    #[display("Number of disks must be at least 1 (got {_0})")]
    TooFewDisks(#[error(not(source))] u32),

    /// More disks than the move counter can represent a full solution for.
    #[display("Number of disks must be at most {max} (got {requested})")]
    TooManyDisks {
        /// Requested disk count.
        requested: u32,
        /// Largest supported disk count.
        max: u32,
    },
}
