//! Error types for closepeer.

use thiserror::Error;

use crate::NodeId;

/// Result type for closepeer operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the close-peer core.
///
/// Empty collaborator results are not errors; they are ordinary no-ops of
/// an epidemic process and never surface here.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Configuration rejected at construction time.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A close-peer set was observed in a state merge must never leave behind.
    #[error("invariant violated in close-peer set of {owner}: {violation}")]
    InvariantViolation {
        owner: NodeId,
        violation: Violation,
    },
}

/// Which invariant of a close-peer set was broken.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Violation {
    #[error("holds {len} peers, bound is {max_size}")]
    Overfull { len: usize, max_size: usize },

    #[error("entry {index} is closer than its predecessor")]
    Unsorted { index: usize },

    #[error("peer {0} listed more than once")]
    Duplicate(NodeId),

    #[error("owner listed as its own peer")]
    ContainsOwner,
}
