//! LNIR error types.

use arcstr::ArcStr;

use crate::{NodeId, NodeKind};

/// The result type returned by LNIR functions.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// An enumeration of LNIR errors.
#[derive(thiserror::Error, Debug, Clone, Eq, PartialEq)]
pub enum Error {
    /// A node identifier that does not belong to the network.
    #[error("node {0} does not exist in this network")]
    UnknownNode(NodeId),
    /// A virtual input was requested for a node that is not a real primary input.
    #[error("node {0} is not a real primary input")]
    NotARealInput(NodeId),
    /// A node was created with the wrong number of fanins.
    #[error("a {kind} node takes {expected} fanins, but {actual} were given")]
    ArityMismatch {
        /// The requested node kind.
        kind: NodeKind,
        /// The arity of `kind`.
        expected: usize,
        /// The number of fanins given.
        actual: usize,
    },
    /// Two nodes that must share a level do not.
    #[error("nodes {0} and {1} lie on different levels")]
    LevelMismatch(NodeId, NodeId),
    /// A rank is not a permutation of the nodes on its level.
    #[error("invalid rank order for level {level}: {reason}")]
    InvalidRank {
        /// The offending level.
        level: u32,
        /// A description of the problem.
        reason: ArcStr,
    },
    /// The network has too many inputs to be simulated exhaustively.
    #[error("cannot simulate a network with {0} inputs exhaustively")]
    TooManyInputs(usize),
}
