//! Physical design error types.

use lnir::NodeId;
use tiles::Tile;

/// The result type returned by physical design functions.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// An enumeration of physical design errors.
#[derive(thiserror::Error, Debug, Clone, Eq, PartialEq)]
pub enum Error {
    /// A gate fanin does not lie exactly one level above the gate.
    #[error("network is not balanced: fanin {fanin} of node {node} skips a level")]
    UnbalancedNetwork {
        /// The consuming node.
        node: NodeId,
        /// The fanin spanning more than one level.
        fanin: NodeId,
    },
    /// A node has more fanins than the placer supports.
    #[error("network contains nodes that exceed the supported fanin size")]
    FaninTooLarge {
        /// The first offending node.
        node: NodeId,
        /// Its number of fanins.
        fanin_size: usize,
    },
    /// The rank order of the network has crossings.
    #[error("input network has to be planar")]
    NotPlanar {
        /// The number of crossings in the current rank order.
        crossings: u64,
    },
    /// A node drives more primary outputs than can be routed.
    #[error("node {node} drives more than two primary outputs")]
    TooManyOutputs {
        /// The driving node.
        node: NodeId,
    },
    /// A node was needed before it was placed.
    #[error("node {node} has not been placed")]
    Unplaced {
        /// The unplaced node.
        node: NodeId,
    },
    /// A signal cannot be routed between two tiles with straight wires.
    #[error("cannot route a signal from {from} to {to}")]
    Unroutable {
        /// The source tile.
        from: Tile,
        /// The target tile.
        to: Tile,
    },
    /// A tile that must be free is occupied.
    #[error("tile {tile} is already occupied")]
    TileOccupied {
        /// The occupied tile.
        tile: Tile,
    },
    /// A tile that must be occupied is empty.
    #[error("tile {tile} is not occupied")]
    UnknownTile {
        /// The empty tile.
        tile: Tile,
    },
    /// A tile lies outside of the layout.
    #[error("tile {tile} lies outside of the layout")]
    OutOfBounds {
        /// The offending tile.
        tile: Tile,
    },
    /// The data flow of a layout loops back onto itself.
    #[error("the data flow through tile {tile} forms a cycle")]
    CombinationalCycle {
        /// A tile on the cycle.
        tile: Tile,
    },
    /// An error in the logic network.
    #[error(transparent)]
    Network(#[from] lnir::Error),
    /// A configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<toml::de::Error> for Error {
    fn from(value: toml::de::Error) -> Self {
        Self::Config(value.to_string())
    }
}
