//! Leveled network intermediate representation (LNIR).
//!
//! A technology-independent representation of combinational logic networks
//! made of primary inputs, single-output gates, and named primary outputs.
//!
//! Nodes are created in topological order: every fanin of a node must exist
//! before the node itself is created. As a consequence, node identifiers
//! are a valid topological order, and levels can be computed in a single pass.
//!
//! Physical design algorithms operate on a [`RankView`], which additionally
//! assigns every node a position (its *rank*) within its level.
//!
//! Networks have no constant nodes. Duplicated inputs, as produced by
//! node-duplication planarization, are represented by *virtual* primary inputs
//! that evaluate to the value of the real primary input they duplicate.
#![warn(missing_docs)]

use std::fmt::Display;

use arcstr::ArcStr;
use serde::{Deserialize, Serialize};
use tracing::Level;

mod error;
pub mod rank;
pub mod sim;

#[cfg(test)]
pub(crate) mod tests;

pub use error::{Error, Result};
pub use rank::RankView;
pub use sim::TruthTable;

/// An opaque node identifier.
///
/// A node ID created in the context of one network must
/// *not* be used in the context of another network.
#[derive(
    Copy, Clone, Debug, Default, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize,
)]
pub struct NodeId(u32);

impl NodeId {
    /// The index of this node in its network's node arena.
    #[inline]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// The logic function of a node.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    /// A primary input.
    Pi,
    /// A buffer. Buffers with more than one consumer are fan-out nodes.
    Buf,
    /// An inverter.
    Inv,
    /// A 2-input conjunction.
    And,
    /// A 2-input disjunction.
    Or,
    /// A 2-input negated conjunction.
    Nand,
    /// A 2-input negated disjunction.
    Nor,
    /// A 2-input exclusive disjunction.
    Xor,
    /// A 2-input negated exclusive disjunction.
    Xnor,
    /// A 3-input majority.
    Maj,
}

impl NodeKind {
    /// The number of fanins a node of this kind has.
    pub const fn arity(&self) -> usize {
        match *self {
            Self::Pi => 0,
            Self::Buf | Self::Inv => 1,
            Self::And | Self::Or | Self::Nand | Self::Nor | Self::Xor | Self::Xnor => 2,
            Self::Maj => 3,
        }
    }

    /// Returns `true` for every kind except [`NodeKind::Pi`] and [`NodeKind::Buf`].
    pub const fn is_gate(&self) -> bool {
        !matches!(*self, Self::Pi | Self::Buf)
    }

    /// Evaluates this function bitwise over 64 input patterns at once.
    ///
    /// Panics if fewer than [`NodeKind::arity`] operands are given.
    pub fn eval(&self, operands: &[u64]) -> u64 {
        match *self {
            Self::Pi | Self::Buf => operands[0],
            Self::Inv => !operands[0],
            Self::And => operands[0] & operands[1],
            Self::Or => operands[0] | operands[1],
            Self::Nand => !(operands[0] & operands[1]),
            Self::Nor => !(operands[0] | operands[1]),
            Self::Xor => operands[0] ^ operands[1],
            Self::Xnor => !(operands[0] ^ operands[1]),
            Self::Maj => {
                let (a, b, c) = (operands[0], operands[1], operands[2]);
                (a & b) | (a & c) | (b & c)
            }
        }
    }
}

impl Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match *self {
            Self::Pi => "pi",
            Self::Buf => "buf",
            Self::Inv => "inv",
            Self::And => "and",
            Self::Or => "or",
            Self::Nand => "nand",
            Self::Nor => "nor",
            Self::Xor => "xor",
            Self::Xnor => "xnor",
            Self::Maj => "maj",
        };
        write!(f, "{name}")
    }
}

/// A node in a [`Network`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    kind: NodeKind,
    fanins: Vec<NodeId>,
    fanouts: Vec<NodeId>,
    name: Option<ArcStr>,
    /// The real primary input duplicated by a virtual primary input.
    duplicate_of: Option<NodeId>,
}

impl Node {
    /// The logic function of the node.
    #[inline]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// The name of the node, if one was set.
    #[inline]
    pub fn name(&self) -> Option<&ArcStr> {
        self.name.as_ref()
    }
}

/// A primary output.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct Output {
    /// The node driving the output.
    pub driver: NodeId,
    /// The name of the output.
    pub name: Option<ArcStr>,
}

/// A combinational logic network.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Network {
    name: Option<ArcStr>,
    nodes: Vec<Node>,
    inputs: Vec<NodeId>,
    outputs: Vec<Output>,
}

impl Network {
    /// Creates a new, empty network.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new, empty network with the given name.
    pub fn with_name(name: impl Into<ArcStr>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// The name of the network.
    #[inline]
    pub fn name(&self) -> Option<&ArcStr> {
        self.name.as_ref()
    }

    /// Sets the name of the network.
    pub fn set_name(&mut self, name: impl Into<ArcStr>) {
        self.name = Some(name.into());
    }

    fn add_node(&mut self, kind: NodeKind, fanins: Vec<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        for fanin in fanins.iter() {
            self.nodes[fanin.index()].fanouts.push(id);
        }
        self.nodes.push(Node {
            kind,
            fanins,
            fanouts: Vec::new(),
            name: None,
            duplicate_of: None,
        });
        id
    }

    /// Creates a named primary input.
    pub fn create_pi(&mut self, name: impl Into<ArcStr>) -> NodeId {
        let id = self.add_node(NodeKind::Pi, Vec::new());
        self.nodes[id.index()].name = Some(name.into());
        self.inputs.push(id);
        id
    }

    /// Creates a virtual primary input duplicating the real primary input `real`.
    ///
    /// The virtual input carries the name of `real` and evaluates to its value.
    pub fn create_virtual_pi(&mut self, real: NodeId) -> Result<NodeId> {
        self.check_node(real)?;
        if !self.is_pi(real) || self.is_virtual_pi(real) {
            return Err(Error::NotARealInput(real));
        }
        let name = self.nodes[real.index()].name.clone();
        let id = self.add_node(NodeKind::Pi, Vec::new());
        let node = &mut self.nodes[id.index()];
        node.name = name;
        node.duplicate_of = Some(real);
        self.inputs.push(id);
        Ok(id)
    }

    /// Creates a node of the given kind.
    ///
    /// Returns an error if the number of fanins does not match the arity of `kind`,
    /// if `kind` is [`NodeKind::Pi`], or if a fanin does not exist.
    pub fn create_node(&mut self, kind: NodeKind, fanins: &[NodeId]) -> Result<NodeId> {
        if kind == NodeKind::Pi || fanins.len() != kind.arity() {
            return Err(Error::ArityMismatch {
                kind,
                expected: kind.arity(),
                actual: fanins.len(),
            });
        }
        for fanin in fanins {
            self.check_node(*fanin)?;
        }
        Ok(self.add_node(kind, fanins.to_vec()))
    }

    /// Creates a buffer.
    ///
    /// # Panics
    ///
    /// Panics if `a` was not created by this network.
    pub fn create_buf(&mut self, a: NodeId) -> NodeId {
        self.add_node(NodeKind::Buf, vec![a])
    }

    /// Creates an inverter.
    pub fn create_not(&mut self, a: NodeId) -> NodeId {
        self.add_node(NodeKind::Inv, vec![a])
    }

    /// Creates a 2-input AND gate.
    pub fn create_and(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.add_node(NodeKind::And, vec![a, b])
    }

    /// Creates a 2-input OR gate.
    pub fn create_or(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.add_node(NodeKind::Or, vec![a, b])
    }

    /// Creates a 2-input NAND gate.
    pub fn create_nand(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.add_node(NodeKind::Nand, vec![a, b])
    }

    /// Creates a 2-input NOR gate.
    pub fn create_nor(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.add_node(NodeKind::Nor, vec![a, b])
    }

    /// Creates a 2-input XOR gate.
    pub fn create_xor(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.add_node(NodeKind::Xor, vec![a, b])
    }

    /// Creates a 2-input XNOR gate.
    pub fn create_xnor(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.add_node(NodeKind::Xnor, vec![a, b])
    }

    /// Creates a 3-input majority gate.
    pub fn create_maj(&mut self, a: NodeId, b: NodeId, c: NodeId) -> NodeId {
        self.add_node(NodeKind::Maj, vec![a, b, c])
    }

    /// Creates a named primary output driven by `driver`.
    pub fn create_po(&mut self, driver: NodeId, name: impl Into<ArcStr>) {
        self.outputs.push(Output {
            driver,
            name: Some(name.into()),
        });
    }

    /// Creates an unnamed primary output driven by `driver`.
    pub fn create_unnamed_po(&mut self, driver: NodeId) {
        self.outputs.push(Output { driver, name: None });
    }

    /// Sets the name of a node.
    pub fn set_node_name(&mut self, node: NodeId, name: impl Into<ArcStr>) {
        self.nodes[node.index()].name = Some(name.into());
    }

    fn check_node(&self, node: NodeId) -> Result<()> {
        if node.index() < self.nodes.len() {
            Ok(())
        } else {
            Err(Error::UnknownNode(node))
        }
    }

    /// The number of nodes, including primary inputs.
    #[inline]
    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    /// The number of primary inputs, including virtual ones.
    #[inline]
    pub fn num_pis(&self) -> usize {
        self.inputs.len()
    }

    /// The number of primary outputs.
    #[inline]
    pub fn num_pos(&self) -> usize {
        self.outputs.len()
    }

    /// The number of nodes that are neither primary inputs nor buffers.
    pub fn num_gates(&self) -> usize {
        self.nodes.iter().filter(|n| n.kind.is_gate()).count()
    }

    /// Returns the node with the given ID.
    #[inline]
    pub fn node(&self, node: NodeId) -> &Node {
        &self.nodes[node.index()]
    }

    /// Returns an iterator over all node IDs in topological order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    /// The primary inputs, in creation order.
    #[inline]
    pub fn pis(&self) -> &[NodeId] {
        &self.inputs
    }

    /// The real (non-virtual) primary inputs, in creation order.
    pub fn real_pis(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.inputs
            .iter()
            .copied()
            .filter(|pi| !self.is_virtual_pi(*pi))
    }

    /// The primary outputs, in creation order.
    #[inline]
    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    /// The name of the `index`-th primary output, if it has one.
    pub fn output_name(&self, index: usize) -> Option<&ArcStr> {
        self.outputs.get(index).and_then(|o| o.name.as_ref())
    }

    /// The kind of a node.
    #[inline]
    pub fn kind(&self, node: NodeId) -> NodeKind {
        self.nodes[node.index()].kind
    }

    /// The name of a node, if one was set.
    #[inline]
    pub fn node_name(&self, node: NodeId) -> Option<&ArcStr> {
        self.nodes[node.index()].name.as_ref()
    }

    /// The fanins of a node, in creation order.
    #[inline]
    pub fn fanins(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.index()].fanins
    }

    /// The nodes consuming the output of a node, in creation order.
    ///
    /// Primary outputs are not included.
    #[inline]
    pub fn fanouts(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.index()].fanouts
    }

    /// The number of fanins of a node.
    #[inline]
    pub fn fanin_size(&self, node: NodeId) -> usize {
        self.nodes[node.index()].fanins.len()
    }

    /// The number of consumers of a node, including primary outputs.
    pub fn fanout_size(&self, node: NodeId) -> usize {
        self.nodes[node.index()].fanouts.len() + self.num_po_refs(node)
    }

    /// The number of primary outputs driven by a node.
    pub fn num_po_refs(&self, node: NodeId) -> usize {
        self.outputs.iter().filter(|o| o.driver == node).count()
    }

    /// Returns `true` if the node is a primary input, real or virtual.
    #[inline]
    pub fn is_pi(&self, node: NodeId) -> bool {
        self.nodes[node.index()].kind == NodeKind::Pi
    }

    /// Returns `true` if the node is a virtual primary input.
    #[inline]
    pub fn is_virtual_pi(&self, node: NodeId) -> bool {
        self.nodes[node.index()].duplicate_of.is_some()
    }

    /// The real primary input a node duplicates, or the node itself.
    #[inline]
    pub fn real_pi(&self, node: NodeId) -> NodeId {
        self.nodes[node.index()].duplicate_of.unwrap_or(node)
    }

    /// Returns `true` if the node drives at least one primary output.
    pub fn is_po(&self, node: NodeId) -> bool {
        self.outputs.iter().any(|o| o.driver == node)
    }

    /// Returns `true` if the node is a fan-out node,
    /// ie. a buffer with more than one consumer.
    pub fn is_fanout(&self, node: NodeId) -> bool {
        self.kind(node) == NodeKind::Buf && self.fanout_size(node) > 1
    }

    /// Returns the first node with more than `limit` fanins, if any.
    pub fn find_high_degree_fanin(&self, limit: usize) -> Option<NodeId> {
        self.nodes().find(|n| self.fanin_size(*n) > limit)
    }

    /// Computes the level of every node, indexed by [`NodeId::index`].
    ///
    /// Primary inputs are on level 0; every other node lies one level
    /// below its deepest fanin.
    pub fn levels(&self) -> Vec<u32> {
        let mut levels: Vec<u32> = Vec::with_capacity(self.nodes.len());
        for node in self.nodes.iter() {
            let level = node
                .fanins
                .iter()
                .map(|f| levels[f.index()] + 1)
                .max()
                .unwrap_or(0);
            levels.push(level);
        }
        levels
    }

    /// The largest level of any node.
    pub fn depth(&self) -> u32 {
        self.levels().into_iter().max().unwrap_or(0)
    }

    /// Returns `true` if every fanin of every node lies exactly one level above it.
    ///
    /// If `unify_outputs` is set, every primary output must additionally
    /// be driven from the deepest level.
    pub fn is_balanced(&self, unify_outputs: bool) -> bool {
        let levels = self.levels();
        for node in self.nodes() {
            for fanin in self.fanins(node) {
                if levels[fanin.index()] + 1 != levels[node.index()] {
                    tracing::event!(
                        Level::DEBUG,
                        %node,
                        %fanin,
                        "unbalanced edge spans more than one level"
                    );
                    return false;
                }
            }
        }
        if unify_outputs {
            let depth = levels.iter().copied().max().unwrap_or(0);
            if let Some(output) = self
                .outputs
                .iter()
                .find(|o| levels[o.driver.index()] != depth)
            {
                tracing::event!(
                    Level::DEBUG,
                    driver = %output.driver,
                    "primary output is not driven from the deepest level"
                );
                return false;
            }
        }
        true
    }
}
