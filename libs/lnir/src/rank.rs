//! Mutable rank orders over the levels of a network.

use std::cmp::Ordering;
use std::ops::Deref;

use arcstr::ArcStr;
use tracing::Level;

use crate::{Error, Network, NodeId, Result};

/// A [`Network`] together with a left-to-right order of the nodes on each level.
///
/// The position of a node within its level is its *rank*. Ranks are stored
/// as one array of node IDs per level, plus a node-indexed array of positions
/// that is kept in sync by every mutating operation.
///
/// The network itself is immutable through a rank view;
/// only the rank order can change.
#[derive(Debug, Clone)]
pub struct RankView {
    network: Network,
    levels: Vec<u32>,
    ranks: Vec<Vec<NodeId>>,
    positions: Vec<usize>,
}

impl RankView {
    /// Creates a rank view in which every level is ordered by node creation.
    pub fn new(network: Network) -> Self {
        let levels = network.levels();
        let depth = levels.iter().copied().max().unwrap_or(0);
        let mut ranks = vec![Vec::new(); depth as usize + 1];
        let mut positions = vec![0; network.size()];
        for node in network.nodes() {
            let rank = &mut ranks[levels[node.index()] as usize];
            positions[node.index()] = rank.len();
            rank.push(node);
        }
        Self {
            network,
            levels,
            ranks,
            positions,
        }
    }

    /// Creates a rank view with the given order for each level.
    ///
    /// `ranks[l]` must be a permutation of the nodes on level `l`.
    pub fn with_ranks(network: Network, ranks: Vec<Vec<NodeId>>) -> Result<Self> {
        let mut view = Self::new(network);
        view.set_all_ranks(ranks)?;
        Ok(view)
    }

    /// The underlying network.
    #[inline]
    pub fn network(&self) -> &Network {
        &self.network
    }

    /// Consumes the view, returning the underlying network.
    pub fn into_network(self) -> Network {
        self.network
    }

    /// The level of a node.
    #[inline]
    pub fn level(&self, node: NodeId) -> u32 {
        self.levels[node.index()]
    }

    /// The deepest level.
    #[inline]
    pub fn depth(&self) -> u32 {
        (self.ranks.len() - 1) as u32
    }

    /// The number of levels, ie. `depth() + 1`.
    #[inline]
    pub fn num_levels(&self) -> usize {
        self.ranks.len()
    }

    /// The nodes on `level`, in rank order.
    #[inline]
    pub fn rank(&self, level: u32) -> &[NodeId] {
        &self.ranks[level as usize]
    }

    /// The number of nodes on `level`.
    #[inline]
    pub fn rank_width(&self, level: u32) -> usize {
        self.ranks[level as usize].len()
    }

    /// The number of nodes on the widest level.
    pub fn width(&self) -> usize {
        self.ranks.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// The position of a node within its level.
    #[inline]
    pub fn rank_position(&self, node: NodeId) -> usize {
        self.positions[node.index()]
    }

    /// The node at `position` on `level`.
    #[inline]
    pub fn at_rank_position(&self, level: u32, position: usize) -> NodeId {
        self.ranks[level as usize][position]
    }

    /// Returns the given nodes sorted by ascending rank position.
    pub fn sorted_by_rank(&self, nodes: &[NodeId]) -> Vec<NodeId> {
        let mut sorted = nodes.to_vec();
        sorted.sort_by_key(|n| self.rank_position(*n));
        sorted
    }

    /// Exchanges the rank positions of two nodes on the same level.
    pub fn swap(&mut self, a: NodeId, b: NodeId) -> Result<()> {
        let level = self.level(a);
        if level != self.level(b) {
            return Err(Error::LevelMismatch(a, b));
        }
        let (pa, pb) = (self.rank_position(a), self.rank_position(b));
        self.ranks[level as usize].swap(pa, pb);
        self.positions[a.index()] = pb;
        self.positions[b.index()] = pa;
        Ok(())
    }

    /// Replaces the order of `level`.
    ///
    /// Returns an error, leaving the view unchanged, if `order` is not
    /// a permutation of the nodes on `level`.
    pub fn set_rank(&mut self, level: u32, order: Vec<NodeId>) -> Result<()> {
        self.check_rank(level, &order)?;
        self.install_rank(level, order);
        Ok(())
    }

    /// Stably sorts `level` with the given comparator.
    pub fn sort_rank_by(&mut self, level: u32, compare: impl FnMut(&NodeId, &NodeId) -> Ordering) {
        let mut order = std::mem::take(&mut self.ranks[level as usize]);
        order.sort_by(compare);
        self.install_rank(level, order);
    }

    /// A copy of the orders of all levels.
    pub fn all_ranks(&self) -> Vec<Vec<NodeId>> {
        self.ranks.clone()
    }

    /// Replaces the orders of all levels.
    ///
    /// Every order is checked before any level is changed.
    pub fn set_all_ranks(&mut self, ranks: Vec<Vec<NodeId>>) -> Result<()> {
        if ranks.len() != self.ranks.len() {
            return Err(Error::InvalidRank {
                level: ranks.len() as u32,
                reason: arcstr::format!(
                    "expected orders for {} levels, got {}",
                    self.ranks.len(),
                    ranks.len()
                ),
            });
        }
        for (level, order) in ranks.iter().enumerate() {
            self.check_rank(level as u32, order)?;
        }
        for (level, order) in ranks.into_iter().enumerate() {
            self.install_rank(level as u32, order);
        }
        Ok(())
    }

    /// Returns `true` if the ranks and the position index agree,
    /// and every node appears exactly once on its own level.
    pub fn is_valid(&self) -> bool {
        let mut seen = vec![false; self.network.size()];
        for (level, order) in self.ranks.iter().enumerate() {
            for (position, node) in order.iter().enumerate() {
                if seen[node.index()]
                    || self.levels[node.index()] as usize != level
                    || self.positions[node.index()] != position
                {
                    return false;
                }
                seen[node.index()] = true;
            }
        }
        seen.into_iter().all(|s| s)
    }

    fn check_rank(&self, level: u32, order: &[NodeId]) -> Result<()> {
        let invalid = |reason: ArcStr| Error::InvalidRank { level, reason };
        let current = self
            .ranks
            .get(level as usize)
            .ok_or_else(|| invalid(arcstr::literal!("level does not exist")))?;
        if order.len() != current.len() {
            return Err(invalid(arcstr::format!(
                "expected {} nodes, got {}",
                current.len(),
                order.len()
            )));
        }
        let mut seen = vec![false; order.len()];
        for node in order {
            if node.index() >= self.network.size() {
                return Err(Error::UnknownNode(*node));
            }
            if self.level(*node) != level {
                return Err(invalid(arcstr::format!("{node} lies on another level")));
            }
            let position = self.rank_position(*node);
            if seen[position] {
                return Err(invalid(arcstr::format!("{node} appears more than once")));
            }
            seen[position] = true;
        }
        Ok(())
    }

    fn install_rank(&mut self, level: u32, order: Vec<NodeId>) {
        for (position, node) in order.iter().enumerate() {
            self.positions[node.index()] = position;
        }
        tracing::event!(Level::TRACE, level, ?order, "updated rank order");
        self.ranks[level as usize] = order;
    }
}

impl Deref for RankView {
    type Target = Network;

    fn deref(&self) -> &Self::Target {
        &self.network
    }
}

impl From<Network> for RankView {
    fn from(value: Network) -> Self {
        Self::new(value)
    }
}
