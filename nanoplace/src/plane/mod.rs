//! PLANE: placement and routing of planar networks.
//!
//! The placer walks a crossing-free [`RankView`] level by level and assigns every
//! node a tile of a 2DDWave-clocked layout. Rank order becomes left-to-right tile
//! order: primary inputs are spread along a diagonal, single-input nodes extend
//! their predecessor east or south, and two-input gates sit on the corner where
//! the wires of both predecessors meet. Primary outputs are routed east to a
//! common output column.
//!
//! # Example
//!
//! ```
//! # use lnir::{Network, RankView};
//! # use nanoplace::plane::{plane, PlaneParams};
//! let mut ntk = Network::with_name("and");
//! let a = ntk.create_pi("a");
//! let b = ntk.create_pi("b");
//! let f = ntk.create_and(a, b);
//! ntk.create_po(f, "f");
//!
//! let (layout, stats) = plane(&RankView::new(ntk), &PlaneParams::default()).unwrap();
//! assert_eq!(layout.num_gates(), 1);
//! assert_eq!(stats.num_crossings, 0);
//! assert_eq!(layout.simulate().unwrap()[0].to_hex(), "8");
//! ```

mod cases;
mod wiring;


use std::time::{Duration, Instant};

use arcstr::ArcStr;
use derive_builder::Builder;
use itertools::Itertools;
use lnir::{NodeId, RankView};
use serde::{Deserialize, Serialize};
use tiles::{AspectRatio, Tile, CROSSING};
use tracing::{span, Level};

pub use cases::{
    buffer_case, fanout_case, is_southwards, Allowed, Case, Orientation, BUFFER_CASES,
    FANOUT_CASES,
};
pub use wiring::compute_wiring;

use crate::clocking::{ClockingScheme, NumClocks};
use crate::layout::{GateLevelLayout, LayoutNodeId};
use crate::mincross::count_crossings;
use crate::planarity::check_planarity;
use crate::{Error, Result};

/// The largest fanin size the placer supports.
pub const MAX_FANIN_SIZE: usize = 2;

/// The largest number of primary outputs a single node may drive.
pub const MAX_OUTPUTS_PER_NODE: u8 = 2;

/// Parameters of the placer.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Builder, Serialize, Deserialize)]
#[builder(pattern = "owned", default)]
#[serde(default)]
pub struct PlaneParams {
    /// The number of clock phases of the 2DDWave scheme. Must be 3 or 4.
    pub num_clock_phases: u8,
    /// Log a summary of the placement at `INFO`.
    pub verbose: bool,
}

impl Default for PlaneParams {
    fn default() -> Self {
        Self {
            num_clock_phases: 4,
            verbose: false,
        }
    }
}

impl PlaneParams {
    /// Creates a new [`PlaneParamsBuilder`].
    pub fn builder() -> PlaneParamsBuilder {
        Default::default()
    }

    /// The clocking scheme of the resulting layout.
    pub fn clocking_scheme(&self) -> Result<ClockingScheme> {
        NumClocks::from_count(self.num_clock_phases)
            .map(ClockingScheme::twoddwave)
            .ok_or_else(|| {
                Error::Config(format!(
                    "unsupported number of clock phases: {}",
                    self.num_clock_phases
                ))
            })
    }
}

/// Statistics of a placement run.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlaneStats {
    /// The number of columns of the layout.
    pub x_size: u64,
    /// The number of rows of the layout.
    pub y_size: u64,
    /// The number of logic gates.
    pub num_gates: usize,
    /// The number of wire segments.
    pub num_wires: usize,
    /// The number of crossing tiles.
    pub num_crossings: usize,
    /// The wall-clock time of the run.
    pub duration: Duration,
}

/// Places and routes a planar network.
///
/// The rank order of `view` must be free of crossings, and every node may have
/// at most [`MAX_FANIN_SIZE`] fanins. Both conditions are checked before placement
/// starts.
pub fn plane(view: &RankView, params: &PlaneParams) -> Result<(GateLevelLayout, PlaneStats)> {
    let start = Instant::now();
    let _guard = span!(
        Level::INFO,
        "placing network",
        size = view.size(),
        depth = view.depth()
    )
    .entered();
    let scheme = params.clocking_scheme()?;

    if let Some(node) = view.find_high_degree_fanin(MAX_FANIN_SIZE) {
        return Err(Error::FaninTooLarge {
            node,
            fanin_size: view.fanin_size(node),
        });
    }
    let crossings = count_crossings(view);
    if crossings != 0 || !check_planarity(view)? {
        return Err(Error::NotPlanar { crossings });
    }

    let mut placer = Placer::new(view, scheme);
    for level in 0..view.num_levels() as u32 {
        placer.place_level(level)?;
    }
    placer.route_outputs()?;
    let layout = placer.finish();

    let ratio = layout.aspect_ratio();
    let stats = PlaneStats {
        x_size: ratio.width(),
        y_size: ratio.height(),
        num_gates: layout.num_gates(),
        num_wires: layout.num_wires(),
        num_crossings: layout.num_crossings(),
        duration: start.elapsed(),
    };
    if params.verbose {
        tracing::event!(
            Level::INFO,
            x_size = stats.x_size,
            y_size = stats.y_size,
            num_gates = stats.num_gates,
            num_wires = stats.num_wires,
            num_crossings = stats.num_crossings,
            duration = ?stats.duration,
            "placed network"
        );
    }
    Ok((layout, stats))
}

struct Placer<'a> {
    view: &'a RankView,
    layout: GateLevelLayout,
    /// The tile carrying the signal of each network node.
    positions: Vec<Option<Tile>>,
    /// The layout node of each primary input.
    inputs: Vec<Option<LayoutNodeId>>,
    /// The tile of the first node of the most recent level.
    first: Tile,
    /// The most recently placed tile.
    last: Tile,
    /// The output column and the lowest row of the finished layout.
    extent: Tile,
}

impl<'a> Placer<'a> {
    fn new(view: &'a RankView, scheme: ClockingScheme) -> Self {
        let mut layout = GateLevelLayout::new(
            AspectRatio::with_layers(u64::MAX, u64::MAX, CROSSING),
            scheme,
        );
        if let Some(name) = view.name() {
            layout.set_name(name.clone());
        }

        let mut inputs = vec![None; view.size()];
        for (i, pi) in view.pis().iter().enumerate() {
            let name = view
                .node_name(view.real_pi(*pi))
                .cloned()
                .unwrap_or_else(|| arcstr::format!("pi{i}"));
            inputs[pi.index()] = Some(layout.reserve_pi(name));
        }

        Self {
            view,
            layout,
            positions: vec![None; view.size()],
            inputs,
            first: Tile::new(view.num_pis().saturating_sub(1) as u64, 0),
            last: Tile::default(),
            extent: Tile::default(),
        }
    }

    fn position(&self, node: NodeId) -> Result<Tile> {
        self.positions[node.index()].ok_or(Error::Unplaced { node })
    }

    fn place_level(&mut self, level: u32) -> Result<()> {
        let view = self.view;
        let rank = view.rank(level);
        let cases = self.level_cases(level)?;

        let two_input = rank
            .iter()
            .positions(|n| view.fanin_size(*n) == 2)
            .collect::<Vec<_>>();
        let gaps = two_input
            .iter()
            .map(|i| self.fanin_gap(rank[*i]))
            .collect::<Result<Vec<_>>>()?;
        let new_lines = cases.iter().map(|c| c.new_lines).collect::<Vec<_>>();
        let (x, y) = compute_wiring(&new_lines, &two_input, &gaps);
        tracing::event!(Level::DEBUG, level, width = rank.len(), ?x, ?y, "routing offsets");

        for (i, node) in rank.iter().enumerate() {
            let tile = match view.fanin_size(*node) {
                0 => self.place_input(*node)?,
                1 => self.place_single(*node, cases[i].orientation, x[i], y[i])?,
                _ => self.place_double(*node, x[i], y[i])?,
            };
            tracing::event!(Level::TRACE, %node, %tile, "placed node");
            self.positions[node.index()] = Some(tile);
            self.last = tile;
            if level > 0 && i == 0 {
                self.first = tile;
            }
        }
        Ok(())
    }

    /// Classifies the nodes of a level.
    fn level_cases(&self, level: u32) -> Result<Vec<Case>> {
        let view = self.view;
        let rank = view.rank(level);
        let mut cases = vec![Case::default(); rank.len()];

        for (i, node) in rank.iter().enumerate() {
            let gap = self.predecessor_gap(level, *node)?;
            let prev = i.checked_sub(1).map(|p| cases[p].orientation);
            match view.fanin_size(*node) {
                2 => {
                    if prev == Some(2) && gap == 0 {
                        cases[i].orientation = 1;
                    }
                }
                1 => {
                    let allowed = self.allowed(*node);
                    if view.is_fanout(*node) {
                        let fanout_type = self.fanout_type(*node);
                        match prev {
                            Some(prev) => {
                                cases[i] = fanout_case(fanout_type, allowed, gap, prev)
                            }
                            None if fanout_type == 0 || fanout_type == 2 => {
                                cases[i].orientation = 1
                            }
                            None => (),
                        }
                    } else {
                        match prev {
                            Some(prev) => {
                                let second = self.feeds_second_input(*node);
                                cases[i] = buffer_case(second, allowed, gap, prev);
                            }
                            None => cases[i].orientation = self.start_orientation(level),
                        }
                    }
                }
                _ => (),
            }
        }
        Ok(cases)
    }

    /// The number of free rows (at most 2) between the first predecessor of `node`
    /// and the predecessor's upper neighbor.
    fn predecessor_gap(&self, level: u32, node: NodeId) -> Result<u64> {
        if level == 0 {
            return Ok(0);
        }
        let view = self.view;
        let Some(pre) = view.sorted_by_rank(view.fanins(node)).first().copied() else {
            return Ok(0);
        };
        let position = view.rank_position(pre);
        if position == 0 {
            return Ok(0);
        }
        let neighbor = view.at_rank_position(level - 1, position - 1);
        let (a, b) = (self.position(pre)?, self.position(neighbor)?);
        Ok(a.y.saturating_sub(b.y + 1).min(2))
    }

    /// The number of rows between the two predecessors of a two-input node.
    fn fanin_gap(&self, node: NodeId) -> Result<u64> {
        let fanins = self.view.sorted_by_rank(self.view.fanins(node));
        match fanins.as_slice() {
            [a, b] => Ok(self
                .position(*b)?
                .y
                .saturating_sub(self.position(*a)?.y + 1)),
            _ => Ok(0),
        }
    }

    fn allowed(&self, node: NodeId) -> Allowed {
        let view = self.view;
        let Some(pre) = view.fanins(node).first().copied() else {
            return Allowed::Free;
        };
        if !view.is_fanout(pre) {
            return Allowed::Free;
        }
        if view.sorted_by_rank(view.fanouts(pre)).first() == Some(&node) {
            Allowed::East
        } else {
            Allowed::South
        }
    }

    fn fanout_type(&self, node: NodeId) -> usize {
        let view = self.view;
        if view.is_po(node) {
            return 0;
        }
        let fanouts = view.sorted_by_rank(view.fanouts(node));
        let single = |n: &NodeId| view.fanin_size(*n) == 1;
        match (
            fanouts.first().map_or(true, single),
            fanouts.get(1).map_or(true, single),
        ) {
            (true, true) => 0,
            (true, false) => 1,
            (false, true) => 2,
            (false, false) => 3,
        }
    }

    /// Returns `true` if `node` drives the second input of a two-input gate.
    fn feeds_second_input(&self, node: NodeId) -> bool {
        let view = self.view;
        if view.is_po(node) {
            return false;
        }
        match view.fanouts(node) {
            [consumer] if view.fanin_size(*consumer) == 2 => {
                view.sorted_by_rank(view.fanins(*consumer)).get(1) == Some(&node)
            }
            _ => false,
        }
    }

    fn start_orientation(&self, level: u32) -> Orientation {
        if level == 0 {
            return 0;
        }
        let view = self.view;
        for node in view.rank(level) {
            match view.fanins(*node) {
                [_, _] => return 3,
                [pre] if view.is_fanout(*pre) && view.fanout_size(*pre) == 2 => return 0,
                _ => (),
            }
            if view.fanout_size(*node) == 2 {
                return 0;
            }
        }
        0
    }

    fn place_input(&mut self, node: NodeId) -> Result<Tile> {
        let pi = self.inputs[node.index()].ok_or(Error::Unplaced { node })?;
        if self.view.rank_position(node) == 0 {
            self.layout.move_node(pi, self.first, Vec::new())?;
            return Ok(self.first);
        }

        let target = Tile::new(self.last.x.saturating_sub(1), self.last.y + 1);
        if target.x == 0 {
            self.layout.move_node(pi, target, Vec::new())?;
        } else if target.x < self.first.x / 2 {
            let pin = Tile::new(0, target.y);
            self.layout.move_node(pi, pin, Vec::new())?;
            let end = self.wire_east(pin, target)?;
            self.layout.create_buf(end, target)?;
        } else {
            let pin = Tile::new(target.x, 0);
            self.layout.move_node(pi, pin, Vec::new())?;
            let end = self.wire_south(pin, target)?;
            self.layout.create_buf(end, target)?;
        }
        Ok(target)
    }

    fn place_single(
        &mut self,
        node: NodeId,
        orientation: Orientation,
        dx: u64,
        dy: u64,
    ) -> Result<Tile> {
        let view = self.view;
        let pre = view.fanins(node)[0];
        let mut at = self.position(pre)?;
        let turning = view.is_fanout(pre) && is_southwards(orientation);

        if !turning {
            if dx > 0 {
                at = self.wire_east(at, Tile::new(at.x + dx + 1, at.y))?;
            }
            if dy > 0 {
                at = self.wire_south(at, Tile::new(at.x, at.y + dy + 1))?;
            }
        }
        let target = if is_southwards(orientation) {
            if turning {
                at.x += dx;
                if dy > 0 {
                    at = self.wire_south(at, Tile::new(at.x, at.y + dy + 1))?;
                }
            }
            Tile::new(at.x, at.y + 1)
        } else {
            Tile::new(at.x + 1, at.y)
        };

        let child = if target.y == at.y && target.x > at.x {
            self.wire_east(at, target)?
        } else if target.x == at.x && target.y > at.y {
            self.wire_south(at, target)?
        } else {
            return Err(Error::Unroutable {
                from: at,
                to: target,
            });
        };
        self.create_node(node, vec![child], target)
    }

    fn place_double(&mut self, node: NodeId, dx: u64, dy: u64) -> Result<Tile> {
        let fanins = self.view.fanins(node);
        let mut a = self.position(fanins[0])?;
        let mut b = self.position(fanins[1])?;

        if dx > 0 {
            a = self.wire_east(a, Tile::new(a.x + dx + 1, a.y))?;
            b = self.wire_east(b, Tile::new(b.x + dx + 1, b.y))?;
        }
        if dy > 0 {
            a = self.wire_south(a, Tile::new(a.x, a.y + dy + 1))?;
            b = self.wire_south(b, Tile::new(b.x, b.y + dy + 1))?;
        }
        // `a` is the northern predecessor and enters the gate from above.
        if b.y < a.y {
            std::mem::swap(&mut a, &mut b);
        }
        let target = Tile::new(a.x, b.y);
        let children = vec![self.wire_south(a, target)?, self.wire_east(b, target)?];
        self.create_node(node, children, target)
    }

    fn create_node(&mut self, node: NodeId, children: Vec<Tile>, tile: Tile) -> Result<Tile> {
        let id = self
            .layout
            .create_gate(self.view.kind(node), children, tile)?;
        if let Some(name) = self.view.node_name(node) {
            self.layout.set_node_name(id, name.clone());
        }
        Ok(tile)
    }

    /// Routes a straight wire from `source` eastwards up to, but excluding, `target`.
    ///
    /// Segments that already carry the signal of `source` are shared, other
    /// occupied ground tiles are crossed on the crossing layer.
    /// Returns the last tile of the wire, or `source` if no wire is needed.
    fn wire_east(&mut self, source: Tile, target: Tile) -> Result<Tile> {
        let mut last = source;
        for x in source.x + 1..target.x {
            last = self.extend_wire(last, Tile::new(x, source.y))?;
        }
        Ok(last)
    }

    /// Routes a straight wire from `source` southwards up to, but excluding, `target`.
    fn wire_south(&mut self, source: Tile, target: Tile) -> Result<Tile> {
        let mut last = source;
        for y in source.y + 1..target.y {
            last = self.extend_wire(last, Tile::new(source.x, y))?;
        }
        Ok(last)
    }

    fn extend_wire(&mut self, from: Tile, ground: Tile) -> Result<Tile> {
        for tile in [ground, ground.above()] {
            if self.layout.is_empty_tile(tile) {
                self.layout.create_buf(from, tile)?;
                return Ok(tile);
            }
            if self.layout.is_wire_tile(tile) && self.layout.children(tile) == [from] {
                return Ok(tile);
            }
        }
        Err(Error::TileOccupied {
            tile: ground.above(),
        })
    }

    /// Routes every primary output east to a common output column.
    ///
    /// The drivers on the deepest level are stacked like the nodes of a level
    /// first. A driver with two outputs opens a line below it, so its second
    /// output can be deflected one row south without meeting the outputs of
    /// the drivers underneath.
    fn route_outputs(&mut self) -> Result<()> {
        let view = self.view;
        let mut counts = vec![0u8; view.size()];
        for output in view.outputs() {
            let count = &mut counts[output.driver.index()];
            if *count == MAX_OUTPUTS_PER_NODE {
                tracing::event!(
                    Level::ERROR,
                    node = %output.driver,
                    "node drives more than two primary outputs"
                );
                return Err(Error::TooManyOutputs {
                    node: output.driver,
                });
            }
            *count += 1;
        }

        let deepest = view.rank(view.depth());
        let new_lines = std::iter::once(0)
            .chain(
                deepest
                    .iter()
                    .tuple_windows()
                    .map(|(above, _)| u64::from(counts[above.index()] == MAX_OUTPUTS_PER_NODE)),
            )
            .collect::<Vec<_>>();
        let (x, y) = compute_wiring(&new_lines, &[], &[]);
        tracing::event!(Level::DEBUG, ?x, ?y, "output offsets");

        let mut column = self.first.x;
        for (i, node) in deepest.iter().enumerate() {
            let mut at = self.position(*node)?;
            if counts[node.index()] > 0 {
                if x[i] > 0 {
                    at = self.wire_east(at, Tile::new(at.x + x[i] + 1, at.y))?;
                }
                if y[i] > 0 {
                    at = self.wire_south(at, Tile::new(at.x, at.y + y[i] + 1))?;
                }
                self.positions[node.index()] = Some(at);
            }
            column = column.max(at.x);
        }
        column += 1;

        let mut bottom = self.last.y;
        let mut routed = vec![false; view.size()];
        for (index, output) in view.outputs().iter().enumerate() {
            let driver = output.driver;
            let mut at = self.position(driver)?;
            if routed[driver.index()] {
                at = self.wire_south(at, Tile::new(at.x, at.y + 2))?;
            }
            let target = Tile::new(column, at.y);
            let child = self.wire_east(at, target)?;
            let name: ArcStr = output
                .name
                .clone()
                .unwrap_or_else(|| arcstr::format!("po{index}"));
            self.layout.create_po(child, name, target)?;
            routed[driver.index()] = true;
            bottom = bottom.max(target.y);
        }
        self.extent = Tile::new(column, bottom);
        Ok(())
    }

    fn finish(mut self) -> GateLevelLayout {
        let layers = self.layout.bounding_box().map_or(0, |bb| bb.z);
        self.layout.resize(AspectRatio::with_layers(
            self.extent.x,
            self.extent.y,
            layers,
        ));
        self.layout
    }
}
