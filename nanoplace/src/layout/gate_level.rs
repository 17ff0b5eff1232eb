//! Gate-level layouts.

use std::fmt::Display;
use std::ops::{Deref, DerefMut};

use arcstr::ArcStr;
use indexmap::IndexMap;
use lnir::sim::MAX_SIMULATION_VARS;
use lnir::{NodeKind, TruthTable};
use serde::{Deserialize, Serialize};
use tiles::{AspectRatio, BoundingBox, Tile};
use tracing::Level;

use super::ClockedLayout;
use crate::clocking::ClockingScheme;
use crate::{Error, Result};

/// An opaque identifier of a node placed in a [`GateLevelLayout`].
#[derive(
    Copy, Clone, Debug, Default, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize,
)]
pub struct LayoutNodeId(u32);

impl LayoutNodeId {
    /// The index of this node in its layout's node arena.
    #[inline]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

impl Display for LayoutNodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "l{}", self.0)
    }
}

/// What occupies a tile.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Element {
    /// A primary input pin.
    Pi,
    /// A primary output pin.
    Po,
    /// A logic function. [`NodeKind::Buf`] denotes a wire segment.
    Function(NodeKind),
}

impl Element {
    /// Returns `true` for wire segments.
    #[inline]
    pub fn is_wire(&self) -> bool {
        matches!(*self, Self::Function(NodeKind::Buf))
    }

    /// Returns `true` for logic gates, including inverters.
    #[inline]
    pub fn is_gate(&self) -> bool {
        matches!(*self, Self::Function(kind) if kind.is_gate())
    }

    /// The number of incoming signals this element consumes.
    pub fn arity(&self) -> usize {
        match *self {
            Self::Pi => 0,
            Self::Po => 1,
            Self::Function(kind) => kind.arity(),
        }
    }
}

/// A node of a [`GateLevelLayout`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutNode {
    element: Element,
    tile: Option<Tile>,
    children: Vec<Tile>,
    name: Option<ArcStr>,
}

impl LayoutNode {
    /// What the node is.
    #[inline]
    pub fn element(&self) -> Element {
        self.element
    }

    /// The tile the node occupies, if it has been placed.
    #[inline]
    pub fn tile(&self) -> Option<Tile> {
        self.tile
    }

    /// The tiles whose signals the node consumes.
    #[inline]
    pub fn children(&self) -> &[Tile] {
        &self.children
    }

    /// The signal name of the node, if any.
    #[inline]
    pub fn name(&self) -> Option<&ArcStr> {
        self.name.as_ref()
    }
}

/// A clocked layout whose tiles are occupied by logic nodes.
///
/// Every node records the tiles it receives signals from (its *children*).
/// Tiles on layer 1 are crossings. They may hold wire segments only.
#[derive(Debug, Clone)]
pub struct GateLevelLayout {
    clocked: ClockedLayout,
    name: Option<ArcStr>,
    nodes: Vec<LayoutNode>,
    tiles: IndexMap<Tile, LayoutNodeId>,
    pis: Vec<LayoutNodeId>,
    pos: Vec<LayoutNodeId>,
}

impl GateLevelLayout {
    /// Creates an empty layout with the given extent and clocking scheme.
    pub fn new(ratio: AspectRatio, scheme: ClockingScheme) -> Self {
        Self::from_clocked(ClockedLayout::new(ratio, scheme))
    }

    /// Creates an empty layout on top of a clocked layout.
    pub fn from_clocked(clocked: ClockedLayout) -> Self {
        Self {
            clocked,
            name: None,
            nodes: Vec::new(),
            tiles: IndexMap::new(),
            pis: Vec::new(),
            pos: Vec::new(),
        }
    }

    /// The name of the layout.
    #[inline]
    pub fn name(&self) -> Option<&ArcStr> {
        self.name.as_ref()
    }

    /// Sets the name of the layout.
    pub fn set_name(&mut self, name: impl Into<ArcStr>) {
        self.name = Some(name.into());
    }

    /// The underlying clocked layout.
    #[inline]
    pub fn clocked(&self) -> &ClockedLayout {
        &self.clocked
    }

    fn add_node(
        &mut self,
        element: Element,
        tile: Option<Tile>,
        children: Vec<Tile>,
        name: Option<ArcStr>,
    ) -> Result<LayoutNodeId> {
        if let Some(tile) = tile {
            self.check_free(tile)?;
        }
        let id = LayoutNodeId(self.nodes.len() as u32);
        self.nodes.push(LayoutNode {
            element,
            tile,
            children,
            name,
        });
        if let Some(tile) = tile {
            self.tiles.insert(tile, id);
        }
        match element {
            Element::Pi => self.pis.push(id),
            Element::Po => self.pos.push(id),
            Element::Function(_) => (),
        }
        Ok(id)
    }

    fn check_free(&self, tile: Tile) -> Result<()> {
        if !self.is_within_bounds(tile) {
            return Err(Error::OutOfBounds { tile });
        }
        if self.tiles.contains_key(&tile) {
            return Err(Error::TileOccupied { tile });
        }
        Ok(())
    }

    /// Creates a named primary input on `tile`.
    pub fn create_pi(&mut self, name: impl Into<ArcStr>, tile: Tile) -> Result<LayoutNodeId> {
        self.add_node(Element::Pi, Some(tile), Vec::new(), Some(name.into()))
    }

    /// Creates a named primary input that has not been placed yet.
    ///
    /// Use [`GateLevelLayout::move_node`] to place it.
    pub fn reserve_pi(&mut self, name: impl Into<ArcStr>) -> LayoutNodeId {
        let id = LayoutNodeId(self.nodes.len() as u32);
        self.nodes.push(LayoutNode {
            element: Element::Pi,
            tile: None,
            children: Vec::new(),
            name: Some(name.into()),
        });
        self.pis.push(id);
        id
    }

    /// Creates a named primary output on `tile` that receives its signal from `child`.
    pub fn create_po(
        &mut self,
        child: Tile,
        name: impl Into<ArcStr>,
        tile: Tile,
    ) -> Result<LayoutNodeId> {
        self.add_node(Element::Po, Some(tile), vec![child], Some(name.into()))
    }

    /// Creates a wire segment on `tile` that receives its signal from `child`.
    pub fn create_buf(&mut self, child: Tile, tile: Tile) -> Result<LayoutNodeId> {
        self.create_gate(NodeKind::Buf, vec![child], tile)
    }

    /// Creates an inverter on `tile` that receives its signal from `child`.
    pub fn create_not(&mut self, child: Tile, tile: Tile) -> Result<LayoutNodeId> {
        self.create_gate(NodeKind::Inv, vec![child], tile)
    }

    /// Creates a logic node of the given kind on `tile`.
    ///
    /// Returns an error if `kind` is [`NodeKind::Pi`] or if the number of children
    /// does not match the arity of `kind`.
    pub fn create_gate(
        &mut self,
        kind: NodeKind,
        children: Vec<Tile>,
        tile: Tile,
    ) -> Result<LayoutNodeId> {
        if kind == NodeKind::Pi || children.len() != kind.arity() {
            return Err(lnir::Error::ArityMismatch {
                kind,
                expected: kind.arity(),
                actual: children.len(),
            }
            .into());
        }
        self.add_node(Element::Function(kind), Some(tile), children, None)
    }

    /// Moves a node to `tile` and replaces its children.
    ///
    /// Moving a node onto its current tile only replaces the children.
    pub fn move_node(&mut self, node: LayoutNodeId, tile: Tile, children: Vec<Tile>) -> Result<()> {
        let current = self.node(node).tile;
        if current != Some(tile) {
            self.check_free(tile)?;
            if let Some(current) = current {
                self.tiles.shift_remove(&current);
            }
            self.tiles.insert(tile, node);
        }
        let n = &mut self.nodes[node.index()];
        n.tile = Some(tile);
        n.children = children;
        tracing::event!(Level::TRACE, %node, %tile, "moved node");
        Ok(())
    }

    /// Removes the node on `tile` from the layout.
    ///
    /// The node stays in the node arena, unplaced and without children,
    /// but it no longer counts as a primary input or output.
    pub fn clear_tile(&mut self, tile: Tile) -> Result<LayoutNodeId> {
        let id = self
            .tiles
            .shift_remove(&tile)
            .ok_or(Error::UnknownTile { tile })?;
        let node = &mut self.nodes[id.index()];
        node.tile = None;
        node.children.clear();
        self.pis.retain(|n| *n != id);
        self.pos.retain(|n| *n != id);
        Ok(id)
    }

    /// Sets the signal name of a node.
    pub fn set_node_name(&mut self, node: LayoutNodeId, name: impl Into<ArcStr>) {
        self.nodes[node.index()].name = Some(name.into());
    }

    /// Returns the node with the given ID.
    #[inline]
    pub fn node(&self, node: LayoutNodeId) -> &LayoutNode {
        &self.nodes[node.index()]
    }

    /// The node occupying `tile`, if any.
    #[inline]
    pub fn node_at(&self, tile: Tile) -> Option<LayoutNodeId> {
        self.tiles.get(&tile).copied()
    }

    /// The tile occupied by `node`, if it has been placed.
    #[inline]
    pub fn tile_of(&self, node: LayoutNodeId) -> Option<Tile> {
        self.node(node).tile
    }

    /// The element occupying `tile`, if any.
    pub fn element_at(&self, tile: Tile) -> Option<Element> {
        self.node_at(tile).map(|n| self.node(n).element)
    }

    /// The children of the node on `tile`, or an empty slice if `tile` is empty.
    pub fn children(&self, tile: Tile) -> &[Tile] {
        self.node_at(tile)
            .map(|n| self.node(n).children())
            .unwrap_or(&[])
    }

    /// Returns `true` if no node occupies `tile`.
    #[inline]
    pub fn is_empty_tile(&self, tile: Tile) -> bool {
        !self.tiles.contains_key(&tile)
    }

    /// Returns `true` if a primary input occupies `tile`.
    pub fn is_pi_tile(&self, tile: Tile) -> bool {
        self.element_at(tile) == Some(Element::Pi)
    }

    /// Returns `true` if a primary output occupies `tile`.
    pub fn is_po_tile(&self, tile: Tile) -> bool {
        self.element_at(tile) == Some(Element::Po)
    }

    /// Returns `true` if a wire segment occupies `tile`.
    pub fn is_wire_tile(&self, tile: Tile) -> bool {
        self.element_at(tile).is_some_and(|e| e.is_wire())
    }

    /// The occupied tiles with their nodes, in placement order.
    pub fn occupied(&self) -> impl Iterator<Item = (Tile, LayoutNodeId)> + '_ {
        self.tiles.iter().map(|(t, n)| (*t, *n))
    }

    /// The primary inputs, in creation order.
    #[inline]
    pub fn pis(&self) -> &[LayoutNodeId] {
        &self.pis
    }

    /// The primary outputs, in creation order.
    #[inline]
    pub fn pos(&self) -> &[LayoutNodeId] {
        &self.pos
    }

    /// All nodes with their IDs, including nodes that are not placed.
    pub fn nodes(&self) -> impl Iterator<Item = (LayoutNodeId, &LayoutNode)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (LayoutNodeId(i as u32), n))
    }

    /// The tiles holding logic gates.
    pub fn gates(&self) -> impl Iterator<Item = Tile> + '_ {
        self.occupied()
            .filter(|(_, n)| self.node(*n).element.is_gate())
            .map(|(t, _)| t)
    }

    /// The tiles holding wire segments.
    pub fn wires(&self) -> impl Iterator<Item = Tile> + '_ {
        self.occupied()
            .filter(|(_, n)| self.node(*n).element.is_wire())
            .map(|(t, _)| t)
    }

    /// The number of logic gates, including inverters.
    pub fn num_gates(&self) -> usize {
        self.gates().count()
    }

    /// The number of wire segments, excluding primary input and output pins.
    pub fn num_wires(&self) -> usize {
        self.wires().count()
    }

    /// The number of occupied tiles on the crossing layer.
    pub fn num_crossings(&self) -> usize {
        self.tiles.keys().filter(|t| t.is_crossing()).count()
    }

    /// The number of primary inputs.
    #[inline]
    pub fn num_pis(&self) -> usize {
        self.pis.len()
    }

    /// The number of primary outputs.
    #[inline]
    pub fn num_pos(&self) -> usize {
        self.pos.len()
    }

    /// The name of the `index`-th primary output.
    pub fn output_name(&self, index: usize) -> Option<&ArcStr> {
        self.pos.get(index).and_then(|n| self.node(*n).name())
    }

    /// The names of all primary outputs, in creation order.
    pub fn output_names(&self) -> Vec<Option<ArcStr>> {
        self.pos
            .iter()
            .map(|n| self.node(*n).name().cloned())
            .collect()
    }

    /// The tiles that pass their signal into `tile`.
    ///
    /// These are the children of `tile` that lie in an incoming clock zone,
    /// on either layer.
    pub fn incoming_data_flow(&self, tile: Tile) -> Vec<Tile> {
        let children = self.children(tile);
        self.incoming_clocked_zones(tile.ground())
            .into_iter()
            .flat_map(|zone| [zone, zone.above()])
            .filter(|t| !self.is_empty_tile(*t) && children.contains(t))
            .collect()
    }

    /// The tiles that receive the signal of `tile`.
    ///
    /// These are the occupied tiles in an outgoing clock zone, on either layer,
    /// that list `tile` as a child.
    pub fn outgoing_data_flow(&self, tile: Tile) -> Vec<Tile> {
        if self.is_empty_tile(tile) {
            return Vec::new();
        }
        self.outgoing_clocked_zones(tile.ground())
            .into_iter()
            .flat_map(|zone| [zone, zone.above()])
            .filter(|t| self.children(*t).contains(&tile))
            .collect()
    }

    /// The number of tiles passing their signal into `tile`.
    pub fn fanin_size(&self, tile: Tile) -> usize {
        self.incoming_data_flow(tile).len()
    }

    /// The number of tiles receiving the signal of `tile`.
    pub fn fanout_size(&self, tile: Tile) -> usize {
        self.outgoing_data_flow(tile).len()
    }

    /// Returns `true` if `tile` holds a wire segment that drives more than one tile.
    pub fn is_fanout(&self, tile: Tile) -> bool {
        self.is_wire_tile(tile) && self.fanout_size(tile) > 1
    }

    /// The smallest extent containing every occupied tile.
    pub fn bounding_box(&self) -> Option<AspectRatio> {
        self.tiles.keys().copied().collect::<Vec<_>>().bounding_box()
    }

    /// Simulates the layout for every input assignment.
    ///
    /// Returns one truth table per primary output. Primary inputs with the same
    /// name share a variable; variables are ordered by first occurrence.
    pub fn simulate(&self) -> Result<Vec<TruthTable>> {
        let mut vars: IndexMap<ArcStr, usize> = IndexMap::new();
        for pi in self.pis.iter() {
            if let Some(name) = self.node(*pi).name() {
                let next = vars.len();
                vars.entry(name.clone()).or_insert(next);
            }
        }
        if vars.len() > MAX_SIMULATION_VARS {
            return Err(lnir::Error::TooManyInputs(vars.len()).into());
        }
        let num_vars = vars.len();

        let mut values: IndexMap<Tile, TruthTable> = IndexMap::new();
        let mut outputs = Vec::with_capacity(self.pos.len());
        for tile in self.pos.iter().filter_map(|po| self.node(*po).tile) {
            self.evaluate(tile, num_vars, &vars, &mut values)?;
            outputs.push(values[&tile].clone());
        }
        Ok(outputs)
    }

    fn evaluate(
        &self,
        root: Tile,
        num_vars: usize,
        vars: &IndexMap<ArcStr, usize>,
        values: &mut IndexMap<Tile, TruthTable>,
    ) -> Result<()> {
        let mut stack = vec![(root, false)];
        let mut on_path: IndexMap<Tile, ()> = IndexMap::new();
        while let Some((tile, expanded)) = stack.pop() {
            if values.contains_key(&tile) {
                continue;
            }
            let node = self
                .node_at(tile)
                .map(|n| self.node(n))
                .ok_or(Error::UnknownTile { tile })?;
            if expanded {
                on_path.shift_remove(&tile);
                let value = match node.element {
                    Element::Pi => {
                        let var = node.name().and_then(|n| vars.get(n)).copied().unwrap_or(0);
                        TruthTable::nth_var(num_vars, var)
                    }
                    Element::Po => values[&node.children[0]].clone(),
                    Element::Function(kind) => {
                        let operands: Vec<&TruthTable> =
                            node.children.iter().map(|c| &values[c]).collect();
                        TruthTable::combine(num_vars, &operands, |words| kind.eval(words))
                    }
                };
                values.insert(tile, value);
            } else {
                if on_path.insert(tile, ()).is_some() {
                    return Err(Error::CombinationalCycle { tile });
                }
                if node.children.len() < node.element.arity() {
                    return Err(lnir::Error::ArityMismatch {
                        kind: match node.element {
                            Element::Function(kind) => kind,
                            _ => NodeKind::Buf,
                        },
                        expected: node.element.arity(),
                        actual: node.children.len(),
                    }
                    .into());
                }
                stack.push((tile, true));
                for child in node.children.iter() {
                    if !values.contains_key(child) {
                        stack.push((*child, false));
                    }
                }
            }
        }
        Ok(())
    }
}

impl Deref for GateLevelLayout {
    type Target = ClockedLayout;

    fn deref(&self) -> &Self::Target {
        &self.clocked
    }
}

impl DerefMut for GateLevelLayout {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.clocked
    }
}
