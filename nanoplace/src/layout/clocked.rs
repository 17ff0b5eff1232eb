//! Layouts whose tiles are assigned clock numbers.

use std::sync::Arc;

use tiles::{AspectRatio, Tile};

use crate::clocking::{ClockNumber, ClockingScheme, Degree};

/// A bounded grid of tiles together with a clocking scheme.
///
/// The scheme is shared by reference. Overriding a clock number through
/// [`ClockedLayout::assign_clock_number`] copies the scheme first if it is shared,
/// so other layouts using the same scheme are unaffected.
#[derive(Debug, Clone)]
pub struct ClockedLayout {
    ratio: AspectRatio,
    scheme: Arc<ClockingScheme>,
}

impl ClockedLayout {
    /// Creates a clocked layout with the given extent and clocking scheme.
    pub fn new(ratio: AspectRatio, scheme: ClockingScheme) -> Self {
        Self::with_shared_scheme(ratio, Arc::new(scheme))
    }

    /// Creates a clocked layout that shares an existing clocking scheme.
    pub fn with_shared_scheme(ratio: AspectRatio, scheme: Arc<ClockingScheme>) -> Self {
        Self { ratio, scheme }
    }

    /// The extent of the layout.
    #[inline]
    pub fn aspect_ratio(&self) -> AspectRatio {
        self.ratio
    }

    /// The number of ground tiles.
    #[inline]
    pub fn area(&self) -> u64 {
        self.ratio.area()
    }

    /// Changes the extent of the layout.
    pub fn resize(&mut self, ratio: AspectRatio) {
        self.ratio = ratio;
    }

    /// Returns `true` if `tile` lies within the extent of the layout.
    #[inline]
    pub fn is_within_bounds(&self, tile: Tile) -> bool {
        self.ratio.contains(&tile)
    }

    /// The clocking scheme of the layout.
    #[inline]
    pub fn clocking_scheme(&self) -> &ClockingScheme {
        &self.scheme
    }

    /// A shared handle to the clocking scheme of the layout.
    pub fn shared_clocking_scheme(&self) -> Arc<ClockingScheme> {
        Arc::clone(&self.scheme)
    }

    /// Replaces the clocking scheme of the layout.
    pub fn replace_clocking_scheme(&mut self, scheme: ClockingScheme) {
        self.scheme = Arc::new(scheme);
    }

    /// Returns `true` if the layout is clocked by the scheme named `name`, ignoring case.
    pub fn is_clocking_scheme(&self, name: &str) -> bool {
        self.scheme.is_scheme(name)
    }

    /// The clock number of a tile.
    #[inline]
    pub fn clock_number(&self, tile: Tile) -> ClockNumber {
        self.scheme.clock_number(tile)
    }

    /// Overrides the clock number of a tile.
    pub fn assign_clock_number(&mut self, tile: Tile, clock: ClockNumber) {
        Arc::make_mut(&mut self.scheme).override_clock_number(tile, clock);
    }

    /// The number of clock phases.
    #[inline]
    pub fn num_clocks(&self) -> ClockNumber {
        self.scheme.num_clocks()
    }

    /// Returns `true` if information can flow from `t2` into `t1`.
    #[inline]
    pub fn is_incoming_clocked(&self, t1: Tile, t2: Tile) -> bool {
        self.scheme.is_incoming_clocked(t1, t2)
    }

    /// Returns `true` if information can flow from `t1` into `t2`.
    #[inline]
    pub fn is_outgoing_clocked(&self, t1: Tile, t2: Tile) -> bool {
        self.scheme.is_outgoing_clocked(t1, t2)
    }

    /// The in-bounds neighbors of `tile` that can pass information into it.
    pub fn incoming_clocked_zones(&self, tile: Tile) -> Vec<Tile> {
        tile.neighbors()
            .into_iter()
            .filter(|t| self.is_within_bounds(*t) && self.is_incoming_clocked(tile, *t))
            .collect()
    }

    /// The in-bounds neighbors of `tile` that it can pass information to.
    pub fn outgoing_clocked_zones(&self, tile: Tile) -> Vec<Tile> {
        tile.neighbors()
            .into_iter()
            .filter(|t| self.is_within_bounds(*t) && self.is_outgoing_clocked(tile, *t))
            .collect()
    }

    /// The number of incoming clocked zones of `tile`.
    pub fn in_degree(&self, tile: Tile) -> Degree {
        self.incoming_clocked_zones(tile).len() as Degree
    }

    /// The number of outgoing clocked zones of `tile`.
    pub fn out_degree(&self, tile: Tile) -> Degree {
        self.outgoing_clocked_zones(tile).len() as Degree
    }

    /// The total number of clocked zones adjacent to `tile`.
    pub fn degree(&self, tile: Tile) -> Degree {
        self.in_degree(tile) + self.out_degree(tile)
    }
}
