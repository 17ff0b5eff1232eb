//! Tile coordinates for clocked field-coupled nanocomputing layouts.
//!
//! A layout is a grid of square tiles addressed by `(x, y)` with an additional
//! layer index `z`. Layer 0 is the ground layer; layer 1 holds wire crossings.
//! Signals flow towards increasing coordinates in most clocking schemes, so `x`
//! grows eastwards and `y` grows southwards.
//!
//! # Examples
//!
//! ```
//! # use tiles::prelude::*;
//! let t = Tile::new(2, 3);
//! assert_eq!(t.east(), Tile::new(3, 3));
//! assert_eq!(t.above(), Tile::with_layer(2, 3, 1));
//! ```
#![warn(missing_docs)]

pub mod bbox;
pub mod cardinal;
pub mod prelude;
pub mod ratio;

pub use bbox::BoundingBox;
pub use ratio::AspectRatio;

use std::cmp::Ordering;
use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::cardinal::Cardinal;

/// The layer index of the ground layer.
pub const GROUND: u8 = 0;
/// The layer index of the crossing layer.
pub const CROSSING: u8 = 1;

/// A tile in a layout grid.
///
/// Tiles are ordered by layer first, then by row, then by column.
/// Of two tiles on the same layer, the northern one compares smaller;
/// of two tiles in the same row, the western one compares smaller.
#[derive(Debug, Copy, Clone, Default, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    /// The column.
    pub x: u64,
    /// The row.
    pub y: u64,
    /// The layer.
    pub z: u8,
}

impl Tile {
    /// Creates a new ground-layer tile.
    #[inline]
    pub const fn new(x: u64, y: u64) -> Self {
        Self { x, y, z: GROUND }
    }

    /// Creates a new tile on the given layer.
    #[inline]
    pub const fn with_layer(x: u64, y: u64, z: u8) -> Self {
        Self { x, y, z }
    }

    /// Returns the tile at the same position on the ground layer.
    #[inline]
    pub const fn ground(&self) -> Self {
        Self::new(self.x, self.y)
    }

    /// Returns `true` if this tile lies on the ground layer.
    #[inline]
    pub const fn is_ground(&self) -> bool {
        self.z == GROUND
    }

    /// Returns `true` if this tile lies on the crossing layer.
    #[inline]
    pub const fn is_crossing(&self) -> bool {
        self.z != GROUND
    }

    /// Returns the tile directly above this one.
    ///
    /// The crossing layer is the top layer; the tile above a crossing tile
    /// is the tile itself.
    ///
    /// # Example
    ///
    /// ```
    /// # use tiles::prelude::*;
    /// let t = Tile::new(1, 1);
    /// assert_eq!(t.above().z, 1);
    /// assert_eq!(t.above().above(), t.above());
    /// ```
    #[inline]
    pub const fn above(&self) -> Self {
        Self::with_layer(self.x, self.y, CROSSING)
    }

    /// Returns the tile directly below this one.
    ///
    /// The tile below a ground tile is the tile itself.
    #[inline]
    pub const fn below(&self) -> Self {
        Self::with_layer(self.x, self.y, self.z.saturating_sub(1))
    }

    /// Returns the northern neighbor, saturating at row 0.
    #[inline]
    pub const fn north(&self) -> Self {
        Self::with_layer(self.x, self.y.saturating_sub(1), self.z)
    }

    /// Returns the eastern neighbor.
    #[inline]
    pub const fn east(&self) -> Self {
        Self::with_layer(self.x + 1, self.y, self.z)
    }

    /// Returns the southern neighbor.
    #[inline]
    pub const fn south(&self) -> Self {
        Self::with_layer(self.x, self.y + 1, self.z)
    }

    /// Returns the western neighbor, saturating at column 0.
    #[inline]
    pub const fn west(&self) -> Self {
        Self::with_layer(self.x.saturating_sub(1), self.y, self.z)
    }

    /// Returns the neighbor in direction `dir`.
    ///
    /// At the northern and western borders, the result may be
    /// the tile itself.
    pub const fn neighbor(&self, dir: Cardinal) -> Self {
        match dir {
            Cardinal::North => self.north(),
            Cardinal::East => self.east(),
            Cardinal::South => self.south(),
            Cardinal::West => self.west(),
        }
    }

    /// Returns the distinct cardinal neighbors of this tile on its own layer.
    ///
    /// # Example
    ///
    /// ```
    /// # use tiles::prelude::*;
    /// assert_eq!(Tile::new(0, 0).neighbors().len(), 2);
    /// assert_eq!(Tile::new(1, 1).neighbors().len(), 4);
    /// ```
    pub fn neighbors(&self) -> Vec<Self> {
        Cardinal::ALL
            .iter()
            .map(|dir| self.neighbor(*dir))
            .filter(|t| t != self)
            .collect()
    }

    /// Returns `true` if `other` shares a ground position with one of this tile's
    /// cardinal neighbors, regardless of layer.
    pub fn is_adjacent(&self, other: &Tile) -> bool {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y) == 1
    }

    /// Returns `true` if `other` lies in the same row, east of this tile,
    /// on the same layer.
    #[inline]
    pub const fn is_eastwards_of(&self, other: &Tile) -> bool {
        self.z == other.z && self.y == other.y && self.x > other.x
    }

    /// Returns `true` if `other` lies in the same column, south of this tile,
    /// on the same layer.
    #[inline]
    pub const fn is_southwards_of(&self, other: &Tile) -> bool {
        self.z == other.z && self.x == other.x && self.y > other.y
    }
}

impl Ord for Tile {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.z, self.y, self.x).cmp(&(other.z, other.y, other.x))
    }
}

impl PartialOrd for Tile {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<(u64, u64)> for Tile {
    #[inline]
    fn from(value: (u64, u64)) -> Self {
        Self::new(value.0, value.1)
    }
}

impl From<(u64, u64, u8)> for Tile {
    #[inline]
    fn from(value: (u64, u64, u8)) -> Self {
        Self::with_layer(value.0, value.1, value.2)
    }
}

impl Display for Tile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{},{})", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_layer_row_column() {
        let mut tiles = vec![
            Tile::with_layer(0, 0, 1),
            Tile::new(5, 1),
            Tile::new(0, 2),
            Tile::new(3, 1),
            Tile::new(9, 0),
        ];
        tiles.sort();
        assert_eq!(
            tiles,
            vec![
                Tile::new(9, 0),
                Tile::new(3, 1),
                Tile::new(5, 1),
                Tile::new(0, 2),
                Tile::with_layer(0, 0, 1),
            ]
        );
    }

    #[test]
    fn neighbors_saturate_at_borders() {
        let origin = Tile::new(0, 0);
        assert_eq!(origin.north(), origin);
        assert_eq!(origin.west(), origin);
        assert_eq!(origin.neighbors(), vec![Tile::new(1, 0), Tile::new(0, 1)]);
    }

    #[test]
    fn layers() {
        let t = Tile::new(4, 2);
        assert!(t.is_ground());
        assert!(t.above().is_crossing());
        assert_eq!(t.above().below(), t);
        assert_eq!(t.below(), t);
        assert_eq!(t.above().ground(), t);
    }

    #[test]
    fn root_exports_extent_types() {
        let tiles = vec![Tile::new(3, 1), Tile::with_layer(0, 4, 1)];
        let bbox: Option<crate::AspectRatio> = crate::BoundingBox::bounding_box(&tiles);
        assert_eq!(bbox, Some(crate::AspectRatio::with_layers(3, 4, 1)));
    }

    #[test]
    fn directional_relations() {
        let t = Tile::new(2, 2);
        assert!(Tile::new(4, 2).is_eastwards_of(&t));
        assert!(!Tile::new(1, 2).is_eastwards_of(&t));
        assert!(Tile::new(2, 3).is_southwards_of(&t));
        assert!(!Tile::with_layer(2, 3, 1).is_southwards_of(&t));
        assert!(t.is_adjacent(&Tile::with_layer(2, 1, 1)));
        assert!(!t.is_adjacent(&Tile::new(3, 3)));
        assert!(!t.is_adjacent(&t.above()));
    }
}
