//! Layout extents.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::Tile;

/// The extent of a layout, given by its largest valid coordinate in each dimension.
///
/// Bounds are inclusive: an aspect ratio of `{x: 2, y: 1, z: 0}` describes
/// a grid of 3 columns and 2 rows with no crossing layer.
#[derive(Debug, Copy, Clone, Default, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct AspectRatio {
    /// The largest valid column.
    pub x: u64,
    /// The largest valid row.
    pub y: u64,
    /// The largest valid layer.
    pub z: u8,
}

impl AspectRatio {
    /// Creates a new ground-only aspect ratio.
    #[inline]
    pub const fn new(x: u64, y: u64) -> Self {
        Self { x, y, z: 0 }
    }

    /// Creates a new aspect ratio with the given number of layers above ground.
    #[inline]
    pub const fn with_layers(x: u64, y: u64, z: u8) -> Self {
        Self { x, y, z }
    }

    /// The number of columns.
    #[inline]
    pub const fn width(&self) -> u64 {
        self.x + 1
    }

    /// The number of rows.
    #[inline]
    pub const fn height(&self) -> u64 {
        self.y + 1
    }

    /// The number of ground tiles.
    ///
    /// # Example
    ///
    /// ```
    /// # use tiles::prelude::*;
    /// assert_eq!(AspectRatio::new(2, 1).area(), 6);
    /// ```
    #[inline]
    pub const fn area(&self) -> u64 {
        self.width() * self.height()
    }

    /// Returns `true` if `tile` lies within these bounds.
    ///
    /// # Example
    ///
    /// ```
    /// # use tiles::prelude::*;
    /// let ar = AspectRatio::with_layers(2, 2, 1);
    /// assert!(ar.contains(&Tile::new(2, 2)));
    /// assert!(ar.contains(&Tile::with_layer(0, 1, 1)));
    /// assert!(!ar.contains(&Tile::new(3, 0)));
    /// ```
    #[inline]
    pub const fn contains(&self, tile: &Tile) -> bool {
        tile.x <= self.x && tile.y <= self.y && tile.z <= self.z
    }

    /// The smallest aspect ratio containing both `self` and `tile`.
    pub fn expand_to(&self, tile: &Tile) -> Self {
        Self::with_layers(self.x.max(tile.x), self.y.max(tile.y), self.z.max(tile.z))
    }
}

impl Display for AspectRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} × {}", self.width(), self.height())
    }
}
