//! Bounding extents of tile collections.

use crate::ratio::AspectRatio;
use crate::Tile;

/// A collection of tiles that has a bounding extent.
///
/// # Examples
///
/// ```
/// # use tiles::prelude::*;
/// let tiles = vec![Tile::new(1, 4), Tile::with_layer(3, 0, 1)];
/// assert_eq!(tiles.bounding_box(), Some(AspectRatio::with_layers(3, 4, 1)));
/// assert_eq!(Vec::<Tile>::new().bounding_box(), None);
/// ```
pub trait BoundingBox {
    /// Computes the smallest aspect ratio that contains every tile.
    ///
    /// If there are no tiles, this method returns `None`.
    fn bounding_box(&self) -> Option<AspectRatio>;
}

impl BoundingBox for Tile {
    fn bounding_box(&self) -> Option<AspectRatio> {
        Some(AspectRatio::with_layers(self.x, self.y, self.z))
    }
}

impl<T: BoundingBox> BoundingBox for [T] {
    fn bounding_box(&self) -> Option<AspectRatio> {
        let mut bbox: Option<AspectRatio> = None;
        for item in self {
            bbox = match (bbox, item.bounding_box()) {
                (Some(a), Some(b)) => Some(AspectRatio::with_layers(
                    a.x.max(b.x),
                    a.y.max(b.y),
                    a.z.max(b.z),
                )),
                (a, b) => a.or(b),
            };
        }
        bbox
    }
}

impl<T: BoundingBox> BoundingBox for Vec<T> {
    fn bounding_box(&self) -> Option<AspectRatio> {
        self.as_slice().bounding_box()
    }
}

impl<T> BoundingBox for &T
where
    T: BoundingBox + ?Sized,
{
    fn bounding_box(&self) -> Option<AspectRatio> {
        T::bounding_box(*self)
    }
}
