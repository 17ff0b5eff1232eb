//! An import prelude that re-exports commonly used items.

pub use crate::bbox::BoundingBox;
pub use crate::cardinal::{Cardinal, Cardinals};
pub use crate::ratio::AspectRatio;
pub use crate::Tile;
