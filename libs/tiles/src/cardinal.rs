//! The four cardinal directions of a Cartesian tile grid.

use std::fmt::Display;

use array_map::{ArrayMap, Indexable};
use serde::{Deserialize, Serialize};

/// An enumeration of cardinal directions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Hash, PartialEq, Eq)]
#[repr(u8)]
#[derive(Indexable)]
pub enum Cardinal {
    /// Towards decreasing `y`.
    North,
    /// Towards increasing `x`.
    East,
    /// Towards increasing `y`.
    South,
    /// Towards decreasing `x`.
    West,
}

impl Cardinal {
    /// All cardinal directions, clockwise starting from [`Cardinal::North`].
    pub const ALL: [Cardinal; 4] = [Self::North, Self::East, Self::South, Self::West];

    /// Returns the opposite direction.
    ///
    /// # Example
    ///
    /// ```
    /// # use tiles::prelude::*;
    /// assert_eq!(Cardinal::North.opposite(), Cardinal::South);
    /// assert_eq!(Cardinal::West.opposite(), Cardinal::East);
    /// ```
    pub const fn opposite(&self) -> Self {
        match *self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
        }
    }
}

impl Display for Cardinal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::North => write!(f, "north"),
            Self::East => write!(f, "east"),
            Self::South => write!(f, "south"),
            Self::West => write!(f, "west"),
        }
    }
}

/// An association of a value with type `T` to each of the four [`Cardinal`]s.
#[derive(Default, Debug, Clone, Copy, Eq, PartialEq)]
pub struct Cardinals<T> {
    inner: ArrayMap<Cardinal, T, 4>,
}

impl<T> Cardinals<T>
where
    T: Copy,
{
    /// Creates a new [`Cardinals`] with `value` associated with all directions.
    pub const fn uniform(value: T) -> Self {
        Self {
            inner: ArrayMap::new([value; 4]),
        }
    }
}

impl<T> Cardinals<T> {
    /// Creates a new [`Cardinals`] with the provided values for each direction.
    pub const fn new(north: T, east: T, south: T, west: T) -> Self {
        // The ordering of array elements must match the ordering of variants in [`Cardinal`].
        Self {
            inner: ArrayMap::new([north, east, south, west]),
        }
    }
}

impl<T> std::ops::Index<Cardinal> for Cardinals<T> {
    type Output = T;
    fn index(&self, index: Cardinal) -> &Self::Output {
        &self.inner[index]
    }
}

impl<T> std::ops::IndexMut<Cardinal> for Cardinals<T> {
    fn index_mut(&mut self, index: Cardinal) -> &mut Self::Output {
        &mut self.inner[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cardinals_index_by_direction() {
        let mut c = Cardinals::new(1, 2, 3, 4);
        assert_eq!(c[Cardinal::North], 1);
        assert_eq!(c[Cardinal::West], 4);
        c[Cardinal::South] = 9;
        assert_eq!(c[Cardinal::South], 9);
        assert_eq!(Cardinals::uniform(0)[Cardinal::East], 0);
    }

    #[test]
    fn opposite_is_an_involution() {
        for dir in Cardinal::ALL {
            assert_ne!(dir.opposite(), dir);
            assert_eq!(dir.opposite().opposite(), dir);
        }
    }
}
