//! Orientation tables for single-input nodes.
//!
//! Each table is indexed by the node class, the [`Allowed`] direction,
//! the gap above the predecessor (0, 1, or 2 and more) and the orientation
//! of the previous node in the rank.

use serde::{Deserialize, Serialize};

/// Where a node is placed relative to its (first) predecessor.
///
/// Orientations 0 and 1 place the node east of its predecessor;
/// 2 and 3 place it south.
pub type Orientation = u8;

/// The placement decision for a single node.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Case {
    /// The orientation of the node.
    pub orientation: Orientation,
    /// The number of additional routing lines opened by the node.
    pub new_lines: u64,
}

impl Case {
    const fn new(orientation: Orientation, new_lines: u64) -> Self {
        Self {
            orientation,
            new_lines,
        }
    }

    /// Returns `true` if the node is placed south of its predecessor.
    #[inline]
    pub const fn is_southwards(&self) -> bool {
        is_southwards(self.orientation)
    }
}

/// Returns `true` if `orientation` places a node south of its predecessor.
#[inline]
pub const fn is_southwards(orientation: Orientation) -> bool {
    orientation >= 2
}

/// The direction a node may leave a fan-out in.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Allowed {
    /// The node is the first branch of a fan-out.
    East,
    /// The node is the second branch of a fan-out.
    South,
    /// The predecessor is not a fan-out.
    Free,
}

impl Allowed {
    #[inline]
    pub(crate) const fn index(&self) -> usize {
        match self {
            Self::East => 0,
            Self::South => 1,
            Self::Free => 2,
        }
    }
}

type Row = [Case; 4];
type Table = [[Row; 3]; 3];

const fn row(cases: [(Orientation, u64); 4]) -> Row {
    [
        Case::new(cases[0].0, cases[0].1),
        Case::new(cases[1].0, cases[1].1),
        Case::new(cases[2].0, cases[2].1),
        Case::new(cases[3].0, cases[3].1),
    ]
}

const ZERO: Row = row([(0, 0), (0, 0), (0, 0), (0, 0)]);
const EAST: Row = row([(1, 0), (1, 0), (1, 0), (1, 0)]);

/// Cases for buffers and inverters.
///
/// The outer index is 1 if the node feeds the second input of a two-input gate.
pub static BUFFER_CASES: [Table; 2] = [
    [
        [
            row([(0, 0), (1, 0), (1, 1), (0, 1)]),
            row([(0, 0), (0, 0), (1, 0), (0, 0)]),
            ZERO,
        ],
        [row([(3, 0), (2, 0), (0, 0), (0, 0)]); 3],
        [
            row([(0, 0), (1, 0), (2, 0), (3, 0)]),
            row([(0, 0), (0, 0), (1, 0), (0, 0)]),
            ZERO,
        ],
    ],
    [
        [row([(0, 0), (0, 0), (0, 1), (0, 1)]), ZERO, ZERO],
        [row([(3, 0), (3, 0), (0, 0), (0, 0)]); 3],
        [row([(0, 0), (0, 0), (3, 0), (3, 0)]), ZERO, ZERO],
    ],
];

/// Cases for fan-outs.
///
/// The outer index is the fan-out type: 0 if both branches are single-input
/// nodes (or the fan-out drives an output), 1 if only the first is, 2 if only
/// the second is, and 3 if neither is.
pub static FANOUT_CASES: [Table; 4] = [
    [
        [
            row([(1, 0), (1, 1), (1, 2), (1, 1)]),
            row([(1, 0), (1, 0), (1, 1), (1, 0)]),
            EAST,
        ],
        [row([(2, 0), (2, 1), (0, 0), (0, 0)]); 3],
        [
            row([(1, 0), (2, 0), (2, 1), (2, 0)]),
            row([(1, 0), (1, 0), (2, 0), (1, 0)]),
            EAST,
        ],
    ],
    [
        [
            row([(0, 0), (0, 1), (0, 2), (0, 1)]),
            row([(0, 0), (0, 0), (0, 1), (0, 0)]),
            ZERO,
        ],
        [row([(3, 0), (3, 1), (0, 0), (0, 0)]); 3],
        [
            row([(0, 0), (3, 0), (3, 1), (3, 0)]),
            row([(0, 0), (0, 0), (3, 0), (0, 0)]),
            ZERO,
        ],
    ],
    [
        [row([(1, 0), (1, 0), (1, 1), (1, 1)]), EAST, EAST],
        [row([(2, 0), (2, 0), (0, 0), (0, 0)]); 3],
        [row([(1, 0), (1, 0), (2, 0), (2, 0)]), EAST, EAST],
    ],
    [
        [row([(0, 0), (0, 0), (0, 1), (0, 1)]), ZERO, ZERO],
        [row([(3, 0), (3, 0), (0, 0), (0, 0)]); 3],
        [row([(0, 0), (0, 0), (3, 0), (3, 0)]), ZERO, ZERO],
    ],
];

/// Looks up the case of a buffer or inverter.
pub fn buffer_case(second_input: bool, allowed: Allowed, gap: u64, prev: Orientation) -> Case {
    BUFFER_CASES[second_input as usize][allowed.index()][gap.min(2) as usize][prev as usize & 3]
}

/// Looks up the case of a fan-out of the given type.
pub fn fanout_case(fanout_type: usize, allowed: Allowed, gap: u64, prev: Orientation) -> Case {
    FANOUT_CASES[fanout_type & 3][allowed.index()][gap.min(2) as usize][prev as usize & 3]
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn free_buffers_follow_their_neighbor() {
        for prev in 0..4 {
            assert_eq!(buffer_case(false, Allowed::Free, 0, prev).orientation, prev);
        }
        assert_eq!(buffer_case(false, Allowed::Free, 2, 3), Case::new(0, 0));
    }

    #[test]
    fn south_branches_turn() {
        for gap in 0..3 {
            assert!(buffer_case(false, Allowed::South, gap, 0).is_southwards());
            assert!(fanout_case(0, Allowed::South, gap, 1).is_southwards());
        }
    }

    #[test]
    fn fanouts_open_lines_after_turns() {
        assert_eq!(fanout_case(0, Allowed::East, 0, 2), Case::new(1, 2));
        assert_eq!(fanout_case(1, Allowed::Free, 1, 2), Case::new(3, 0));
        assert_eq!(fanout_case(2, Allowed::Free, 5, 0), Case::new(1, 0));
    }

    #[test]
    fn east_branches_after_turns_open_a_line() {
        for fanout_type in 0..4 {
            for prev in [2, 3] {
                let case = fanout_case(fanout_type, Allowed::East, 0, prev);
                assert!(!case.is_southwards());
                assert!(case.new_lines > 0, "type {fanout_type} after {prev}");
            }
        }
        assert_eq!(buffer_case(true, Allowed::East, 0, 3), Case::new(0, 1));
    }
}
