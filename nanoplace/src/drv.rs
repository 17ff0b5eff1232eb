//! Design rule checks for gate-level layouts.
//!
//! [`validate`] inspects the structure of a [`GateLevelLayout`] and collects every
//! violation into an [`IssueSet`]. Issues are logged as they are found, at the
//! tracing level matching their [`Severity`].

use std::fmt::Display;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tiles::Tile;
use tracing::{span, Level};

use crate::layout::{GateLevelLayout, LayoutNodeId};

/// An enumeration of issue severities.
#[derive(Copy, Clone, Debug, Default, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Severity {
    /// An informational message.
    Info,
    /// A warning.
    #[default]
    Warning,
    /// A design rule violation.
    Error,
}

impl Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A collection of design rule issues.
#[derive(Debug, Clone)]
pub struct IssueSet<T> {
    issues: Vec<T>,
    num_errors: usize,
    num_warnings: usize,
}

impl<T> IssueSet<T> {
    /// Creates a new, empty issue set.
    #[inline]
    pub fn new() -> Self {
        Self {
            issues: Vec::new(),
            num_errors: 0,
            num_warnings: 0,
        }
    }

    /// Returns an iterator over all issues in the set.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.issues.iter()
    }

    /// Returns `true` if this issue set is empty, including informational issues.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Returns `true` if this issue set contains an error.
    #[inline]
    pub fn has_error(&self) -> bool {
        self.num_errors > 0
    }

    /// The number of errors in this issue set.
    #[inline]
    pub fn num_errors(&self) -> usize {
        self.num_errors
    }

    /// The number of warnings in this issue set.
    #[inline]
    pub fn num_warnings(&self) -> usize {
        self.num_warnings
    }
}

impl IssueSet<DrvIssue> {
    /// Adds the given issue to the issue set.
    pub fn add(&mut self, issue: DrvIssue) {
        match issue.severity {
            Severity::Error => self.num_errors += 1,
            Severity::Warning => self.num_warnings += 1,
            Severity::Info => (),
        }
        self.issues.push(issue);
    }
}

impl<T> Default for IssueSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Display> Display for IssueSet<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for issue in self.issues.iter() {
            writeln!(f, "{}", issue)?;
        }
        Ok(())
    }
}

/// An issue identified during validation of a gate-level layout.
#[derive(Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct DrvIssue {
    cause: Cause,
    severity: Severity,
}

/// The cause of a [`DrvIssue`].
#[derive(Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Cause {
    /// A node has no tile.
    Unplaced {
        /// The unplaced node.
        node: LayoutNodeId,
    },
    /// A node lies outside of the layout.
    OutOfBounds {
        /// The misplaced node.
        node: LayoutNodeId,
        /// The tile the node was placed on.
        tile: Tile,
    },
    /// A node's tile does not map back to the node.
    Unregistered {
        /// The node missing from the tile map.
        node: LayoutNodeId,
        /// The tile the node claims.
        tile: Tile,
    },
    /// A child of a node is not occupied.
    EmptyChild {
        /// The tile of the node.
        tile: Tile,
        /// The empty child tile.
        child: Tile,
    },
    /// A node's children differ from the tiles that can pass signals into it.
    DataFlowMismatch {
        /// The tile of the node.
        tile: Tile,
        /// The node's recorded children.
        children: Vec<Tile>,
        /// The occupied tiles whose clock zone feeds the node.
        incoming: Vec<Tile>,
    },
    /// A crossing tile holds something other than a wire.
    CrossingNotWire {
        /// The crossing-layer tile.
        tile: Tile,
    },
    /// A crossing tile has nothing to cross below it.
    CrossingWithoutGround {
        /// The crossing-layer tile.
        tile: Tile,
    },
    /// A node has the wrong number of children for its element.
    ArityMismatch {
        /// The tile of the node.
        tile: Tile,
        /// The arity of the node's element.
        expected: usize,
        /// The number of recorded children.
        actual: usize,
    },
    /// A tile has more incoming or outgoing signals than the clocking scheme allows.
    DegreeExceeded {
        /// The offending tile.
        tile: Tile,
        /// The number of incoming signals.
        fanin_size: usize,
        /// The number of outgoing signals.
        fanout_size: usize,
    },
}

impl DrvIssue {
    /// Creates a new issue from the given cause and severity.
    pub(crate) fn new(cause: Cause, severity: Severity) -> Self {
        Self { cause, severity }
    }

    /// Creates a new issue and logs it immediately.
    ///
    /// The log level is selected according to the given severity.
    pub(crate) fn new_and_log(cause: Cause, severity: Severity) -> Self {
        let result = Self::new(cause, severity);
        match severity {
            Severity::Info => tracing::event!(Level::INFO, issue = ?result.cause, "{}", result),
            Severity::Warning => tracing::event!(Level::WARN, issue = ?result.cause, "{}", result),
            Severity::Error => tracing::event!(Level::ERROR, issue = ?result.cause, "{}", result),
        }
        result
    }

    /// The underlying cause of this issue.
    #[inline]
    pub fn cause(&self) -> &Cause {
        &self.cause
    }

    /// The severity of this issue.
    #[inline]
    pub fn severity(&self) -> Severity {
        self.severity
    }
}

impl Display for DrvIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.severity, self.cause)
    }
}

impl Display for Cause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unplaced { node } => write!(f, "node {node} has not been placed"),
            Self::OutOfBounds { node, tile } => {
                write!(f, "node {node} on tile {tile} lies outside of the layout")
            }
            Self::Unregistered { node, tile } => {
                write!(f, "tile {tile} of node {node} is not registered")
            }
            Self::EmptyChild { tile, child } => {
                write!(f, "tile {tile} reads from empty tile {child}")
            }
            Self::DataFlowMismatch {
                tile,
                children,
                incoming,
            } => write!(
                f,
                "tile {tile} reads from [{}], but only [{}] can pass signals into it",
                children.iter().join(", "),
                incoming.iter().join(", ")
            ),
            Self::CrossingNotWire { tile } => {
                write!(f, "crossing tile {tile} does not hold a wire")
            }
            Self::CrossingWithoutGround { tile } => {
                write!(f, "crossing tile {tile} lies above an empty tile")
            }
            Self::ArityMismatch {
                tile,
                expected,
                actual,
            } => write!(
                f,
                "tile {tile} has {actual} children, but its element takes {expected}"
            ),
            Self::DegreeExceeded {
                tile,
                fanin_size,
                fanout_size,
            } => write!(
                f,
                "tile {tile} has {fanin_size} incoming and {fanout_size} outgoing signals, exceeding the clocking scheme"
            ),
        }
    }
}

/// Validates the structure of a gate-level layout.
pub fn validate(layout: &GateLevelLayout) -> IssueSet<DrvIssue> {
    let _guard = span!(
        Level::INFO,
        "validating layout",
        name = layout.name().map(|n| n.as_str())
    )
    .entered();
    let mut issues = IssueSet::new();
    let scheme = layout.clocking_scheme();

    for (id, node) in layout.nodes() {
        let Some(tile) = node.tile() else {
            // Removed nodes stay in the arena but are no longer inputs or outputs.
            if layout.pis().contains(&id) || layout.pos().contains(&id) {
                issues.add(DrvIssue::new_and_log(
                    Cause::Unplaced { node: id },
                    Severity::Error,
                ));
            }
            continue;
        };
        if !layout.is_within_bounds(tile) {
            issues.add(DrvIssue::new_and_log(
                Cause::OutOfBounds { node: id, tile },
                Severity::Error,
            ));
        }
        if layout.node_at(tile) != Some(id) {
            issues.add(DrvIssue::new_and_log(
                Cause::Unregistered { node: id, tile },
                Severity::Error,
            ));
            continue;
        }

        let children = node.children();
        let expected = node.element().arity();
        if children.len() != expected {
            issues.add(DrvIssue::new_and_log(
                Cause::ArityMismatch {
                    tile,
                    expected,
                    actual: children.len(),
                },
                Severity::Error,
            ));
        }

        for child in children.iter().filter(|c| layout.is_empty_tile(**c)) {
            issues.add(DrvIssue::new_and_log(
                Cause::EmptyChild {
                    tile,
                    child: *child,
                },
                Severity::Error,
            ));
        }

        let incoming = layout.incoming_data_flow(tile);
        if incoming.iter().sorted().ne(children.iter().sorted()) {
            issues.add(DrvIssue::new_and_log(
                Cause::DataFlowMismatch {
                    tile,
                    children: children.to_vec(),
                    incoming,
                },
                Severity::Error,
            ));
        }

        if tile.is_crossing() {
            if !node.element().is_wire() {
                issues.add(DrvIssue::new_and_log(
                    Cause::CrossingNotWire { tile },
                    Severity::Error,
                ));
            }
            if layout.is_empty_tile(tile.ground()) {
                issues.add(DrvIssue::new_and_log(
                    Cause::CrossingWithoutGround { tile },
                    Severity::Error,
                ));
            }
        }

        let fanin_size = layout.fanin_size(tile);
        let fanout_size = layout.fanout_size(tile);
        if fanin_size > scheme.max_in_degree() as usize
            || fanout_size > scheme.max_out_degree() as usize
        {
            issues.add(DrvIssue::new_and_log(
                Cause::DegreeExceeded {
                    tile,
                    fanin_size,
                    fanout_size,
                },
                Severity::Warning,
            ));
        }
    }

    tracing::event!(
        Level::DEBUG,
        num_errors = issues.num_errors(),
        num_warnings = issues.num_warnings(),
        "validated layout"
    );
    issues
}

#[cfg(test)]
mod tests {
    use lnir::NodeKind;
    use test_log::test;
    use tiles::AspectRatio;

    use super::*;
    use crate::clocking::{ClockingScheme, NumClocks};

    fn layout() -> GateLevelLayout {
        GateLevelLayout::new(
            AspectRatio::with_layers(3, 3, 1),
            ClockingScheme::twoddwave(NumClocks::Four),
        )
    }

    fn causes(issues: &IssueSet<DrvIssue>) -> Vec<Cause> {
        issues.iter().map(|i| i.cause().clone()).collect()
    }

    #[test]
    fn valid_layouts_have_no_issues() {
        let mut layout = layout();
        layout.create_pi("a", Tile::new(0, 0)).unwrap();
        layout.create_pi("b", Tile::new(1, 0)).unwrap();
        layout.create_buf(Tile::new(0, 0), Tile::new(0, 1)).unwrap();
        layout
            .create_gate(
                NodeKind::Or,
                vec![Tile::new(1, 0), Tile::new(0, 1)],
                Tile::new(1, 1),
            )
            .unwrap();
        layout.create_po(Tile::new(1, 1), "f", Tile::new(2, 1)).unwrap();

        let issues = validate(&layout);
        assert!(issues.is_empty(), "{issues}");
    }

    #[test]
    fn children_must_follow_the_clocking() {
        let mut layout = layout();
        layout.create_pi("a", Tile::new(1, 1)).unwrap();
        layout.create_buf(Tile::new(1, 1), Tile::new(1, 0)).unwrap();
        layout.create_po(Tile::new(1, 1), "f", Tile::new(3, 1)).unwrap();

        let issues = validate(&layout);
        assert_eq!(issues.num_errors(), 2);
        assert!(causes(&issues).contains(&Cause::DataFlowMismatch {
            tile: Tile::new(1, 0),
            children: vec![Tile::new(1, 1)],
            incoming: Vec::new(),
        }));
    }

    #[test]
    fn children_must_exist() {
        let mut layout = layout();
        layout.create_buf(Tile::new(0, 1), Tile::new(1, 1)).unwrap();
        layout
            .create_gate(NodeKind::Inv, vec![Tile::new(1, 1)], Tile::new(1, 2))
            .unwrap();

        let issues = validate(&layout);
        assert!(causes(&issues).contains(&Cause::EmptyChild {
            tile: Tile::new(1, 1),
            child: Tile::new(0, 1),
        }));
        assert!(issues.has_error());
    }

    #[test]
    fn crossings_need_a_wire_below() {
        let mut layout = layout();
        layout.create_pi("a", Tile::new(1, 0)).unwrap();
        layout
            .create_gate(NodeKind::Inv, vec![Tile::new(1, 0)], Tile::with_layer(1, 1, 1))
            .unwrap();

        let issues = validate(&layout);
        assert_eq!(
            causes(&issues),
            vec![
                Cause::CrossingNotWire {
                    tile: Tile::with_layer(1, 1, 1)
                },
                Cause::CrossingWithoutGround {
                    tile: Tile::with_layer(1, 1, 1)
                },
            ]
        );
        assert_eq!(
            issues.iter().map(DrvIssue::severity).collect::<Vec<_>>(),
            vec![Severity::Error; 2]
        );
    }

    #[test]
    fn reserved_inputs_must_be_placed() {
        let mut layout = layout();
        let a = layout.reserve_pi("a");
        let issues = validate(&layout);
        assert_eq!(causes(&issues), vec![Cause::Unplaced { node: a }]);
        assert_eq!(
            issues.to_string(),
            format!("error: node {a} has not been placed\n")
        );
    }

    #[test]
    fn degree_bounds_are_warnings() {
        let mut layout = layout();
        layout.create_pi("a", Tile::new(1, 0)).unwrap();
        layout.create_pi("b", Tile::new(0, 1)).unwrap();
        layout.create_pi("c", Tile::new(0, 0)).unwrap();
        layout
            .create_buf(Tile::new(0, 0), Tile::with_layer(1, 0, 1))
            .unwrap();
        layout
            .create_gate(
                NodeKind::Maj,
                vec![Tile::new(1, 0), Tile::new(0, 1), Tile::with_layer(1, 0, 1)],
                Tile::new(1, 1),
            )
            .unwrap();

        let issues = validate(&layout);
        assert!(!issues.has_error(), "{issues}");
        assert_eq!(issues.num_warnings(), 1);
        assert_eq!(
            causes(&issues),
            vec![Cause::DegreeExceeded {
                tile: Tile::new(1, 1),
                fanin_size: 3,
                fanout_size: 0,
            }]
        );
        assert_eq!(issues.num_errors(), 0);
        assert_eq!(
            issues.to_string(),
            "warning: tile (1,1,0) has 3 incoming and 0 outgoing signals, exceeding the clocking scheme\n"
        );
    }
}
