//! Clocked and gate-level layouts.

pub mod clocked;
pub mod gate_level;


pub use clocked::ClockedLayout;
pub use gate_level::{Element, GateLevelLayout, LayoutNode, LayoutNodeId};
