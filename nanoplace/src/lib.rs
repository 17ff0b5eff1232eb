//! Clocked physical design for field-coupled nanocomputing (FCN) circuits.
//!
//! FCN layouts are grids of tiles. Every tile belongs to a clock zone, and signals
//! may only move from one zone to the zone of the next clock phase. A
//! [clocking scheme](clocking::ClockingScheme) assigns clock numbers to tiles, a
//! [`GateLevelLayout`](layout::GateLevelLayout) places logic on tiles.
//!
//! The physical design flow operates on a leveled logic network:
//!
//! 1. [`mincross`](mincross::mincross) reorders the nodes within each level to
//!    remove edge crossings.
//! 2. [`check_planarity`](planarity::check_planarity) confirms that the order is
//!    crossing-free.
//! 3. [`plane`](plane::plane) places and routes the network on a 2DDWave-clocked
//!    layout.
//! 4. [`validate`](drv::validate) checks the resulting layout against the rules
//!    of its clocking scheme.
#![warn(missing_docs)]

pub mod clocking;
pub mod config;
pub mod drv;
mod error;
pub mod layout;
pub mod mincross;
pub mod planarity;
pub mod plane;

#[cfg(test)]
mod tests;

pub use error::{Error, Result};
