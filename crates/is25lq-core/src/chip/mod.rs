//! Flash chip types and geometry table
//!
//! This module provides the identification record read from the chip and
//! the capacity code to block/sector layout decode for the IS25LQ family.

mod geometry;
mod types;

pub use geometry::*;
pub use types::*;
