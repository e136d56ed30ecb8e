//! Spatial hashing for bounded-cost neighbour queries.
//!
//! This module provides a uniform-grid hash that buckets sibling nodes by
//! position so repulsion only considers nearby candidates.

mod hash;

pub use hash::{CellKey, SpatialHash};
