//! Diagram data structures and operations.
//!
//! This module provides the node/edge arena the layout engine reads topology
//! from and writes positions to. Connections live in petgraph's StableGraph
//! for stable node/edge indices; per-node data uses a Structure of Arrays
//! (SoA) layout so positions can be uploaded or viewed without copying.

mod diagram;
mod edge;
mod node;

pub use diagram::Diagram;
pub use edge::{Edge, EdgeId};
pub use node::{NodeId, NodeState};
