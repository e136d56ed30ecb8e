//! Edge identifier and edge records.
//!
//! Edges are the connections drawn between diagram nodes. Only edges whose
//! endpoints sit at the same nesting depth pull their endpoints together
//! during layout; the rest are carried for rendering only.

use std::fmt;

use super::node::NodeId;

/// Stable edge identifier.
///
/// This ID remains valid even after other edges are removed from the diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeId(pub u32);

impl EdgeId {
    /// Create a new EdgeId from a raw u32.
    #[inline]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw u32 value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Edge({})", self.0)
    }
}

impl From<u32> for EdgeId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<EdgeId> for u32 {
    #[inline]
    fn from(id: EdgeId) -> Self {
        id.0
    }
}

/// A connection between two nodes, as handed to the layout engine.
///
/// Endpoints are plain ids: an edge may name a node that no longer exists,
/// and consumers must tolerate that.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub id: EdgeId,
    pub from: NodeId,
    pub to: NodeId,
}

impl Edge {
    pub fn new(id: EdgeId, from: NodeId, to: NodeId) -> Self {
        Self { id, from, to }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_id() {
        let id = EdgeId::new(42);
        assert_eq!(id.raw(), 42);
        assert_eq!(format!("{}", id), "Edge(42)");
    }

    #[test]
    fn test_edge_record() {
        let edge = Edge::new(EdgeId(7), NodeId(1), NodeId(2));
        assert_eq!(edge.from, NodeId(1));
        assert_eq!(edge.to, NodeId(2));
        assert_eq!(u32::from(edge.id), 7);
    }
}
