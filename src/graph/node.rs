//! Node identifier and per-node flags.
//!
//! Nodes are the diagram elements being laid out. Each node has:
//! - A stable unique identifier (survives removal of other nodes)
//! - A centre position (x, y) and a fixed size
//! - An anchored flag (the layout engine never moves anchored nodes)

use std::fmt;

/// Stable node identifier.
///
/// This ID remains valid even after other nodes are removed from the diagram.
/// It wraps a u32 for efficient storage and WebAssembly interop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Create a new NodeId from a raw u32.
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

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

impl From<u32> for NodeId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<NodeId> for u32 {
    #[inline]
    fn from(id: NodeId) -> Self {
        id.0
    }
}

/// Node state flags packed into a single byte.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeState {
    flags: u8,
}

impl NodeState {
    const ANCHORED: u8 = 0b0000_0001;

    #[inline]
    pub fn new() -> Self {
        Self { flags: 0 }
    }

    /// Check if the node is anchored (excluded from position updates).
    #[inline]
    pub fn is_anchored(self) -> bool {
        self.flags & Self::ANCHORED != 0
    }

    #[inline]
    pub fn set_anchored(&mut self, anchored: bool) {
        if anchored {
            self.flags |= Self::ANCHORED;
        } else {
            self.flags &= !Self::ANCHORED;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id() {
        let id = NodeId::new(42);
        assert_eq!(id.raw(), 42);
        assert_eq!(format!("{}", id), "Node(42)");
    }

    #[test]
    fn test_node_id_conversion() {
        let id: NodeId = 123.into();
        let raw: u32 = id.into();
        assert_eq!(raw, 123);
    }

    #[test]
    fn test_node_state_anchored() {
        let mut state = NodeState::new();
        assert!(!state.is_anchored());

        state.set_anchored(true);
        assert!(state.is_anchored());

        state.set_anchored(false);
        assert!(!state.is_anchored());
        assert_eq!(state, NodeState::default());
    }
}
