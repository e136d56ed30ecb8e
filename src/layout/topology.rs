//! Connection topology for one layout session.
//!
//! Built once at session start from the edge list and the diagram. Only
//! connections between nodes of the same depth produce spring forces, so
//! cross-depth edges are dropped here rather than filtered on every tick.
//!
//! Entries are keyed by slot for speed but remember which node held each
//! slot, since the diagram hands vacated slots to new nodes.

use crate::graph::{Diagram, Edge, NodeId};

/// Undirected adjacency by node slot.
#[derive(Debug, Clone, Default)]
pub struct ConnectionMap {
    owners: Vec<Option<NodeId>>,
    neighbors: Vec<Vec<(usize, NodeId)>>,
    connection_count: usize,
}

impl ConnectionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build adjacency from `edges`, skipping edges whose endpoints are missing
    /// from the diagram and edges that cross nesting levels.
    pub fn build(diagram: &Diagram, edges: &[Edge]) -> Self {
        let bound = diagram.node_bound();
        let owners = (0..bound).map(|slot| diagram.id_at(slot)).collect();
        let mut neighbors = vec![Vec::new(); bound];
        let mut connection_count = 0;
        let mut dangling = 0;
        let mut cross_depth = 0;

        for edge in edges {
            let (Some(a), Some(b)) = (diagram.slot(edge.from), diagram.slot(edge.to)) else {
                dangling += 1;
                continue;
            };
            if a == b {
                continue;
            }
            if diagram.depth_at(a) != diagram.depth_at(b) {
                cross_depth += 1;
                continue;
            }
            neighbors[a].push((b, edge.to));
            neighbors[b].push((a, edge.from));
            connection_count += 1;
        }

        if dangling > 0 {
            log::debug!("skipped {dangling} connection(s) with a missing endpoint");
        }
        log::debug!(
            "topology: {connection_count} connection(s), {cross_depth} cross-depth ignored"
        );

        Self {
            owners,
            neighbors,
            connection_count,
        }
    }

    /// Connections of node `id` at `slot`, as `(slot, node)` pairs.
    ///
    /// Empty when the map was built before `id` took over the slot. The pairs
    /// record who held each neighbour slot at build time; callers check that
    /// against the diagram before using one.
    #[inline]
    pub fn neighbors(&self, slot: usize, id: NodeId) -> &[(usize, NodeId)] {
        match self.owners.get(slot) {
            Some(&Some(owner)) if owner == id => &self.neighbors[slot],
            _ => &[],
        }
    }

    /// Number of edges kept.
    pub fn connection_count(&self) -> usize {
        self.connection_count
    }
}
