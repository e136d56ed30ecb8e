//! Diagram - the node/edge arena the layout engine works on.
//!
//! The Diagram stores connection topology using petgraph's StableGraph and
//! keeps per-node data (centre position, size, depth, flags) in SoA
//! (Structure of Arrays) buffers indexed by the graph's stable node index.
//! Positions can be handed to the renderer as zero-copy views.
//!
//! Nesting is a forest kept beside the graph: each node has at most one
//! parent (stored as an id, never owning) and an ordered list of children.

use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences, NodeIndexable};
use petgraph::{Directed, Direction};
use std::collections::HashMap;

use super::edge::{Edge, EdgeId};
use super::node::{NodeId, NodeState};
use crate::error::{LayoutError, Result};
use crate::layout::Vec2;

/// The diagram being edited and laid out.
///
/// This struct manages:
/// - Connection topology via petgraph
/// - Position/size buffers in SoA layout
/// - The parent/child nesting forest and per-node depth
/// - Node state (anchored)
/// - ID mapping between stable IDs and internal indices
pub struct Diagram {
    /// Connections between nodes. Nodes store their stable NodeId,
    /// edges store their stable EdgeId.
    graph: StableGraph<NodeId, EdgeId, Directed>,

    node_id_to_index: HashMap<NodeId, NodeIndex>,
    edge_id_to_index: HashMap<EdgeId, EdgeIndex>,

    next_node_id: u32,
    next_edge_id: u32,

    /// Centre X positions (SoA layout)
    pos_x: Vec<f32>,
    /// Centre Y positions (SoA layout)
    pos_y: Vec<f32>,
    width: Vec<f32>,
    height: Vec<f32>,

    /// Nesting depth, root = 0
    depth: Vec<u32>,
    parent: Vec<Option<NodeId>>,
    children: Vec<Vec<NodeId>>,
    states: Vec<NodeState>,

    /// Top-level nodes in insertion order
    roots: Vec<NodeId>,
}

impl Diagram {
    /// Create a new empty diagram.
    pub fn new() -> Self {
        Self::with_capacity(0, 0)
    }

    /// Create a diagram with pre-allocated capacity.
    pub fn with_capacity(node_capacity: usize, edge_capacity: usize) -> Self {
        Self {
            graph: StableGraph::with_capacity(node_capacity, edge_capacity),
            node_id_to_index: HashMap::with_capacity(node_capacity),
            edge_id_to_index: HashMap::with_capacity(edge_capacity),
            next_node_id: 0,
            next_edge_id: 0,
            pos_x: Vec::with_capacity(node_capacity),
            pos_y: Vec::with_capacity(node_capacity),
            width: Vec::with_capacity(node_capacity),
            height: Vec::with_capacity(node_capacity),
            depth: Vec::with_capacity(node_capacity),
            parent: Vec::with_capacity(node_capacity),
            children: Vec::with_capacity(node_capacity),
            states: Vec::with_capacity(node_capacity),
            roots: Vec::new(),
        }
    }

    // =========================================================================
    // Node Operations
    // =========================================================================

    /// Add a top-level node centred at (x, y).
    pub fn add_node(&mut self, x: f32, y: f32, width: f32, height: f32) -> NodeId {
        let id = self.insert_node(x, y, width, height, 0, None);
        self.roots.push(id);
        id
    }

    /// Add a node nested inside `parent`, appended after its existing children.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) -> Result<NodeId> {
        let parent_slot = self.slot(parent).ok_or(LayoutError::UnknownNode(parent))?;
        let depth = self.depth[parent_slot] + 1;
        let id = self.insert_node(x, y, width, height, depth, Some(parent));
        self.children[parent_slot].push(id);
        Ok(id)
    }

    fn insert_node(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        depth: u32,
        parent: Option<NodeId>,
    ) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;

        let index = self.graph.add_node(id);
        self.node_id_to_index.insert(id, index);

        // StableGraph hands out vacated indices again, so a slot may already exist.
        let i = index.index();
        if i == self.pos_x.len() {
            self.pos_x.push(x);
            self.pos_y.push(y);
            self.width.push(width);
            self.height.push(height);
            self.depth.push(depth);
            self.parent.push(parent);
            self.children.push(Vec::new());
            self.states.push(NodeState::new());
        } else {
            self.pos_x[i] = x;
            self.pos_y[i] = y;
            self.width[i] = width;
            self.height[i] = height;
            self.depth[i] = depth;
            self.parent[i] = parent;
            self.children[i].clear();
            self.states[i] = NodeState::new();
        }

        id
    }

    /// Remove a node together with its whole subtree and every edge touching
    /// any removed node.
    ///
    /// Returns true if the node existed and was removed.
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        let Some(slot) = self.slot(id) else {
            return false;
        };

        self.detach(id, slot);

        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(index) = self.node_id_to_index.remove(&current) else {
                continue;
            };
            let i = index.index();
            stack.extend(self.children[i].drain(..));

            let edges: Vec<_> = self
                .graph
                .edges_directed(index, Direction::Outgoing)
                .chain(self.graph.edges_directed(index, Direction::Incoming))
                .map(|e| *e.weight())
                .collect();
            for edge_id in edges {
                self.edge_id_to_index.remove(&edge_id);
            }

            // Zero out SoA arrays for the removed node's slot
            self.pos_x[i] = 0.0;
            self.pos_y[i] = 0.0;
            self.width[i] = 0.0;
            self.height[i] = 0.0;
            self.depth[i] = 0;
            self.parent[i] = None;
            self.states[i] = NodeState::new();

            self.graph.remove_node(index);
        }

        true
    }

    /// Move `child` under `parent`, or to the top level when `parent` is None.
    ///
    /// The child is appended after the new parent's existing children and the
    /// depth of its whole subtree is recomputed.
    pub fn set_parent(&mut self, child: NodeId, parent: Option<NodeId>) -> Result<()> {
        let child_slot = self.slot(child).ok_or(LayoutError::UnknownNode(child))?;

        let new_depth = match parent {
            Some(p) => {
                let parent_slot = self.slot(p).ok_or(LayoutError::UnknownNode(p))?;
                if self.is_in_subtree(p, child) {
                    return Err(LayoutError::NestingCycle { child, parent: p });
                }
                self.depth[parent_slot] + 1
            }
            None => 0,
        };

        self.detach(child, child_slot);
        self.parent[child_slot] = parent;
        match parent.and_then(|p| self.slot(p)) {
            Some(parent_slot) => self.children[parent_slot].push(child),
            None => self.roots.push(child),
        }

        let mut stack = vec![(child_slot, new_depth)];
        while let Some((slot, depth)) = stack.pop() {
            self.depth[slot] = depth;
            for &grandchild in &self.children[slot] {
                if let Some(s) = self.slot(grandchild) {
                    stack.push((s, depth + 1));
                }
            }
        }

        Ok(())
    }

    /// Walk up from `node`; true if `ancestor` is `node` or one of its ancestors.
    fn is_in_subtree(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.slot(id).and_then(|s| self.parent[s]);
        }
        false
    }

    /// Unlink a node from its parent's child list (or the root list).
    fn detach(&mut self, id: NodeId, slot: usize) {
        let siblings = match self.parent[slot].and_then(|p| self.slot(p)) {
            Some(parent_slot) => &mut self.children[parent_slot],
            None => &mut self.roots,
        };
        siblings.retain(|&sibling| sibling != id);
    }

    /// Get the number of nodes.
    pub fn node_count(&self) -> u32 {
        self.graph.node_count() as u32
    }

    /// Get the upper bound on node slots (max index + 1).
    /// This may be larger than node_count() if nodes have been removed.
    pub fn node_bound(&self) -> usize {
        self.graph.node_bound()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node_id_to_index.contains_key(&id)
    }

    /// Get a node's centre position.
    pub fn position(&self, id: NodeId) -> Option<(f32, f32)> {
        self.slot(id).map(|i| (self.pos_x[i], self.pos_y[i]))
    }

    /// Set a node's centre position.
    pub fn set_position(&mut self, id: NodeId, x: f32, y: f32) {
        if let Some(i) = self.slot(id) {
            self.pos_x[i] = x;
            self.pos_y[i] = y;
        }
    }

    /// Get a node's (width, height).
    pub fn size(&self, id: NodeId) -> Option<(f32, f32)> {
        self.slot(id).map(|i| (self.width[i], self.height[i]))
    }

    pub fn depth(&self, id: NodeId) -> Option<u32> {
        self.slot(id).map(|i| self.depth[i])
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slot(id).and_then(|i| self.parent[i])
    }

    /// Ordered children of a node; empty for unknown ids.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.slot(id).map(|i| self.children[i].as_slice()).unwrap_or(&[])
    }

    /// Top-level nodes in insertion order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Anchor or release a node.
    pub fn set_anchored(&mut self, id: NodeId, anchored: bool) {
        if let Some(i) = self.slot(id) {
            self.states[i].set_anchored(anchored);
        }
    }

    pub fn is_anchored(&self, id: NodeId) -> bool {
        self.slot(id)
            .map(|i| self.states[i].is_anchored())
            .unwrap_or(false)
    }

    // =========================================================================
    // Edge Operations
    // =========================================================================

    /// Connect two nodes.
    ///
    /// Returns the edge ID, or None if either endpoint doesn't exist.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId) -> Option<EdgeId> {
        let from_index = *self.node_id_to_index.get(&from)?;
        let to_index = *self.node_id_to_index.get(&to)?;

        let id = EdgeId(self.next_edge_id);
        self.next_edge_id += 1;

        let index = self.graph.add_edge(from_index, to_index, id);
        self.edge_id_to_index.insert(id, index);

        Some(id)
    }

    /// Remove an edge.
    pub fn remove_edge(&mut self, id: EdgeId) -> bool {
        match self.edge_id_to_index.remove(&id) {
            Some(index) => {
                self.graph.remove_edge(index);
                true
            }
            None => false,
        }
    }

    pub fn edge_count(&self) -> u32 {
        self.graph.edge_count() as u32
    }

    /// Snapshot of every edge as an id-based record.
    pub fn edges(&self) -> Vec<Edge> {
        self.graph
            .edge_references()
            .filter_map(|e| {
                let from = *self.graph.node_weight(e.source())?;
                let to = *self.graph.node_weight(e.target())?;
                Some(Edge::new(*e.weight(), from, to))
            })
            .collect()
    }

    // =========================================================================
    // Buffer Access
    // =========================================================================

    /// Get X positions slice (indexed by slot, dead slots are zero).
    pub fn positions_x(&self) -> &[f32] {
        &self.pos_x
    }

    /// Get Y positions slice (indexed by slot, dead slots are zero).
    pub fn positions_y(&self) -> &[f32] {
        &self.pos_y
    }

    // =========================================================================
    // Slot Access (layout engine)
    // =========================================================================

    pub(crate) fn slot(&self, id: NodeId) -> Option<usize> {
        self.node_id_to_index.get(&id).map(|index| index.index())
    }

    pub(crate) fn id_at(&self, slot: usize) -> Option<NodeId> {
        self.graph.node_weight(NodeIndex::new(slot)).copied()
    }

    #[inline]
    pub(crate) fn pos_at(&self, slot: usize) -> Vec2 {
        Vec2::new(self.pos_x[slot], self.pos_y[slot])
    }

    #[inline]
    pub(crate) fn set_pos_at(&mut self, slot: usize, pos: Vec2) {
        self.pos_x[slot] = pos.x;
        self.pos_y[slot] = pos.y;
    }

    #[inline]
    pub(crate) fn depth_at(&self, slot: usize) -> u32 {
        self.depth[slot]
    }

    #[inline]
    pub(crate) fn is_anchored_at(&self, slot: usize) -> bool {
        self.states[slot].is_anchored()
    }

    /// Slots of a node's children, in child order.
    pub(crate) fn child_slots(&self, slot: usize) -> Vec<usize> {
        self.children[slot]
            .iter()
            .filter_map(|&child| self.slot(child))
            .collect()
    }

    pub(crate) fn root_slots(&self) -> Vec<usize> {
        self.roots.iter().filter_map(|&id| self.slot(id)).collect()
    }

    // =========================================================================
    // Utilities
    // =========================================================================

    /// Get the bounding box of all node centres as (min_x, min_y, max_x, max_y).
    /// Skips dead slots (nodes that have been removed).
    pub fn get_bounds(&self) -> Option<(f32, f32, f32, f32)> {
        let mut bounds: Option<(f32, f32, f32, f32)> = None;

        for node_index in self.graph.node_indices() {
            let i = node_index.index();
            let (x, y) = (self.pos_x[i], self.pos_y[i]);
            bounds = Some(match bounds {
                None => (x, y, x, y),
                Some((min_x, min_y, max_x, max_y)) => {
                    (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y))
                }
            });
        }

        bounds
    }

    /// Clear all nodes and edges, resetting the diagram to its initial state.
    pub fn clear(&mut self) {
        self.graph.clear();
        self.node_id_to_index.clear();
        self.edge_id_to_index.clear();
        self.next_node_id = 0;
        self.next_edge_id = 0;
        self.pos_x.clear();
        self.pos_y.clear();
        self.width.clear();
        self.height.clear();
        self.depth.clear();
        self.parent.clear();
        self.children.clear();
        self.states.clear();
        self.roots.clear();
    }
}

impl Default for Diagram {
    fn default() -> Self {
        Self::new()
    }
}
