//! Diagram Layout - WASM Module
//!
//! Automatic layout for a diagram editor: a hierarchical, annealed,
//! force-directed simulation that spreads nested boxes apart, keeps
//! connected boxes at a comfortable distance and settles them onto the
//! editor grid. It is compiled to WebAssembly and exposes a JavaScript-friendly
//! API via wasm-bindgen; the Rust API underneath is usable on its own.
//!
//! # Architecture
//!
//! - `graph`: the diagram arena (nodes, nesting, connections) on petgraph's StableGraph
//! - `spatial`: uniform-grid spatial hash for neighbour lookups
//! - `layout`: forces, annealing schedule and the layout session controller
//! - `clock`: injectable millisecond time source
//! - `logging`: `log` backend for the browser console

use js_sys::Float32Array;
use wasm_bindgen::prelude::*;

pub mod clock;
pub mod error;
pub mod graph;
pub mod layout;
pub mod logging;
pub mod spatial;

use graph::{Diagram, EdgeId, NodeId};
use layout::{LayoutConfig, LayoutConfigPatch, LayoutEngine, LayoutStatus};

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    logging::install();
}

/// Layout session state as seen from JavaScript.
#[wasm_bindgen]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutState {
    Idle = 0,
    Running = 1,
    Settled = 2,
    Stalled = 3,
}

impl From<LayoutStatus> for LayoutState {
    fn from(status: LayoutStatus) -> Self {
        match status {
            LayoutStatus::Idle => LayoutState::Idle,
            LayoutStatus::Running => LayoutState::Running,
            LayoutStatus::Settled => LayoutState::Settled,
            LayoutStatus::Stalled => LayoutState::Stalled,
        }
    }
}

fn node_ids(ids: &[u32]) -> Vec<NodeId> {
    ids.iter().copied().map(NodeId).collect()
}

/// Main entry point: a diagram plus the layout engine that arranges it.
#[wasm_bindgen]
pub struct DiagramLayoutWasm {
    diagram: Diagram,
    engine: LayoutEngine,
}

#[wasm_bindgen]
impl DiagramLayoutWasm {
    /// Create an empty diagram with the default layout config.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<DiagramLayoutWasm, JsError> {
        Ok(Self {
            diagram: Diagram::new(),
            engine: LayoutEngine::new(LayoutConfig::default())?,
        })
    }

    /// Create an empty diagram with a (partial) layout config object.
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(config: JsValue) -> Result<DiagramLayoutWasm, JsError> {
        let patch: LayoutConfigPatch = serde_wasm_bindgen::from_value(config)?;
        Ok(Self {
            diagram: Diagram::new(),
            engine: LayoutEngine::new(LayoutConfig::default().patched(&patch))?,
        })
    }

    // =========================================================================
    // Node Operations
    // =========================================================================

    /// Add a top-level node centred at (x, y). Returns the stable node ID.
    #[wasm_bindgen(js_name = addNode)]
    pub fn add_node(&mut self, x: f32, y: f32, width: f32, height: f32) -> u32 {
        self.diagram.add_node(x, y, width, height).0
    }

    /// Add a node nested inside `parent_id`.
    #[wasm_bindgen(js_name = addChild)]
    pub fn add_child(
        &mut self,
        parent_id: u32,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) -> Result<u32, JsError> {
        Ok(self.diagram.add_child(NodeId(parent_id), x, y, width, height)?.0)
    }

    /// Remove a node, its nested subtree and every connection touching them.
    ///
    /// Returns true if the node existed and was removed.
    #[wasm_bindgen(js_name = removeNode)]
    pub fn remove_node(&mut self, node_id: u32) -> bool {
        self.diagram.remove_node(NodeId(node_id))
    }

    /// Move a node under a new parent, or to the top level with `undefined`.
    #[wasm_bindgen(js_name = setParent)]
    pub fn set_parent(&mut self, node_id: u32, parent_id: Option<u32>) -> Result<(), JsError> {
        self.diagram
            .set_parent(NodeId(node_id), parent_id.map(NodeId))?;
        Ok(())
    }

    #[wasm_bindgen(js_name = nodeCount)]
    pub fn node_count(&self) -> u32 {
        self.diagram.node_count()
    }

    /// Get the upper bound on node slots (max index + 1).
    /// May be larger than nodeCount if nodes have been removed.
    #[wasm_bindgen(js_name = nodeBound)]
    pub fn node_bound(&self) -> u32 {
        self.diagram.node_bound() as u32
    }

    #[wasm_bindgen(js_name = getNodeX)]
    pub fn get_node_x(&self, node_id: u32) -> Option<f32> {
        self.diagram.position(NodeId(node_id)).map(|(x, _)| x)
    }

    #[wasm_bindgen(js_name = getNodeY)]
    pub fn get_node_y(&self, node_id: u32) -> Option<f32> {
        self.diagram.position(NodeId(node_id)).map(|(_, y)| y)
    }

    #[wasm_bindgen(js_name = setNodePosition)]
    pub fn set_node_position(&mut self, node_id: u32, x: f32, y: f32) {
        self.diagram.set_position(NodeId(node_id), x, y);
    }

    #[wasm_bindgen(js_name = getNodeDepth)]
    pub fn get_node_depth(&self, node_id: u32) -> Option<u32> {
        self.diagram.depth(NodeId(node_id))
    }

    #[wasm_bindgen(js_name = getParent)]
    pub fn get_parent(&self, node_id: u32) -> Option<u32> {
        self.diagram.parent(NodeId(node_id)).map(|id| id.0)
    }

    /// Child node IDs in order, as a Uint32Array.
    #[wasm_bindgen(js_name = getChildren)]
    pub fn get_children(&self, node_id: u32) -> Vec<u32> {
        self.diagram
            .children(NodeId(node_id))
            .iter()
            .map(|id| id.0)
            .collect()
    }

    /// Anchored nodes are never moved by the layout.
    #[wasm_bindgen(js_name = setAnchored)]
    pub fn set_anchored(&mut self, node_id: u32, anchored: bool) {
        self.diagram.set_anchored(NodeId(node_id), anchored);
    }

    #[wasm_bindgen(js_name = isAnchored)]
    pub fn is_anchored(&self, node_id: u32) -> bool {
        self.diagram.is_anchored(NodeId(node_id))
    }

    // =========================================================================
    // Edge Operations
    // =========================================================================

    /// Connect two nodes.
    ///
    /// Returns the edge ID, or None if either endpoint doesn't exist.
    #[wasm_bindgen(js_name = addEdge)]
    pub fn add_edge(&mut self, from_id: u32, to_id: u32) -> Option<u32> {
        self.diagram
            .add_edge(NodeId(from_id), NodeId(to_id))
            .map(|id| id.0)
    }

    #[wasm_bindgen(js_name = removeEdge)]
    pub fn remove_edge(&mut self, edge_id: u32) -> bool {
        self.diagram.remove_edge(EdgeId(edge_id))
    }

    #[wasm_bindgen(js_name = edgeCount)]
    pub fn edge_count(&self) -> u32 {
        self.diagram.edge_count()
    }

    // =========================================================================
    // Position Buffer Access (Zero-Copy)
    // =========================================================================

    /// Get a zero-copy view of X positions, indexed by node slot.
    ///
    /// # Safety
    ///
    /// The returned view is invalidated if any Rust allocation occurs.
    /// Read it immediately, do not store.
    #[wasm_bindgen(js_name = getPositionsXView)]
    pub fn get_positions_x_view(&self) -> Float32Array {
        unsafe { Float32Array::view(self.diagram.positions_x()) }
    }

    /// Get a zero-copy view of Y positions, indexed by node slot.
    ///
    /// # Safety
    ///
    /// The returned view is invalidated if any Rust allocation occurs.
    /// Read it immediately, do not store.
    #[wasm_bindgen(js_name = getPositionsYView)]
    pub fn get_positions_y_view(&self) -> Float32Array {
        unsafe { Float32Array::view(self.diagram.positions_y()) }
    }

    #[wasm_bindgen(js_name = positionsLen)]
    pub fn positions_len(&self) -> usize {
        self.diagram.positions_x().len()
    }

    // =========================================================================
    // Layout Session
    // =========================================================================

    /// Start laying out the diagram, skipping `ignore_ids` (e.g. nodes being
    /// dragged). If already running, only the ignore list is updated.
    #[wasm_bindgen(js_name = startLayout)]
    pub fn start_layout(&mut self, ignore_ids: &[u32]) {
        let edges = self.diagram.edges();
        self.engine
            .start(&self.diagram, &edges, &node_ids(ignore_ids));
    }

    #[wasm_bindgen(js_name = stopLayout)]
    pub fn stop_layout(&mut self) {
        self.engine.stop();
    }

    /// Run one simulation step without the session loop.
    /// Returns the total movement.
    pub fn step(&mut self) -> f32 {
        self.engine.step(&mut self.diagram)
    }

    /// One frame of the layout loop. Call from `requestAnimationFrame` while
    /// the result is `Running`.
    pub fn tick(&mut self) -> LayoutState {
        self.engine.tick(&mut self.diagram).into()
    }

    #[wasm_bindgen(js_name = isLayoutRunning)]
    pub fn is_layout_running(&self) -> bool {
        self.engine.is_running()
    }

    #[wasm_bindgen(js_name = layoutState)]
    pub fn layout_state(&self) -> LayoutState {
        self.engine.status().into()
    }

    pub fn temperature(&self) -> f32 {
        self.engine.temperature()
    }

    pub fn iterations(&self) -> u32 {
        self.engine.iterations()
    }

    /// Merge a partial config object into the current config.
    #[wasm_bindgen(js_name = updateConfig)]
    pub fn update_config(&mut self, patch: JsValue) -> Result<(), JsError> {
        let patch: LayoutConfigPatch = serde_wasm_bindgen::from_value(patch)?;
        self.engine.update_config(&patch)?;
        Ok(())
    }

    /// The full current config as a plain object.
    #[wasm_bindgen(js_name = getConfig)]
    pub fn get_config(&self) -> Result<JsValue, JsError> {
        Ok(serde_wasm_bindgen::to_value(self.engine.config())?)
    }

    #[wasm_bindgen(js_name = reheatSimulation)]
    pub fn reheat_simulation(&mut self) {
        self.engine.reheat_simulation();
    }

    /// Tell the layout the user just interacted with the diagram.
    #[wasm_bindgen(js_name = recordInteraction)]
    pub fn record_interaction(&mut self) {
        self.engine.record_interaction();
    }

    #[wasm_bindgen(js_name = setIgnored)]
    pub fn set_ignored(&mut self, ignore_ids: &[u32]) {
        self.engine.set_ignored(&node_ids(ignore_ids));
    }

    /// Top-level nodes are drawn toward the middle of the canvas.
    #[wasm_bindgen(js_name = setCanvasSize)]
    pub fn set_canvas_size(&mut self, width: f32, height: f32) {
        self.engine.set_canvas_size(width, height);
    }

    // =========================================================================
    // Diagram Utilities
    // =========================================================================

    /// Get the bounding box of all node centres.
    ///
    /// Returns [min_x, min_y, max_x, max_y], or None if the diagram is empty.
    #[wasm_bindgen(js_name = getBounds)]
    pub fn get_bounds(&self) -> Option<Vec<f32>> {
        self.diagram
            .get_bounds()
            .map(|(min_x, min_y, max_x, max_y)| vec![min_x, min_y, max_x, max_y])
    }

    /// Stop any running layout and remove all nodes and edges.
    pub fn clear(&mut self) {
        self.engine.stop();
        self.diagram.clear();
    }
}
