//! Hierarchical force pass.
//!
//! One call to [`run_pass`] walks the nesting forest top-down. Each sibling
//! list is a self-contained simulation: forces for the whole list are computed
//! from pre-step positions, then velocities and positions are written, then
//! every node's children run as their own list centred on the node's new
//! position. Nothing crosses levels except that cascading centre.

use std::collections::HashSet;

use rand::rngs::StdRng;

use super::annealing::Thermal;
use super::config::{LayoutConfig, LevelParams};
use super::forces;
use super::position;
use super::topology::ConnectionMap;
use super::vector::Vec2;
use crate::graph::{Diagram, NodeId};
use crate::spatial::SpatialHash;

/// Mutable per-session simulation state, indexed by node slot.
#[derive(Debug)]
pub(crate) struct SimulationState {
    pub velocities: Vec<Vec2>,
    pub forces: Vec<Vec2>,
    /// Node each slot's velocity belongs to; the diagram reuses vacated slots.
    owners: Vec<Option<NodeId>>,
    pub hash: SpatialHash,
    pub rng: StdRng,
}

impl SimulationState {
    pub fn new(rng: StdRng) -> Self {
        Self {
            velocities: Vec::new(),
            forces: Vec::new(),
            owners: Vec::new(),
            hash: SpatialHash::default(),
            rng,
        }
    }

    /// Drop all velocities and forces.
    pub fn reset(&mut self, rng: StdRng) {
        self.velocities.clear();
        self.forces.clear();
        self.owners.clear();
        self.hash.clear();
        self.rng = rng;
    }

    /// Grow the slot arrays so nodes added mid-session start at rest.
    fn ensure_slots(&mut self, bound: usize) {
        if self.velocities.len() < bound {
            self.velocities.resize(bound, Vec2::ZERO);
            self.forces.resize(bound, Vec2::ZERO);
            self.owners.resize(bound, None);
        }
    }

    /// Start a slot from rest if it now holds a different node.
    fn claim(&mut self, slot: usize, id: NodeId) {
        if self.owners[slot] != Some(id) {
            self.owners[slot] = Some(id);
            self.velocities[slot] = Vec2::ZERO;
            self.forces[slot] = Vec2::ZERO;
        }
    }

    /// Velocity of `id` at `slot`, zero if the node has not been simulated yet.
    pub fn velocity(&self, slot: usize, id: NodeId) -> Vec2 {
        match self.owners.get(slot) {
            Some(&Some(owner)) if owner == id => self.velocities[slot],
            _ => Vec2::ZERO,
        }
    }
}

/// Read-only inputs shared by every level of one pass.
pub(crate) struct PassContext<'a> {
    pub config: &'a LayoutConfig,
    pub thermal: Thermal,
    pub topology: &'a ConnectionMap,
    pub ignored: &'a HashSet<NodeId>,
    pub root_center: Vec2,
}

/// Run one force + position pass over the whole forest.
/// Returns the total distance moved by all nodes.
pub(crate) fn run_pass(
    diagram: &mut Diagram,
    state: &mut SimulationState,
    ctx: &PassContext,
) -> f32 {
    state.ensure_slots(diagram.node_bound());
    let roots = diagram.root_slots();
    run_level(diagram, state, ctx, &roots, 0, ctx.root_center)
}

fn run_level(
    diagram: &mut Diagram,
    state: &mut SimulationState,
    ctx: &PassContext,
    siblings: &[usize],
    depth: u32,
    center: Vec2,
) -> f32 {
    if siblings.is_empty() {
        return 0.0;
    }

    let level = ctx.config.level(depth);
    for &slot in siblings {
        if let Some(id) = diagram.id_at(slot) {
            state.claim(slot, id);
        }
    }
    let movable: Vec<bool> = siblings
        .iter()
        .map(|&slot| is_movable(&*diagram, ctx, slot))
        .collect();

    let points = siblings.iter().map(|&slot| (slot, diagram.pos_at(slot)));
    state.hash.rebuild(level.cell_size, points);

    // Forces first, from positions nobody at this level has moved yet.
    for (&slot, &free) in siblings.iter().zip(&movable) {
        let force = if free {
            net_force(diagram, state, ctx, &level, slot, center)
        } else {
            Vec2::ZERO
        };
        state.forces[slot] = force;
    }

    let mut moved = 0.0;
    for (&slot, &free) in siblings.iter().zip(&movable) {
        if !free {
            state.velocities[slot] = Vec2::ZERO;
            continue;
        }
        let force = state.forces[slot];
        let velocity = forces::integrate(state.velocities[slot], force, &level, ctx.thermal);
        state.velocities[slot] = velocity;

        let (next, distance) =
            position::advance(diagram.pos_at(slot), velocity, force, &level, ctx.thermal);
        diagram.set_pos_at(slot, next);
        moved += distance;
    }

    for &slot in siblings {
        let children = diagram.child_slots(slot);
        if !children.is_empty() {
            let parent_center = diagram.pos_at(slot);
            moved += run_level(diagram, state, ctx, &children, depth + 1, parent_center);
        }
    }

    moved
}

fn is_movable(diagram: &Diagram, ctx: &PassContext, slot: usize) -> bool {
    if diagram.is_anchored_at(slot) {
        return false;
    }
    match diagram.id_at(slot) {
        Some(id) => !ctx.ignored.contains(&id),
        None => false,
    }
}

/// Sum of every force acting on one node, clamped.
fn net_force(
    diagram: &Diagram,
    state: &mut SimulationState,
    ctx: &PassContext,
    level: &LevelParams,
    slot: usize,
    center: Vec2,
) -> Vec2 {
    let thermal = ctx.thermal;
    let pos = diagram.pos_at(slot);
    let mut force = Vec2::ZERO;

    // Ignored nodes stay in the hash: they still push others away.
    let SimulationState { hash, rng, .. } = state;
    for other in hash.nearby(pos) {
        if other == slot {
            continue;
        }
        let other_pos = diagram.pos_at(other);
        if forces::coincident(pos, other_pos) {
            force += forces::jitter(&mut *rng, level, thermal);
        } else {
            force += forces::repulsion(pos, other_pos, level, thermal);
        }
    }

    let links = diagram
        .id_at(slot)
        .map(|id| ctx.topology.neighbors(slot, id))
        .unwrap_or_default();
    for &(neighbor, neighbor_id) in links {
        // The endpoint may be gone, replaced or re-nested since the topology
        // was built.
        if diagram.id_at(neighbor) != Some(neighbor_id)
            || diagram.depth_at(neighbor) != level.depth
        {
            continue;
        }
        let neighbor_pos = diagram.pos_at(neighbor);
        force += forces::spring(pos, neighbor_pos, level, thermal);
        force += forces::alignment(pos, neighbor_pos, level, thermal);
    }

    force += forces::grid_pull(pos, level, thermal);
    force += forces::center_pull(pos, center, level, thermal);

    force.clamp_length(forces::max_force(level, thermal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, EdgeId};
    use rand::SeedableRng;

    fn quiet_config() -> LayoutConfig {
        LayoutConfig {
            grid_size: 0.0,
            jitter: 0.0,
            ..Default::default()
        }
    }

    fn pass(
        diagram: &mut Diagram,
        config: &LayoutConfig,
        edges: &[Edge],
        ignored: &HashSet<NodeId>,
    ) -> f32 {
        let topology = ConnectionMap::build(diagram, edges);
        let mut state = SimulationState::new(StdRng::seed_from_u64(1));
        let ctx = PassContext {
            config,
            thermal: Thermal::new(1.0),
            topology: &topology,
            ignored,
            root_center: Vec2::ZERO,
        };
        run_pass(diagram, &mut state, &ctx)
    }

    #[test]
    fn test_pass_moves_free_nodes() {
        let mut diagram = Diagram::new();
        let a = diagram.add_node(-20.0, 0.0, 10.0, 10.0);
        let b = diagram.add_node(20.0, 0.0, 10.0, 10.0);
        let config = LayoutConfig {
            center_attraction_force: 0.0,
            ..quiet_config()
        };

        let moved = pass(&mut diagram, &config, &[], &HashSet::new());
        assert!(moved > 0.0);
        assert!(diagram.position(a).unwrap().0 < -20.0);
        assert!(diagram.position(b).unwrap().0 > 20.0);
    }

    #[test]
    fn test_pass_skips_anchored_and_ignored() {
        let mut diagram = Diagram::new();
        let anchored = diagram.add_node(0.0, 0.0, 10.0, 10.0);
        diagram.set_anchored(anchored, true);
        let ignored = diagram.add_node(60.0, 20.0, 10.0, 10.0);
        let free = diagram.add_node(-60.0, 20.0, 10.0, 10.0);

        let ignore: HashSet<NodeId> = [ignored].into_iter().collect();
        pass(&mut diagram, &quiet_config(), &[], &ignore);

        assert_eq!(diagram.position(anchored), Some((0.0, 0.0)));
        assert_eq!(diagram.position(ignored), Some((60.0, 20.0)));
        assert_ne!(diagram.position(free), Some((-60.0, 20.0)));
    }

    #[test]
    fn test_children_follow_parent_center() {
        let mut diagram = Diagram::new();
        let parent = diagram.add_node(500.0, 500.0, 200.0, 200.0);
        diagram.set_anchored(parent, true);
        let child = diagram.add_child(parent, 0.0, 0.0, 10.0, 10.0).unwrap();

        pass(&mut diagram, &quiet_config(), &[], &HashSet::new());
        let (x, y) = diagram.position(child).unwrap();
        assert!(x > 0.0 && y > 0.0, "child should be pulled toward its parent");
    }

    #[test]
    fn test_cross_level_nodes_do_not_repel() {
        let mut diagram = Diagram::new();
        let parent = diagram.add_node(0.0, 0.0, 200.0, 200.0);
        diagram.set_anchored(parent, true);
        let child = diagram.add_child(parent, 0.0, 0.0, 10.0, 10.0).unwrap();

        let config = quiet_config();
        pass(&mut diagram, &config, &[], &HashSet::new());
        // Alone at its parent's centre: no sibling pushes it.
        assert_eq!(diagram.position(child), Some((0.0, 0.0)));
    }

    #[test]
    fn test_springs_only_between_same_depth() {
        let mut diagram = Diagram::new();
        let a = diagram.add_node(-200.0, 0.0, 10.0, 10.0);
        let b = diagram.add_node(200.0, 0.0, 10.0, 10.0);
        let config = LayoutConfig {
            repulsion_force: 0.0,
            center_attraction_force: 0.0,
            ..quiet_config()
        };

        let edge = Edge::new(EdgeId(0), a, b);
        pass(&mut diagram, &config, &[edge], &HashSet::new());
        assert!(diagram.position(a).unwrap().0 > -200.0);
        assert!(diagram.position(b).unwrap().0 < 200.0);
    }
}
