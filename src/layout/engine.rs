//! Layout session controller.
//!
//! `LayoutEngine` owns everything a running layout needs besides the diagram
//! itself: configuration, annealing schedule, per-node velocities, the
//! connection topology and the ignore list. The caller owns the cadence:
//! call [`LayoutEngine::tick`] once per animation frame while
//! [`LayoutEngine::is_running`] is true, or [`LayoutEngine::step`] directly
//! for headless use.

use std::collections::HashSet;

use rand::SeedableRng;
use rand::rngs::StdRng;

use super::annealing::{AnnealingPhase, AnnealingScheduler};
use super::config::{LayoutConfig, LayoutConfigPatch};
use super::driver::{self, PassContext, SimulationState};
use super::topology::ConnectionMap;
use super::vector::Vec2;
use crate::clock::{Clock, SystemClock};
use crate::error::Result;
use crate::graph::{Diagram, Edge, NodeId};

/// Where the current (or last) layout session stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutStatus {
    /// Never started, or stopped by the caller.
    Idle,
    Running,
    /// Movement fell below the stop threshold at the temperature floor.
    Settled,
    /// Hit `max_iterations` or `max_duration_ms` while still moving.
    Stalled,
}

pub struct LayoutEngine {
    config: LayoutConfig,
    clock: Box<dyn Clock>,
    scheduler: AnnealingScheduler,
    state: SimulationState,
    topology: ConnectionMap,
    ignored: HashSet<NodeId>,
    canvas_size: Vec2,
    running: bool,
    status: LayoutStatus,
    iterations: u32,
    started_at_ms: f64,
}

impl LayoutEngine {
    /// Create an engine on the system clock.
    pub fn new(config: LayoutConfig) -> Result<Self> {
        Self::with_clock(config, SystemClock)
    }

    /// Create an engine on a caller-supplied clock.
    pub fn with_clock(config: LayoutConfig, clock: impl Clock + 'static) -> Result<Self> {
        config.validate()?;
        warn_on_small_cells(&config);

        let now = clock.now_ms();
        let rng = StdRng::seed_from_u64(config.random_seed.into());
        Ok(Self {
            config,
            clock: Box::new(clock),
            scheduler: AnnealingScheduler::new(now),
            state: SimulationState::new(rng),
            topology: ConnectionMap::new(),
            ignored: HashSet::new(),
            canvas_size: Vec2::ZERO,
            running: false,
            status: LayoutStatus::Idle,
            iterations: 0,
            started_at_ms: now,
        })
    }

    // =========================================================================
    // Session Lifecycle
    // =========================================================================

    /// Begin a layout session.
    ///
    /// The ignore list is replaced even when a session is already running
    /// (a drag may start mid-layout); everything else is left alone in that
    /// case.
    pub fn start(&mut self, diagram: &Diagram, edges: &[Edge], ignore: &[NodeId]) {
        self.set_ignored(ignore);
        if self.running {
            return;
        }

        let now = self.clock.now_ms();
        self.state
            .reset(StdRng::seed_from_u64(self.config.random_seed.into()));
        self.topology = ConnectionMap::build(diagram, edges);
        self.scheduler.reheat(now);
        self.running = true;
        self.status = LayoutStatus::Running;
        self.iterations = 0;
        self.started_at_ms = now;

        log::debug!(
            "layout started: {} nodes, {} connections, {} ignored",
            diagram.node_count(),
            self.topology.connection_count(),
            self.ignored.len()
        );
    }

    /// End the session. Safe to call at any time, any number of times.
    pub fn stop(&mut self) {
        if self.running {
            log::debug!("layout stopped after {} steps", self.iterations);
        }
        self.running = false;
        if self.status == LayoutStatus::Running {
            self.status = LayoutStatus::Idle;
        }
    }

    /// Run `iterations` force + position passes over the whole diagram at the
    /// current temperature. Returns the total movement.
    ///
    /// Works without a running session; springs then follow the topology of
    /// the last `start`.
    pub fn step(&mut self, diagram: &mut Diagram) -> f32 {
        let ctx = PassContext {
            config: &self.config,
            thermal: self.scheduler.thermal(),
            topology: &self.topology,
            ignored: &self.ignored,
            root_center: self.root_center(),
        };

        let mut movement = 0.0;
        for _ in 0..self.config.iterations {
            movement += driver::run_pass(diagram, &mut self.state, &ctx);
        }
        self.iterations = self.iterations.saturating_add(1);
        movement
    }

    /// One frame of the layout loop: advance the cooling schedule, step, and
    /// decide whether the session is over.
    pub fn tick(&mut self, diagram: &mut Diagram) -> LayoutStatus {
        if !self.running {
            return self.status;
        }

        let now = self.clock.now_ms();
        let temperature = self.scheduler.tick(now, &self.config);
        let movement = self.step(diagram);
        log::trace!(
            "tick {}: temperature {temperature:.3}, movement {movement:.3}",
            self.iterations
        );

        let stop_below = self.config.stop_threshold * self.scheduler.thermal().threshold();
        if movement < stop_below && self.scheduler.is_cold(&self.config) {
            log::debug!("layout settled after {} steps", self.iterations);
            self.finish(LayoutStatus::Settled);
        } else if self.config.max_iterations > 0 && self.iterations >= self.config.max_iterations {
            log::warn!(
                "layout still moving after {} steps, giving up",
                self.iterations
            );
            self.finish(LayoutStatus::Stalled);
        } else if self.config.max_duration_ms > 0.0
            && now - self.started_at_ms >= self.config.max_duration_ms
        {
            log::warn!(
                "layout still moving after {:.0} ms, giving up",
                now - self.started_at_ms
            );
            self.finish(LayoutStatus::Stalled);
        }

        self.status
    }

    fn finish(&mut self, status: LayoutStatus) {
        self.running = false;
        self.status = status;
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Apply a partial config. Rejected patches leave the config untouched.
    pub fn update_config(&mut self, patch: &LayoutConfigPatch) -> Result<()> {
        let next = self.config.patched(patch);
        next.validate()?;
        warn_on_small_cells(&next);
        self.config = next;
        Ok(())
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    // =========================================================================
    // Interaction
    // =========================================================================

    /// Back to full temperature; cooling starts over after the delay.
    pub fn reheat_simulation(&mut self) {
        let now = self.clock.now_ms();
        self.scheduler.reheat(now);
    }

    /// The user touched the diagram (drag, add, resize...).
    pub fn record_interaction(&mut self) {
        let now = self.clock.now_ms();
        if self.config.reheat_on_interaction {
            self.scheduler.reheat(now);
        } else {
            self.scheduler.note_interaction(now);
        }
    }

    /// Replace the set of nodes the layout must not move.
    pub fn set_ignored(&mut self, ignore: &[NodeId]) {
        self.ignored.clear();
        self.ignored.extend(ignore.iter().copied());
    }

    pub fn is_ignored(&self, id: NodeId) -> bool {
        self.ignored.contains(&id)
    }

    /// Top-level nodes are pulled toward the middle of the canvas.
    pub fn set_canvas_size(&mut self, width: f32, height: f32) {
        self.canvas_size = Vec2::new(width, height);
    }

    pub fn root_center(&self) -> Vec2 {
        self.canvas_size * 0.5
    }

    // =========================================================================
    // State Queries
    // =========================================================================

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn status(&self) -> LayoutStatus {
        self.status
    }

    pub fn temperature(&self) -> f32 {
        self.scheduler.temperature()
    }

    pub fn phase(&self) -> AnnealingPhase {
        self.scheduler.phase(&self.config)
    }

    /// Steps taken since the session started.
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Current velocity of a node, zero if it has not moved yet.
    pub fn velocity(&self, diagram: &Diagram, id: NodeId) -> Vec2 {
        diagram
            .slot(id)
            .map(|slot| self.state.velocity(slot, id))
            .unwrap_or(Vec2::ZERO)
    }
}

fn warn_on_small_cells(config: &LayoutConfig) {
    if config.cell_size < config.max_repulsion_distance {
        log::warn!(
            "cellSize {} is smaller than maxRepulsionDistance {}: some repulsion will be missed",
            config.cell_size,
            config.max_repulsion_distance
        );
    }
}
