//! Tunable constants for the force-directed layout.
//!
//! `LayoutConfig` is the full set; `LayoutConfigPatch` is the partial form
//! accepted by `update_config`. Both cross the JS boundary as plain objects
//! with camelCase keys.
//!
//! Every length and force constant is given for the root level. Nested levels
//! use `LevelParams`, where each of those constants is multiplied by
//! `child_scale_factor^depth`.

use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, Result};

/// Base length unit of the editor: default node spacing and spring length.
const BASE_UNIT: f32 = 125.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutConfig {
    /// Inverse-square repulsion strength between siblings.
    pub repulsion_force: f32,
    /// Spring stiffness along same-depth connections.
    pub attraction_force: f32,
    /// Velocity damping at full temperature (0 = stop dead, 1 = no damping).
    pub damping: f32,
    /// Repulsion doubles for siblings closer than this.
    pub min_distance: f32,
    /// Siblings farther apart than this do not repel at all.
    pub max_repulsion_distance: f32,
    /// Spatial hash cell size. Neighbour lookups scan 3x3 cells, so keep this
    /// at least `max_repulsion_distance`.
    pub cell_size: f32,
    /// Upper bound on the per-iteration force magnitude.
    pub max_force: f32,
    /// Force + position passes per step.
    pub iterations: u32,
    /// Rest length of connection springs.
    pub spring_length: f32,
    /// Nodes slower than this keep their position.
    pub movement_threshold: f32,
    /// Total movement per step below which a cold simulation stops.
    pub stop_threshold: f32,
    /// Pull of top-level nodes toward the canvas centre.
    pub center_attraction_force: f32,
    /// Pull of nested nodes toward their parent's centre.
    pub child_center_strength: f32,
    /// Per-depth multiplier applied to lengths and forces.
    pub child_scale_factor: f32,
    /// Grid pitch; 0 disables grid attraction and snapping.
    pub grid_size: f32,
    /// Pull toward the nearest grid intersection once cold.
    pub grid_force: f32,
    /// Coordinates this close to a grid line snap onto it once cold.
    pub snap_tolerance: f32,
    /// Strength of the snap-to-line correction on near-axis connections.
    pub alignment_force: f32,
    /// Angle in radians under which a displacement counts as axis-aligned.
    pub axis_tolerance: f32,
    /// Repulsion multiplier for axis-aligned sibling pairs.
    pub axis_repulsion_damping: f32,
    /// Magnitude of the random push separating coincident nodes.
    pub jitter: f32,
    /// Temperature floor; the simulation may only stop once it gets here.
    pub min_temperature: f32,
    /// Per-tick temperature multiplier while cooling.
    pub annealing_rate: f32,
    /// Quiet time after an interaction before cooling begins.
    pub cooling_delay_ms: f64,
    /// Whether `record_interaction` reheats the simulation.
    pub reheat_on_interaction: bool,
    /// Give up after this many steps without settling; 0 disables the guard.
    pub max_iterations: u32,
    /// Give up after this much wall-clock time without settling; 0 disables the guard.
    pub max_duration_ms: f64,
    /// Seed for the jitter RNG, applied at session start.
    pub random_seed: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            repulsion_force: 2000.0,
            attraction_force: 0.5,
            damping: 0.5,
            min_distance: BASE_UNIT,
            max_repulsion_distance: BASE_UNIT * 3.0,
            cell_size: BASE_UNIT * 3.0,
            max_force: 10.0,
            iterations: 1,
            spring_length: BASE_UNIT,
            movement_threshold: 0.1,
            stop_threshold: 0.05,
            center_attraction_force: 0.01,
            child_center_strength: 0.15,
            child_scale_factor: 0.7,
            grid_size: 25.0,
            grid_force: 0.02,
            snap_tolerance: 1.0,
            alignment_force: 0.3,
            axis_tolerance: 0.15,
            axis_repulsion_damping: 0.5,
            jitter: 1.0,
            min_temperature: 0.1,
            annealing_rate: 0.95,
            cooling_delay_ms: 1500.0,
            reheat_on_interaction: true,
            max_iterations: 10_000,
            max_duration_ms: 0.0,
            random_seed: 0,
        }
    }
}

fn ensure(field: &'static str, value: f64, ok: bool, expected: &'static str) -> Result<()> {
    if ok && value.is_finite() {
        Ok(())
    } else {
        Err(LayoutError::InvalidConfig {
            field,
            expected,
            value,
        })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<()> {
    ensure(field, value as f64, value >= 0.0, "a non-negative number")
}

fn positive(field: &'static str, value: f32) -> Result<()> {
    ensure(field, value as f64, value > 0.0, "a positive number")
}

fn unit_interval(field: &'static str, value: f32) -> Result<()> {
    ensure(field, value as f64, (0.0..=1.0).contains(&value), "in [0, 1]")
}

impl LayoutConfig {
    /// Reject values the simulation cannot run with.
    pub fn validate(&self) -> Result<()> {
        non_negative("repulsionForce", self.repulsion_force)?;
        non_negative("attractionForce", self.attraction_force)?;
        unit_interval("damping", self.damping)?;
        non_negative("minDistance", self.min_distance)?;
        non_negative("maxRepulsionDistance", self.max_repulsion_distance)?;
        positive("cellSize", self.cell_size)?;
        positive("maxForce", self.max_force)?;
        ensure(
            "iterations",
            self.iterations as f64,
            self.iterations >= 1,
            "at least 1",
        )?;
        non_negative("springLength", self.spring_length)?;
        non_negative("movementThreshold", self.movement_threshold)?;
        non_negative("stopThreshold", self.stop_threshold)?;
        non_negative("centerAttractionForce", self.center_attraction_force)?;
        non_negative("childCenterStrength", self.child_center_strength)?;
        positive("childScaleFactor", self.child_scale_factor)?;
        non_negative("gridSize", self.grid_size)?;
        non_negative("gridForce", self.grid_force)?;
        non_negative("snapTolerance", self.snap_tolerance)?;
        non_negative("alignmentForce", self.alignment_force)?;
        ensure(
            "axisTolerance",
            self.axis_tolerance as f64,
            (0.0..=std::f32::consts::FRAC_PI_4).contains(&self.axis_tolerance),
            "in [0, pi/4]",
        )?;
        unit_interval("axisRepulsionDamping", self.axis_repulsion_damping)?;
        non_negative("jitter", self.jitter)?;
        ensure(
            "minTemperature",
            self.min_temperature as f64,
            self.min_temperature > 0.0 && self.min_temperature <= 1.0,
            "in (0, 1]",
        )?;
        ensure(
            "annealingRate",
            self.annealing_rate as f64,
            self.annealing_rate > 0.0 && self.annealing_rate < 1.0,
            "in (0, 1)",
        )?;
        ensure(
            "coolingDelayMs",
            self.cooling_delay_ms,
            self.cooling_delay_ms >= 0.0,
            "a non-negative number",
        )?;
        ensure(
            "maxDurationMs",
            self.max_duration_ms,
            self.max_duration_ms >= 0.0,
            "a non-negative number",
        )?;
        Ok(())
    }

    /// `child_scale_factor^depth`.
    #[inline]
    pub fn depth_scale(&self, depth: u32) -> f32 {
        self.child_scale_factor.powi(depth as i32)
    }

    /// Constants in effect for nodes at `depth`.
    pub fn level(&self, depth: u32) -> LevelParams {
        let scale = self.depth_scale(depth);
        LevelParams {
            depth,
            scale,
            repulsion_force: self.repulsion_force * scale,
            attraction_force: self.attraction_force * scale,
            min_distance: self.min_distance * scale,
            max_repulsion_distance: self.max_repulsion_distance * scale,
            cell_size: self.cell_size * scale,
            max_force: self.max_force * scale,
            spring_length: self.spring_length * scale,
            movement_threshold: self.movement_threshold * scale,
            grid_size: self.grid_size * scale,
            grid_force: self.grid_force * scale,
            snap_tolerance: self.snap_tolerance * scale,
            alignment_force: self.alignment_force * scale,
            jitter: self.jitter * scale,
            center_strength: if depth == 0 {
                self.center_attraction_force
            } else {
                self.child_center_strength
            },
            damping: self.damping,
            axis_tolerance: self.axis_tolerance,
            axis_repulsion_damping: self.axis_repulsion_damping,
        }
    }

    /// Return a copy with `patch` applied, leaving `self` untouched.
    pub fn patched(&self, patch: &LayoutConfigPatch) -> Self {
        let mut next = self.clone();

        macro_rules! merge {
            ($($field:ident),* $(,)?) => {
                $(
                    if let Some(value) = patch.$field {
                        next.$field = value;
                    }
                )*
            };
        }

        merge!(
            repulsion_force,
            attraction_force,
            damping,
            min_distance,
            max_repulsion_distance,
            cell_size,
            max_force,
            iterations,
            spring_length,
            movement_threshold,
            stop_threshold,
            center_attraction_force,
            child_center_strength,
            child_scale_factor,
            grid_size,
            grid_force,
            snap_tolerance,
            alignment_force,
            axis_tolerance,
            axis_repulsion_damping,
            jitter,
            min_temperature,
            annealing_rate,
            cooling_delay_ms,
            reheat_on_interaction,
            max_iterations,
            max_duration_ms,
            random_seed,
        );

        next
    }
}

/// Partial config update. Missing fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LayoutConfigPatch {
    pub repulsion_force: Option<f32>,
    pub attraction_force: Option<f32>,
    pub damping: Option<f32>,
    pub min_distance: Option<f32>,
    pub max_repulsion_distance: Option<f32>,
    pub cell_size: Option<f32>,
    pub max_force: Option<f32>,
    pub iterations: Option<u32>,
    pub spring_length: Option<f32>,
    pub movement_threshold: Option<f32>,
    pub stop_threshold: Option<f32>,
    pub center_attraction_force: Option<f32>,
    pub child_center_strength: Option<f32>,
    pub child_scale_factor: Option<f32>,
    pub grid_size: Option<f32>,
    pub grid_force: Option<f32>,
    pub snap_tolerance: Option<f32>,
    pub alignment_force: Option<f32>,
    pub axis_tolerance: Option<f32>,
    pub axis_repulsion_damping: Option<f32>,
    pub jitter: Option<f32>,
    pub min_temperature: Option<f32>,
    pub annealing_rate: Option<f32>,
    pub cooling_delay_ms: Option<f64>,
    pub reheat_on_interaction: Option<bool>,
    pub max_iterations: Option<u32>,
    pub max_duration_ms: Option<f64>,
    pub random_seed: Option<u32>,
}

/// Depth-scaled constants for one nesting level.
///
/// Lengths and force strengths are the root values times
/// `child_scale_factor^depth`; damping and angles are dimensionless and
/// shared by all levels. The centre pull has separate root and nested
/// constants instead of a scaled one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelParams {
    pub depth: u32,
    /// `child_scale_factor^depth`
    pub scale: f32,
    pub repulsion_force: f32,
    pub attraction_force: f32,
    pub min_distance: f32,
    pub max_repulsion_distance: f32,
    pub cell_size: f32,
    pub max_force: f32,
    pub spring_length: f32,
    pub movement_threshold: f32,
    pub grid_size: f32,
    pub grid_force: f32,
    pub snap_tolerance: f32,
    pub alignment_force: f32,
    pub jitter: f32,
    pub center_strength: f32,
    pub damping: f32,
    pub axis_tolerance: f32,
    pub axis_repulsion_damping: f32,
}
