//! Hierarchical force-directed layout with simulated annealing.
//!
//! Each sibling list in the nesting forest is laid out as its own small
//! simulation: siblings repel each other, connected same-depth nodes are
//! held at a spring length, everything is drawn toward the owning centre
//! (canvas centre for top-level nodes, the parent's centre for nested ones)
//! and, as the simulation cools, toward the layout grid. Nested levels run
//! the same simulation scaled by `child_scale_factor` per level of depth.

pub mod annealing;
pub mod config;
mod driver;
pub mod engine;
pub mod forces;
pub mod position;
pub mod topology;
pub mod vector;

pub use annealing::{AnnealingPhase, AnnealingScheduler, Thermal};
pub use config::{LayoutConfig, LayoutConfigPatch, LevelParams};
pub use engine::{LayoutEngine, LayoutStatus};
pub use topology::ConnectionMap;
pub use vector::Vec2;
