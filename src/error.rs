//! Error types for diagram editing and layout configuration.
//!
//! The simulation itself never fails: dangling edges are skipped and
//! coincident nodes are jittered apart. Errors only come from caller input
//! that cannot be applied as given.

use crate::graph::NodeId;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    #[error("config field `{field}` must be {expected}, got {value}")]
    InvalidConfig {
        field: &'static str,
        expected: &'static str,
        value: f64,
    },

    #[error("unknown node: {0}")]
    UnknownNode(NodeId),

    #[error("cannot nest {child} under {parent}: {parent} is inside {child}'s subtree")]
    NestingCycle { child: NodeId, parent: NodeId },
}

pub type Result<T> = std::result::Result<T, LayoutError>;
