//! State machine module - Build, validate and lay out hierarchical state machines

pub mod analyzer;
pub mod cluster;
pub mod graph;
pub mod hierarchy;
pub mod state;
pub mod topology;
pub mod transition;
pub(crate) mod walk;

// Re-export key types
pub use analyzer::{HsmReport, HsmShape, analyze};
pub use cluster::{ClusterEntry, ClusterMap};
pub use graph::{Hsm, OutgoingTransition};
pub use state::State;
pub use topology::TopologyWarning;
pub use transition::{PendingTransition, Transition, TransitionKind, TransitionTarget};
