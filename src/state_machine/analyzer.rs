//! Summary of a finalized state machine
//!
//! Counts what the topology phases produced (synthetic states, illegal
//! edges, clusters) and classifies the overall shape of the machine.

use super::{ClusterMap, Hsm, State};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HsmShape {
    /// No states at all
    Empty,

    /// Top level only: A <-> B <-> C
    Flat,

    /// One tree of nested states under a single root
    Nested,

    /// Several independent trees
    Forest,
}

impl HsmShape {
    pub fn display_name(&self) -> &'static str {
        match self {
            HsmShape::Empty => "Empty",
            HsmShape::Flat => "Flat",
            HsmShape::Nested => "Nested",
            HsmShape::Forest => "Forest",
        }
    }
}

/// Analysis report of a finalized graph
#[derive(Debug, Clone, Serialize)]
pub struct HsmReport {
    pub shape: HsmShape,
    pub total_states: usize,
    pub visible_states: usize,
    pub surrogate_roots: usize,
    pub proxies: usize,
    pub reusable_states: usize,
    pub base_states: usize,
    pub transitions: usize,
    pub illegal_transitions: usize,
    pub max_rank: Option<u32>,
    pub clusters: usize,
    pub warnings: Vec<String>,
}

/// Summarize a finalized graph
pub fn analyze(hsm: &Hsm) -> HsmReport {
    let count = |predicate: fn(&State) -> bool| {
        hsm.states().filter(|state| predicate(state)).count()
    };

    let illegal_transitions = hsm
        .state_indices()
        .into_iter()
        .flat_map(|index| hsm.transitions(index))
        .filter(|transition| !transition.is_legal)
        .count();

    let surrogate_roots = hsm.roots().len();
    let max_rank = hsm.max_rank();
    let shape = if hsm.state_count() == 0 {
        HsmShape::Empty
    } else if surrogate_roots > 1 {
        HsmShape::Forest
    } else if max_rank.unwrap_or(0) == 0 {
        HsmShape::Flat
    } else {
        HsmShape::Nested
    };

    HsmReport {
        shape,
        total_states: hsm.state_count(),
        visible_states: count(|state| state.is_visible()),
        surrogate_roots,
        proxies: count(|state| state.is_proxy),
        reusable_states: count(|state| state.is_reusable),
        base_states: count(|state| state.is_base),
        transitions: hsm.transition_count(),
        illegal_transitions,
        max_rank,
        clusters: ClusterMap::build(hsm).len(),
        warnings: hsm.warnings().iter().map(ToString::to_string).collect(),
    }
}
