//! Transition representation

use petgraph::stable_graph::NodeIndex;
use serde::Serialize;

/// The three kinds of transitions an HSM state can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TransitionKind {
    /// Containment edge, entered at an unspecified sub-state
    Inner,
    /// Containment edge naming the sub-state entered from outside
    InnerEntry,
    /// Lateral edge between states of the same level
    Sibling,
}

impl TransitionKind {
    /// Inner and inner-entry transitions descend one level.
    pub fn is_structural(&self) -> bool {
        matches!(self, TransitionKind::Inner | TransitionKind::InnerEntry)
    }

    pub fn name(&self) -> &'static str {
        match self {
            TransitionKind::Inner => "Inner",
            TransitionKind::InnerEntry => "InnerEntry",
            TransitionKind::Sibling => "Sibling",
        }
    }

    /// Short tag used in debug dumps
    pub fn tag(&self) -> char {
        match self {
            TransitionKind::Inner => 'I',
            TransitionKind::InnerEntry => 'E',
            TransitionKind::Sibling => 'S',
        }
    }
}

/// Target of a declared transition.
///
/// Transitions scanned from source text start out `Unresolved`; the
/// reference resolution step turns each of them into a graph edge exactly
/// once. Transitions created internally (inheritance, surrogate roots) are
/// already `Resolved`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionTarget {
    Unresolved(String),
    Resolved(NodeIndex),
}

impl From<&str> for TransitionTarget {
    fn from(name: &str) -> Self {
        TransitionTarget::Unresolved(name.to_string())
    }
}

impl From<String> for TransitionTarget {
    fn from(name: String) -> Self {
        TransitionTarget::Unresolved(name)
    }
}

impl From<NodeIndex> for TransitionTarget {
    fn from(index: NodeIndex) -> Self {
        TransitionTarget::Resolved(index)
    }
}

/// A transition declared on a state whose target has not been resolved yet.
#[derive(Debug, Clone)]
pub struct PendingTransition {
    pub kind: TransitionKind,
    pub target: String,
    pub(crate) order: u64,
}

/// A resolved transition, stored as the weight of a graph edge.
#[derive(Debug, Clone)]
pub struct Transition {
    pub kind: TransitionKind,

    /// Cleared when the edge closes an illegal cycle. Illegal edges stay in
    /// the graph but are ignored by ranking, hierarchy and clustering.
    pub is_legal: bool,

    /// Declaration order across the whole graph. Outgoing edges of a state
    /// are always enumerated by this key.
    pub(crate) order: u64,
}

impl Transition {
    pub fn new(kind: TransitionKind, order: u64) -> Self {
        Self {
            kind,
            is_legal: true,
            order,
        }
    }

    /// DOT attribute list for this edge.
    ///
    /// `target_parent_count` is the number of parents of the edge's target,
    /// which decides how strongly the layout engine keeps the edge short.
    pub fn dot_attributes(&self, target_parent_count: usize) -> String {
        let (style, weight) = match self.kind {
            TransitionKind::Inner | TransitionKind::InnerEntry => {
                let weight = if target_parent_count == 1 { 100 } else { 1 };
                let style = if self.kind == TransitionKind::InnerEntry {
                    "bold"
                } else {
                    "solid"
                };
                (style, weight)
            }
            TransitionKind::Sibling => ("dotted", 50),
        };
        let color = if self.is_legal { "black" } else { "red" };
        format!("[style=\"{}\",weight={},color=\"{}\"]", style, weight, color)
    }
}
