//! State representation

use crate::state_machine::transition::PendingTransition;
use petgraph::stable_graph::NodeIndex;

/// A state of the hierarchical state machine.
///
/// Relationship fields (`base`, `parents`, `children`, `incoming_siblings`,
/// `proxy_of`) are plain node indices into the owning [`Hsm`] graph; the
/// graph is the only owner of states.
///
/// [`Hsm`]: crate::state_machine::Hsm
#[derive(Debug, Clone)]
pub struct State {
    pub name: String,

    /// Name rendered for this state. Equal to `name` except for proxies,
    /// which carry the name of the reusable state they stand in for.
    pub display_name: String,

    pub base_name: Option<String>,
    pub base: Option<NodeIndex>,

    /// Hierarchical depth; `None` until ranked (or for hidden surrogate roots).
    pub rank: Option<u32>,

    pub is_base: bool,
    pub is_root: bool,
    pub is_reusable: bool,
    pub is_proxy: bool,
    pub is_hidden: bool,

    pub proxy_of: Option<NodeIndex>,

    pub parents: Vec<NodeIndex>,
    pub children: Vec<NodeIndex>,

    /// Innermost cluster this state was grouped into
    pub cluster: Option<String>,
    /// Full path of cluster ids, outermost first
    pub clusters: Vec<String>,

    /// States that have a legal sibling transition to this one
    pub incoming_siblings: Vec<NodeIndex>,

    pub(crate) pending: Vec<PendingTransition>,
    pub(crate) outgoing: usize,
}

impl State {
    pub fn new(name: impl Into<String>, base_name: Option<String>) -> Self {
        let name = name.into();
        Self {
            display_name: name.clone(),
            name,
            base_name: base_name.filter(|b| !b.is_empty()),
            base: None,
            rank: None,
            is_base: false,
            is_root: false,
            is_reusable: false,
            is_proxy: false,
            is_hidden: false,
            proxy_of: None,
            parents: Vec::new(),
            children: Vec::new(),
            cluster: None,
            clusters: Vec::new(),
            incoming_siblings: Vec::new(),
            pending: Vec::new(),
            outgoing: 0,
        }
    }

    pub fn reusable(mut self) -> Self {
        self.is_reusable = true;
        self
    }

    /// Transitions declared on this state that still wait for resolution
    pub fn pending_transitions(&self) -> &[PendingTransition] {
        &self.pending
    }

    /// Number of outgoing transitions, resolved or not
    pub fn transition_count(&self) -> usize {
        self.outgoing + self.pending.len()
    }

    /// A state is referenced when something structurally points at it.
    pub fn is_referenced(&self) -> bool {
        !self.parents.is_empty() || !self.incoming_siblings.is_empty()
    }

    /// States with transitions, or referenced by another state, are drawn
    /// unless hidden. A reusable state is only drawn through its proxies,
    /// except when it also serves as a base.
    pub fn is_visible(&self) -> bool {
        if self.is_hidden || (self.is_reusable && !self.is_base) {
            return false;
        }
        self.transition_count() > 0 || self.is_referenced()
    }

    /// Get a short display string
    pub fn display_short(&self) -> String {
        match self.rank {
            Some(rank) => format!("{} ({})", self.display_name, rank),
            None => self.display_name.clone(),
        }
    }

    pub(crate) fn reset_rank(&mut self) {
        self.rank = None;
    }

    pub(crate) fn reset_layout(&mut self) {
        self.rank = None;
        self.parents.clear();
        self.children.clear();
        self.incoming_siblings.clear();
        self.cluster = None;
        self.clusters.clear();
    }
}
