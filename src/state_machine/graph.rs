use crate::state_machine::topology::TopologyWarning;
use crate::state_machine::transition::PendingTransition;
use crate::state_machine::{State, Transition, TransitionKind, TransitionTarget};
use crate::{Error, Result};
use petgraph::Direction;
use petgraph::prelude::EdgeRef;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableGraph};
use std::collections::HashMap;
use std::fmt;

/// A hierarchical state machine being assembled, validated and laid out.
///
/// Nodes are [`State`]s and edges are resolved [`Transition`]s. States are
/// never removed, so node indices ascend in declaration order and every
/// enumeration below follows that order.
#[derive(Debug, Clone, Default)]
pub struct Hsm {
    pub(crate) graph: StableGraph<State, Transition>,

    /// Unique state name to node. Aliases are kept apart and only consulted
    /// by [`Hsm::lookup`].
    pub(crate) state_index: HashMap<String, NodeIndex>,

    aliases: HashMap<String, String>,

    names: NameGenerator,
    next_order: u64,
    pub(crate) warnings: Vec<TopologyWarning>,
}

/// An outgoing transition of a state, as seen by the graph walks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutgoingTransition {
    pub edge: EdgeIndex,
    pub target: NodeIndex,
    pub kind: TransitionKind,
    pub is_legal: bool,
}

/// Generates names for synthetic states. Owned by one graph, so separate
/// graphs never share a counter.
#[derive(Debug, Clone, Default)]
struct NameGenerator {
    last: u64,
}

impl NameGenerator {
    fn next(&mut self, prefix: &str) -> String {
        self.last += 1;
        format!("{}{}", prefix, self.last)
    }
}

impl Hsm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates and registers a state. Names are unique.
    pub fn add_state(&mut self, name: &str, base_name: Option<&str>) -> Result<NodeIndex> {
        self.insert_state(State::new(name, base_name.map(str::to_string)))
    }

    /// Registers a fully built state.
    pub fn insert_state(&mut self, state: State) -> Result<NodeIndex> {
        if self.state_index.contains_key(&state.name) {
            return Err(Error::DuplicateState(state.name));
        }
        let name = state.name.clone();
        let node_index = self.graph.add_node(state);
        self.state_index.insert(name, node_index);
        Ok(node_index)
    }

    /// Appends a transition to `state`. Unresolved names are kept on the
    /// state until [`Hsm::finalize`] resolves them.
    ///
    /// [`Hsm::finalize`]: crate::state_machine::Hsm::finalize
    pub fn add_transition(
        &mut self,
        state: NodeIndex,
        kind: TransitionKind,
        target: impl Into<TransitionTarget>,
    ) {
        match target.into() {
            TransitionTarget::Resolved(target) => {
                self.connect(state, target, kind);
            }
            TransitionTarget::Unresolved(name) => {
                let order = self.allocate_order();
                if let Some(source) = self.graph.node_weight_mut(state) {
                    source.pending.push(PendingTransition {
                        kind,
                        target: name,
                        order,
                    });
                }
            }
        }
    }

    /// Records an alternate spelling for a state name.
    pub fn register_alias(&mut self, alias: &str, canonical: &str) {
        self.aliases.insert(alias.to_string(), canonical.to_string());
    }

    /// Finds a state by name, falling back to one alias indirection.
    pub fn lookup(&self, name: &str) -> Option<NodeIndex> {
        if let Some(&index) = self.state_index.get(name) {
            return Some(index);
        }
        self.aliases
            .get(name)
            .and_then(|canonical| self.state_index.get(canonical))
            .copied()
    }

    /// Get a state by its name or alias
    pub fn get_state(&self, name: &str) -> Option<&State> {
        self.lookup(name).map(|index| &self.graph[index])
    }

    pub fn state(&self, index: NodeIndex) -> &State {
        &self.graph[index]
    }

    pub(crate) fn state_mut(&mut self, index: NodeIndex) -> &mut State {
        &mut self.graph[index]
    }

    pub fn name_of(&self, index: NodeIndex) -> &str {
        &self.graph[index].name
    }

    /// All node indices in declaration order
    pub fn state_indices(&self) -> Vec<NodeIndex> {
        self.graph.node_indices().collect()
    }

    /// All states in declaration order
    pub fn states(&self) -> impl Iterator<Item = &State> {
        self.graph.node_indices().map(move |index| &self.graph[index])
    }

    pub fn state_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn transition_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Resolved outgoing transitions of `state`, in declaration order.
    pub fn transitions(&self, state: NodeIndex) -> Vec<OutgoingTransition> {
        let mut edges: Vec<_> = self
            .graph
            .edges_directed(state, Direction::Outgoing)
            .map(|edge| (edge.weight().order, edge))
            .collect();
        edges.sort_by_key(|(order, _)| *order);
        edges
            .into_iter()
            .map(|(_, edge)| OutgoingTransition {
                edge: edge.id(),
                target: edge.target(),
                kind: edge.weight().kind,
                is_legal: edge.weight().is_legal,
            })
            .collect()
    }

    /// Legal sibling transitions of `state`
    pub fn legal_siblings(&self, state: NodeIndex) -> Vec<OutgoingTransition> {
        self.transitions(state)
            .into_iter()
            .filter(|t| t.is_legal && t.kind == TransitionKind::Sibling)
            .collect()
    }

    /// Legal structural transitions of `state`: all inner transitions first,
    /// then all inner-entry transitions.
    pub fn legal_structural(&self, state: NodeIndex) -> Vec<OutgoingTransition> {
        let transitions = self.transitions(state);
        let mut structural: Vec<_> = transitions
            .iter()
            .filter(|t| t.is_legal && t.kind == TransitionKind::Inner)
            .copied()
            .collect();
        structural.extend(
            transitions
                .iter()
                .filter(|t| t.is_legal && t.kind == TransitionKind::InnerEntry),
        );
        structural
    }

    pub fn transition(&self, edge: EdgeIndex) -> &Transition {
        &self.graph[edge]
    }

    pub fn endpoints(&self, edge: EdgeIndex) -> Option<(NodeIndex, NodeIndex)> {
        self.graph.edge_endpoints(edge)
    }

    pub(crate) fn mark_illegal(&mut self, edge: EdgeIndex) {
        if let Some(transition) = self.graph.edge_weight_mut(edge) {
            transition.is_legal = false;
        }
    }

    /// Current roots in declaration order
    pub fn roots(&self) -> Vec<NodeIndex> {
        self.graph
            .node_indices()
            .filter(|&index| self.graph[index].is_root)
            .collect()
    }

    pub fn max_rank(&self) -> Option<u32> {
        self.states().filter_map(|s| s.rank).max()
    }

    pub fn states_by_rank(&self, rank: u32) -> Vec<&State> {
        self.states().filter(|s| s.rank == Some(rank)).collect()
    }

    /// Recoverable topology irregularities found so far, in discovery order
    pub fn warnings(&self) -> &[TopologyWarning] {
        &self.warnings
    }

    pub(crate) fn warn(&mut self, warning: TopologyWarning) {
        tracing::warn!("{}", warning);
        self.warnings.push(warning);
    }

    /// Adds a resolved edge, keeping outgoing counts and declaration order.
    pub(crate) fn connect(
        &mut self,
        source: NodeIndex,
        target: NodeIndex,
        kind: TransitionKind,
    ) -> EdgeIndex {
        let order = self.allocate_order();
        self.graph[source].outgoing += 1;
        self.graph
            .add_edge(source, target, Transition::new(kind, order))
    }

    /// Points an existing edge at a different target. The transition keeps
    /// its kind, legality and place in the source's declaration order.
    pub(crate) fn redirect(&mut self, edge: EdgeIndex, new_target: NodeIndex) -> Option<EdgeIndex> {
        let (source, _) = self.graph.edge_endpoints(edge)?;
        let transition = self.graph.remove_edge(edge)?;
        Some(self.graph.add_edge(source, new_target, transition))
    }

    /// A fresh state name starting with `prefix`, unused in this graph.
    pub(crate) fn unique_name(&mut self, prefix: &str) -> String {
        loop {
            let candidate = self.names.next(prefix);
            if !self.state_index.contains_key(&candidate) {
                return candidate;
            }
        }
    }

    fn allocate_order(&mut self) -> u64 {
        let order = self.next_order;
        self.next_order += 1;
        order
    }
}

impl fmt::Display for Hsm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for index in self.graph.node_indices() {
            let state = &self.graph[index];
            write!(f, "State {}", state.name)?;
            if let Some(rank) = state.rank {
                write!(f, " Rank: {}", rank)?;
            }
            for parent in &state.parents {
                write!(f, " Parent: {}", self.name_of(*parent))?;
            }
            for child in &state.children {
                write!(f, " Child: {}", self.name_of(*child))?;
            }
            for t in self.transitions(index) {
                write!(f, " {}:{}", t.kind.tag(), self.name_of(t.target))?;
            }
            for cluster in &state.clusters {
                write!(f, " {}", cluster)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_graph() {
        let hsm = Hsm::new();
        assert_eq!(hsm.state_count(), 0);
        assert_eq!(hsm.transition_count(), 0);
        assert!(hsm.roots().is_empty());
        assert_eq!(hsm.max_rank(), None);
    }

    #[test]
    fn test_duplicate_state_is_rejected() {
        let mut hsm = Hsm::new();
        hsm.add_state("Alive", Some("State")).unwrap();
        let err = hsm.add_state("Alive", Some("State")).unwrap_err();
        assert!(matches!(err, Error::DuplicateState(name) if name == "Alive"));
    }

    #[test]
    fn test_lookup_through_alias() {
        let mut hsm = Hsm::new();
        let idle = hsm.add_state("Idle", None).unwrap();
        hsm.register_alias("Rest", "Idle");
        hsm.register_alias("Nowhere", "Missing");

        assert_eq!(hsm.lookup("Idle"), Some(idle));
        assert_eq!(hsm.lookup("Rest"), Some(idle));
        assert_eq!(hsm.lookup("Nowhere"), None);
        assert_eq!(hsm.lookup("Unknown"), None);
    }

    #[test]
    fn test_pending_and_resolved_transitions() {
        let mut hsm = Hsm::new();
        let top = hsm.add_state("Top", None).unwrap();
        let idle = hsm.add_state("Idle", None).unwrap();

        hsm.add_transition(top, TransitionKind::Inner, "Idle");
        hsm.add_transition(top, TransitionKind::Sibling, idle);

        assert_eq!(hsm.state(top).pending_transitions().len(), 1);
        assert_eq!(hsm.state(top).transition_count(), 2);
        assert_eq!(hsm.transitions(top).len(), 1);
        assert_eq!(hsm.transitions(top)[0].target, idle);
    }

    #[test]
    fn test_transitions_keep_declaration_order() {
        let mut hsm = Hsm::new();
        let a = hsm.add_state("A", None).unwrap();
        let b = hsm.add_state("B", None).unwrap();
        let c = hsm.add_state("C", None).unwrap();
        hsm.add_transition(a, TransitionKind::InnerEntry, b);
        hsm.add_transition(a, TransitionKind::Inner, c);
        hsm.add_transition(a, TransitionKind::Sibling, c);

        let targets: Vec<_> = hsm.transitions(a).iter().map(|t| t.target).collect();
        assert_eq!(targets, vec![b, c, c]);

        // Structural order lists inner before inner-entry
        let structural: Vec<_> = hsm.legal_structural(a).iter().map(|t| t.target).collect();
        assert_eq!(structural, vec![c, b]);
        assert_eq!(hsm.legal_siblings(a).len(), 1);
    }

    #[test]
    fn test_redirect_keeps_order() {
        let mut hsm = Hsm::new();
        let a = hsm.add_state("A", None).unwrap();
        let b = hsm.add_state("B", None).unwrap();
        let c = hsm.add_state("C", None).unwrap();
        let d = hsm.add_state("D", None).unwrap();
        let first = hsm.connect(a, b, TransitionKind::Inner);
        hsm.connect(a, c, TransitionKind::Inner);

        hsm.redirect(first, d).unwrap();
        let targets: Vec<_> = hsm.transitions(a).iter().map(|t| t.target).collect();
        assert_eq!(targets, vec![d, c]);
        assert_eq!(hsm.state(a).transition_count(), 2);
    }

    #[test]
    fn test_unique_names_are_per_graph() {
        let mut first = Hsm::new();
        let mut second = Hsm::new();
        assert_eq!(first.unique_name("SurrogateRoot"), "SurrogateRoot1");
        assert_eq!(first.unique_name("SurrogateRoot"), "SurrogateRoot2");
        assert_eq!(second.unique_name("SurrogateRoot"), "SurrogateRoot1");
    }

    #[test]
    fn test_unique_names_skip_existing_states() {
        let mut hsm = Hsm::new();
        hsm.add_state("Attack1", None).unwrap();
        assert_eq!(hsm.unique_name("Attack"), "Attack2");
    }
}
