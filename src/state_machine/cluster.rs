//! Visual grouping of states by name prefix.
//!
//! A state joins its structural parent's cluster when its name starts with
//! the parent's name (or the parent's cluster id), or when it is a proxy.
//! A parent whose name prefixes a child's name becomes a cluster id of its
//! own, and the cluster path of every state lists those ids outermost first.

use crate::state_machine::walk::AncestorStack;
use crate::state_machine::{Hsm, OutgoingTransition};
use petgraph::stable_graph::NodeIndex;
use std::collections::{HashMap, HashSet};

/// Sub-clusters and member states of one cluster.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterEntry {
    pub sub_clusters: Vec<String>,
    pub states: Vec<NodeIndex>,
}

/// Cluster tree of a finalized graph. The `None` key is the unnamed top
/// level holding every state with an empty cluster path.
#[derive(Debug, Clone, Default)]
pub struct ClusterMap {
    entries: HashMap<Option<String>, ClusterEntry>,
}

impl ClusterMap {
    pub fn build(hsm: &Hsm) -> Self {
        let mut entries: HashMap<Option<String>, ClusterEntry> = HashMap::new();
        entries.insert(None, ClusterEntry::default());

        for index in hsm.state_indices() {
            let path = &hsm.state(index).clusters;
            for (depth, id) in path.iter().enumerate() {
                let parent = depth.checked_sub(1).map(|up| path[up].clone());
                entries.entry(Some(id.clone())).or_default();
                let siblings = &mut entries.entry(parent).or_default().sub_clusters;
                if !siblings.contains(id) {
                    siblings.push(id.clone());
                }
            }
            entries
                .entry(path.last().cloned())
                .or_default()
                .states
                .push(index);
        }

        Self { entries }
    }

    pub fn top(&self) -> &ClusterEntry {
        static EMPTY: ClusterEntry = ClusterEntry {
            sub_clusters: Vec::new(),
            states: Vec::new(),
        };
        self.entries.get(&None).unwrap_or(&EMPTY)
    }

    pub fn get(&self, id: &str) -> Option<&ClusterEntry> {
        self.entries.get(&Some(id.to_string()))
    }

    /// Named clusters, parents before their sub-clusters.
    pub fn cluster_ids(&self) -> Vec<&str> {
        let mut ids = Vec::new();
        let mut pending: Vec<&str> = self
            .top()
            .sub_clusters
            .iter()
            .rev()
            .map(String::as_str)
            .collect();
        while let Some(id) = pending.pop() {
            ids.push(id);
            if let Some(entry) = self.get(id) {
                pending.extend(entry.sub_clusters.iter().rev().map(String::as_str));
            }
        }
        ids
    }

    /// Number of named clusters
    pub fn len(&self) -> usize {
        self.entries.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-progress visit of the cluster walk: structural edges first, then
/// siblings once the state is off the ancestor stack.
struct Visit {
    edges: Vec<OutgoingTransition>,
    structural: usize,
    cursor: usize,
    closed: bool,
}

impl Visit {
    fn new(hsm: &Hsm, state: NodeIndex) -> Self {
        let mut edges = hsm.legal_structural(state);
        let structural = edges.len();
        edges.extend(hsm.legal_siblings(state));
        Self {
            edges,
            structural,
            cursor: 0,
            closed: false,
        }
    }
}

impl Hsm {
    pub(crate) fn assign_clusters(&mut self) {
        for root in self.roots() {
            for (state, parent) in self.visit_once_depth_first(root) {
                if let Some(parent) = parent {
                    self.assign_cluster(state, parent);
                }
            }
        }
    }

    /// Every state reachable from `root`, each once, paired with the open
    /// structural ancestor it was reached under.
    fn visit_once_depth_first(&self, root: NodeIndex) -> Vec<(NodeIndex, Option<NodeIndex>)> {
        let mut order = vec![(root, None)];
        let mut visited = HashSet::from([root]);
        let mut ancestors = AncestorStack::new();
        ancestors.push(root);
        let mut visits = vec![Visit::new(self, root)];

        while let Some(visit) = visits.last_mut() {
            if !visit.closed && visit.cursor == visit.structural {
                visit.closed = true;
                ancestors.pop();
                continue;
            }
            let Some(transition) = visit.edges.get(visit.cursor).copied() else {
                visits.pop();
                continue;
            };
            visit.cursor += 1;

            let target = transition.target;
            if visited.insert(target) {
                order.push((target, ancestors.top()));
                ancestors.push(target);
                visits.push(Visit::new(self, target));
            }
        }
        order
    }

    fn assign_cluster(&mut self, state: NodeIndex, parent: NodeIndex) {
        let name = self.name_of(state).to_string();
        let parent_name = self.name_of(parent).to_string();
        let extends_parent = name.starts_with(&parent_name);

        let joins_parent = extends_parent
            || self.state(state).is_proxy
            || self
                .state(parent)
                .cluster
                .as_deref()
                .is_some_and(|cluster| name.starts_with(cluster));
        if joins_parent {
            let cluster = self
                .state_mut(parent)
                .cluster
                .get_or_insert_with(|| parent_name.clone())
                .clone();
            self.state_mut(state).cluster = Some(cluster);
        }

        let mut path: Vec<String> = self
            .state(parent)
            .clusters
            .iter()
            .filter(|id| name.starts_with(id.as_str()))
            .cloned()
            .collect();
        if extends_parent && !path.contains(&parent_name) {
            path.push(parent_name.clone());
            let parent_path = &mut self.state_mut(parent).clusters;
            if !parent_path.contains(&parent_name) {
                parent_path.push(parent_name);
            }
        }
        self.state_mut(state).clusters = path;
    }
}
