//! Graphviz DOT output
//!
//! Nodes are grouped into nested `cluster_` subgraphs following the
//! [`ClusterMap`], and inside each cluster into `rank = same` blocks.
//! Parent/child links are drawn as invisible heavy edges so children end up
//! below their parent.

use super::RenderOptions;
use crate::state_machine::{ClusterMap, Hsm, State};
use petgraph::stable_graph::NodeIndex;

const MIN_BRIGHTNESS: f64 = 0.3;
const MAX_BRIGHTNESS: f64 = 0.85;
const SATURATION: f64 = 0.5;

pub struct DotRenderer<'a> {
    hsm: &'a Hsm,
    options: &'a RenderOptions,
    clusters: ClusterMap,
    max_rank: u32,
}

impl<'a> DotRenderer<'a> {
    pub fn new(hsm: &'a Hsm, options: &'a RenderOptions) -> Self {
        Self {
            hsm,
            options,
            clusters: ClusterMap::build(hsm),
            max_rank: hsm.max_rank().unwrap_or(0),
        }
    }

    pub fn render(&self) -> String {
        let mut dot = "digraph G {\n".to_string();
        if self.options.left_to_right {
            dot.push_str("  rankdir=LR;\n");
        }
        dot.push_str(&format!("  nodesep={};\n", self.options.node_separation));
        dot.push_str(&format!("  fontname={};\n", self.options.font));

        self.push_cluster(&mut dot, None, 0);
        dot.push('\n');
        self.push_edges(&mut dot);

        dot.push_str("}\n");
        dot
    }

    fn push_cluster(&self, dot: &mut String, id: Option<&str>, depth: usize) {
        let entry = match id {
            Some(id) => self.clusters.get(id),
            None => Some(self.clusters.top()),
        };
        let Some(entry) = entry else {
            return;
        };
        let indent = "  ".repeat(depth);

        if let Some(id) = id {
            dot.push_str(&format!("{}subgraph cluster_{}\n", indent, id));
            dot.push_str(&format!("{}{{\n", indent));
            dot.push_str(&format!("{}  label=\"{}\";\n", indent, id));
            dot.push_str(&format!("{}  labeljust=left;\n", indent));
        }

        for sub_cluster in &entry.sub_clusters {
            self.push_cluster(dot, Some(sub_cluster.as_str()), depth + 1);
        }

        let printable: Vec<&State> = entry
            .states
            .iter()
            .map(|&index| self.hsm.state(index))
            .filter(|state| self.options.is_printable(state))
            .collect();

        for rank in 0..=self.max_rank {
            let same_rank: Vec<&&State> = printable
                .iter()
                .filter(|state| state.rank == Some(rank))
                .collect();
            if same_rank.is_empty() {
                continue;
            }
            dot.push_str(&format!("{}  {{\n{}    rank = same;\n", indent, indent));
            for state in same_rank {
                dot.push_str(&format!(
                    "{}    {} [{}];\n",
                    indent,
                    state.name,
                    self.node_attributes(state)
                ));
            }
            dot.push_str(&format!("{}  }}\n", indent));
        }
        for state in printable.iter().filter(|state| state.rank.is_none()) {
            dot.push_str(&format!(
                "{}  {} [{}];\n",
                indent,
                state.name,
                self.node_attributes(state)
            ));
        }

        if id.is_some() {
            dot.push_str(&format!("{}}}\n", indent));
        }
    }

    fn node_attributes(&self, state: &State) -> String {
        let mut label = if self.options.show_ranks {
            state.display_short()
        } else {
            state.display_name.clone()
        };
        if self.options.dashes_for_underscores {
            label = label.replace('_', "-");
        }

        let mut attributes = format!("label=\"{}\"", label);
        if state.is_proxy {
            attributes.push_str(",shape=parallelogram");
        }
        if self.options.use_color {
            let (hue, saturation, brightness) = self.node_color(state);
            attributes.push_str(&format!(
                ",style=filled, color=\"{:.3} {:.3} {:.3}\"",
                hue, saturation, brightness
            ));
            attributes.push_str(",fontcolor=white");
        }
        attributes.push_str(&format!(",fontname={}", self.options.font));
        attributes
    }

    /// HSV color: one hue per cluster path, brighter with depth.
    fn node_color(&self, state: &State) -> (f64, f64, f64) {
        let hue = cluster_hue(&state.clusters.concat());
        let ratio = match (state.rank, self.max_rank) {
            (Some(rank), max) if max > 0 => f64::from(rank) / f64::from(max),
            _ => 0.0,
        };
        let brightness = MIN_BRIGHTNESS + ratio * (MAX_BRIGHTNESS - MIN_BRIGHTNESS);
        (hue, SATURATION, brightness)
    }

    fn push_edges(&self, dot: &mut String) {
        for source in self.hsm.state_indices() {
            for transition in self.hsm.transitions(source) {
                if !self.prints_edge(source, transition.target) {
                    continue;
                }
                let parent_count = self.hsm.state(transition.target).parents.len();
                dot.push_str(&format!(
                    "  {} -> {} {};\n",
                    self.hsm.name_of(source),
                    self.hsm.name_of(transition.target),
                    self.hsm.transition(transition.edge).dot_attributes(parent_count)
                ));
            }
            for &child in &self.hsm.state(source).children {
                if !self.prints_edge(source, child) {
                    continue;
                }
                let weight = if self.hsm.state(child).parents.len() == 1 {
                    300
                } else {
                    1
                };
                dot.push_str(&format!(
                    "  {} -> {} [weight={},penwidth=0.0,arrowhead=none];\n",
                    self.hsm.name_of(source),
                    self.hsm.name_of(child),
                    weight
                ));
            }
        }
    }

    fn prints_edge(&self, source: NodeIndex, target: NodeIndex) -> bool {
        self.options.is_printable(self.hsm.state(source))
            && self.options.is_printable(self.hsm.state(target))
    }
}

/// Hue in [0, 1] derived from a Blake2b digest of the cluster path
fn cluster_hue(path: &str) -> f64 {
    use blake2::digest::consts::U8;
    use blake2::{Blake2b, Digest};

    let mut hasher = Blake2b::<U8>::new();
    hasher.update(path.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hasher.finalize());
    u64::from_be_bytes(bytes) as f64 / u64::MAX as f64
}

/// Render `hsm` as a DOT digraph
pub fn render_dot(hsm: &Hsm, options: &RenderOptions) -> String {
    DotRenderer::new(hsm, options).render()
}
