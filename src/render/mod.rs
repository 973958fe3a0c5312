//! Render module - Turn a finalized graph into a diagram description

use crate::config::{Config, FilterConfig};
use crate::state_machine::State;

pub mod dot;

// Re-export key types
pub use dot::DotRenderer;

/// Case-insensitive allow/deny list on state names.
///
/// A state is allowed when no deny entry occurs in its name and, if the
/// allow list is not empty, at least one allow entry does.
#[derive(Debug, Clone, Default)]
pub struct NameFilter {
    allow: Vec<String>,
    deny: Vec<String>,
}

impl NameFilter {
    pub fn new(allow: &[String], deny: &[String]) -> Self {
        let lower = |entries: &[String]| -> Vec<String> {
            entries.iter().map(|e| e.to_lowercase()).collect()
        };
        Self {
            allow: lower(allow),
            deny: lower(deny),
        }
    }

    pub fn allows(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        if self.deny.iter().any(|entry| name.contains(entry.as_str())) {
            return false;
        }
        self.allow.is_empty() || self.allow.iter().any(|entry| name.contains(entry.as_str()))
    }
}

impl From<&FilterConfig> for NameFilter {
    fn from(config: &FilterConfig) -> Self {
        Self::new(&config.allow, &config.deny)
    }
}

/// Everything the renderers need to know besides the graph
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub left_to_right: bool,
    pub use_color: bool,
    pub font: String,
    pub node_separation: f64,
    pub show_ranks: bool,
    pub dashes_for_underscores: bool,
    pub filter: NameFilter,
}

impl RenderOptions {
    pub fn from_config(config: &Config) -> Self {
        let render = &config.render;
        Self {
            left_to_right: render.left_to_right,
            use_color: render.use_color,
            font: render.font.clone(),
            node_separation: render.node_separation,
            show_ranks: render.show_ranks,
            dashes_for_underscores: render.dashes_for_underscores,
            filter: NameFilter::from(&config.filter),
        }
    }

    /// Visible and accepted by the name filter
    pub fn is_printable(&self, state: &State) -> bool {
        state.is_visible() && self.filter.allows(&state.name)
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}
