//! Hierarchical State Machine Visualizer
//!
//! Turns C++ hierarchical state machine sources into a validated, ranked and
//! clustered graph, and renders it as a Graphviz diagram.
//!
//! This library provides functionality for:
//! - Scanning state, transition and alias declarations out of source text
//! - Resolving references and inheritance, and checking the graph is a forest
//! - Ranking states, disabling illegal cycle edges and splitting reusable states
//! - Deriving the parent/child hierarchy and name-based visual clusters
//! - Rendering DOT, JSON and table output

pub mod cli;
pub mod config;
pub mod error;
pub mod parser;
pub mod render;
pub mod state_machine;

pub use config::Config;
pub use error::{Error, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Initialize logging with the given log level
///
/// Logs go to stderr; stdout is reserved for the rendered output.
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
