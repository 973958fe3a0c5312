//! Configuration management
//!
//! This module handles loading and managing configuration from:
//! - Command-line arguments
//! - Configuration files (TOML)
//! - Defaults

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub render: RenderConfig,

    #[serde(default)]
    pub filter: FilterConfig,

    #[serde(default)]
    pub parser: ParserConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// DOT output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Lay the graph out left to right instead of top to bottom
    #[serde(default)]
    pub left_to_right: bool,

    /// Fill nodes with a per-cluster hue
    #[serde(default = "default_true")]
    pub use_color: bool,

    #[serde(default = "default_font")]
    pub font: String,

    /// Minimum space between two nodes of the same rank, in inches
    #[serde(default = "default_node_separation")]
    pub node_separation: f64,

    /// Append the rank to node labels
    #[serde(default = "default_true")]
    pub show_ranks: bool,

    #[serde(default)]
    pub dashes_for_underscores: bool,
}

/// Which states get printed. Entries are case-insensitive name substrings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FilterConfig {
    /// Empty means every state is allowed
    #[serde(default)]
    pub allow: Vec<String>,

    #[serde(default)]
    pub deny: Vec<String>,
}

/// Source scanning settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Marker on a state declaration line that makes the state reusable
    #[serde(default = "default_reusable_tag")]
    pub reusable_tag: String,

    /// Struct names that never open a state
    #[serde(default = "default_ignored_states")]
    pub ignored_states: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default value functions

fn default_true() -> bool {
    true
}

fn default_font() -> String {
    "Helvetica".to_string()
}

fn default_node_separation() -> f64 {
    0.4
}

fn default_reusable_tag() -> String {
    "@PLOTHSM_REUSABLE".to_string()
}

fn default_ignored_states() -> Vec<String> {
    vec!["Args".to_string()]
}

fn default_log_level() -> String {
    "warn".to_string()
}

// Default implementations

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            left_to_right: false,
            use_color: default_true(),
            font: default_font(),
            node_separation: default_node_separation(),
            show_ranks: default_true(),
            dashes_for_underscores: false,
        }
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            reusable_tag: default_reusable_tag(),
            ignored_states: default_ignored_states(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let contents = std::fs::read_to_string(&path)
            .map_err(|e| Error::config(format!("Failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| Error::config(format!("Failed to parse config file {:?}: {}", path, e)))?;

        Ok(config)
    }

    /// Load configuration from default locations
    ///
    /// Searches in order:
    /// 1. ./hsm-viz.toml
    /// 2. ~/.hsm-viz/config.toml
    /// 3. /etc/hsm-viz/config.toml
    pub fn load() -> Result<Self> {
        let mut paths = vec![PathBuf::from("hsm-viz.toml")];
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".hsm-viz").join("config.toml"));
        }
        paths.push(PathBuf::from("/etc/hsm-viz/config.toml"));

        for path in paths {
            if path.exists() {
                tracing::debug!("Loading config from {:?}", path);
                return Self::from_file(path);
            }
        }

        tracing::debug!("No config file found, using defaults");
        Ok(Config::default())
    }
}
