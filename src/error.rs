//! This module defines all error types used throughout the application.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the application
#[derive(Error, Debug)]
pub enum Error {
    /// IO errors (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A source or configuration file could not be read
    #[error("Failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Output serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A state name was declared twice
    #[error("Duplicate state: {0}")]
    DuplicateState(String),

    /// A transition target resolves to no state, directly or through an alias
    #[error("State {state} references unknown state {target}")]
    UnknownStateReference { state: String, target: String },

    /// The base chain of a state loops back onto itself
    #[error("Cyclic inheritance detected at state {0}")]
    CyclicInheritance(String),

    /// Two roots can reach a common state, so the graph is not a forest
    #[error("Invalid topology: roots {first} and {second} can reach common states")]
    OverlappingRoots { first: String, second: String },

    /// Parent and child lists disagree about a link
    #[error("Inconsistent hierarchy between parent {parent} and child {child}")]
    InconsistentHierarchy { parent: String, child: String },

    /// Generic error with custom message
    #[error("{0}")]
    Custom(String),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a custom error with a message
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether the error came from validating the state machine itself,
    /// as opposed to the environment (files, config, output).
    pub fn is_topology_error(&self) -> bool {
        matches!(
            self,
            Error::DuplicateState(_)
                | Error::UnknownStateReference { .. }
                | Error::CyclicInheritance(_)
                | Error::OverlappingRoots { .. }
                | Error::InconsistentHierarchy { .. }
        )
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(format!("JSON error: {}", err))
    }
}

impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Self {
        Error::Custom(format!("Invalid source pattern: {}", err))
    }
}
