//! Error types for graph construction, loading and infection.

use thiserror::Error;

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, InfectionError>;

#[derive(Debug, Error)]
pub enum InfectionError {
    /// A relationship weight that is not a positive integer.
    #[error("Weights must be positive integer values, got {0}")]
    InvalidWeight(i64),

    #[error("User '{0}' is not a member of the graph")]
    InvalidUser(String),

    /// Either endpoint is missing from the graph, or both are the same user.
    #[error("Cannot connect '{0}' and '{1}': both must be distinct members of the graph")]
    InvalidConnection(String, String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Graph has {size} users, fewer than the {requested} requested")]
    GraphTooSmall { size: usize, requested: usize },

    #[error("Not enough connections: reached {reached} of {requested} users")]
    InsufficientConnections { reached: usize, requested: usize },

    #[error("{kind} infection requires {parameter}")]
    MissingParameter {
        kind: &'static str,
        parameter: &'static str,
    },

    /// A malformed graph file record. `line` is 1-based.
    #[error("File format error on line {line}: {reason}")]
    LoadFormat { line: u64, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
