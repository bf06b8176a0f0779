//! Error types for variable construction.

use thiserror::Error;

/// Result type alias for variable operations.
pub type VarsResult<T> = Result<T, VarsError>;

/// Errors that can occur while building or rendering variable maps.
#[derive(Error, Debug)]
pub enum VarsError {
    #[error("Missing required variable: {0}")]
    MissingField(&'static str),

    #[error("Invalid CIDR block for {field}: {value}")]
    InvalidCidr { field: &'static str, value: String },

    #[error("Invalid replica bounds: min_replicas {min} exceeds max_replicas {max}")]
    InvalidReplicaBounds { min: u32, max: u32 },

    #[error("Public access principal not allowed: {0}")]
    PublicPrincipal(String),

    #[error("Invalid variable shape: {0}")]
    InvalidShape(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
