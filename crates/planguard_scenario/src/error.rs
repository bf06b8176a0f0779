//! Error types for scenario tables and suites.

use thiserror::Error;

/// Result type alias for scenario operations.
pub type ScenarioResult<T> = Result<T, ScenarioError>;

/// Errors that can occur while building or loading scenario tables.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// Scenario names disambiguate failure reports; duplicates are rejected.
    #[error("Duplicate scenario name: {0}")]
    DuplicateName(String),

    #[error("Invalid scenario definition: {0}")]
    InvalidScenario(String),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
