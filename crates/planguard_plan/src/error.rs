//! Error taxonomy for plan driving.
//!
//! Each variant maps to one phase of the scenario state machine, so the
//! runner can tell a malformed module (`Validation`) from a dependency
//! resolution failure (`Init`) from a constraint rejection (`Plan`).

use thiserror::Error;

/// Result type alias for driver operations.
pub type DriverResult<T> = Result<T, DriverError>;

/// Errors that can occur while driving the provisioning tool.
#[derive(Error, Debug)]
pub enum DriverError {
    /// Malformed module configuration. Fatal, never retried.
    #[error("Module validation failed: {0}")]
    Validation(String),

    /// Dependency or provider resolution failure. Retried for
    /// known-transient signatures, otherwise fatal.
    #[error("Initialization failed: {0}")]
    Init(String),

    /// Constraint violation or provider-side rejection. Fatal for
    /// success-path scenarios, expected for failure-path scenarios.
    #[error("Plan failed: {0}")]
    Plan(String),

    /// A failure-path scenario planned cleanly.
    #[error("Plan unexpectedly succeeded for a failure-path scenario")]
    UnexpectedSuccess,

    #[error("Destroy failed: {0}")]
    Destroy(String),

    #[error("Malformed structured plan: {0}")]
    MalformedPlan(String),

    #[error("Workspace staging failed: {0}")]
    Workspace(String),

    #[error(transparent)]
    Vars(#[from] planguard_vars::VarsError),

    #[error(transparent)]
    Exec(#[from] planguard_exec::ExecError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DriverError {
    /// Whether this error is a plan-phase outcome a failure-path scenario
    /// may legitimately expect.
    pub fn is_expected_failure(&self) -> bool {
        matches!(
            self,
            DriverError::Validation(_) | DriverError::Init(_) | DriverError::Plan(_)
        )
    }
}
