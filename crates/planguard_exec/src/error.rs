//! Error types for the execution layer.

use thiserror::Error;

/// Result type alias for execution operations.
pub type ExecResult<T> = Result<T, ExecError>;

/// Errors that can occur while driving the provisioning tool binary.
#[derive(Error, Debug)]
pub enum ExecError {
    #[error("Provisioning tool not available: {0}")]
    ToolNotAvailable(String),

    #[error("Tool execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Tool invocation timed out after {0} seconds")]
    Timeout(u64),

    #[error("Invalid invocation: {0}")]
    InvalidInvocation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
