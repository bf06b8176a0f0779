//! Tool runner trait and types.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{RunConfig, ToolInvocation};
use crate::error::ExecResult;

/// Result of one tool invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Unique id for this invocation
    pub invocation_id: String,
    /// Exit code from the tool process
    pub exit_code: i64,
    /// Captured stdout
    pub stdout: String,
    /// Captured stderr
    pub stderr: String,
    /// Invocation start time
    pub started_at: DateTime<Utc>,
    /// Invocation end time
    pub finished_at: DateTime<Utc>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl ExecutionResult {
    /// Check if the invocation was successful (exit code 0).
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Get combined output (stdout + stderr).
    pub fn combined_output(&self) -> String {
        if self.stdout.is_empty() {
            self.stderr.clone()
        } else if self.stderr.is_empty() {
            self.stdout.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }
}

/// Tool runner trait.
///
/// The seam between the plan driver and the actual provisioning binary;
/// `CliRunner` implements it against a local terraform/tofu install and
/// `MockRunner` implements it with canned responses for tests.
#[async_trait]
pub trait ToolRunner: Send + Sync {
    /// Check if the tool binary is available.
    async fn is_available(&self) -> ExecResult<bool>;

    /// Get tool version information.
    async fn version(&self) -> ExecResult<String>;

    /// Run the tool with the given invocation.
    async fn run(
        &self,
        invocation: &ToolInvocation,
        run_config: &RunConfig,
    ) -> ExecResult<ExecutionResult>;
}
