//! Mock tool runner for testing.
//!
//! Provides a configurable mock implementation of the ToolRunner trait
//! for use in tests without requiring an actual terraform/tofu install.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use crate::config::{RunConfig, ToolInvocation};
use crate::error::{ExecError, ExecResult};
use crate::runner::{ExecutionResult, ToolRunner};

/// Predefined mock response for a tool invocation.
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub exit_code: i64,
    pub stdout: String,
    pub stderr: String,
    pub duration_ms: u64,
}

impl MockResponse {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            stdout: stdout.into(),
            stderr: String::new(),
            duration_ms: 100,
        }
    }

    pub fn failure(exit_code: i64, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: String::new(),
            stderr: stderr.into(),
            duration_ms: 100,
        }
    }

    pub fn with_duration(mut self, ms: u64) -> Self {
        self.duration_ms = ms;
        self
    }
}

/// Captured invocation for verification.
#[derive(Debug, Clone)]
pub struct CapturedCall {
    pub subcommand: Option<String>,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
    pub env: HashMap<String, String>,
}

/// Mock tool runner for testing.
///
/// Captures every invocation and returns predefined responses, letting
/// tests verify driver behavior without running the real binary. Responses
/// can be keyed by subcommand (`on("plan", ...)`) or queued sequentially.
#[derive(Clone)]
pub struct MockRunner {
    /// Whether the runner should report as available.
    available: Arc<RwLock<bool>>,
    /// Version string to return.
    version: Arc<RwLock<String>>,
    /// Responses keyed by subcommand; takes precedence over the queue.
    keyed_responses: Arc<RwLock<HashMap<String, Vec<MockResponse>>>>,
    /// Per-subcommand index of the next keyed response to return.
    keyed_index: Arc<RwLock<HashMap<String, usize>>>,
    /// Sequential responses for invocations with no keyed response.
    responses: Arc<RwLock<Vec<MockResponse>>>,
    /// Index of next sequential response to return.
    response_index: Arc<AtomicUsize>,
    /// Captured invocations for verification.
    captured_calls: Arc<RwLock<Vec<CapturedCall>>>,
    /// Simulated transport-level failure message.
    simulate_failure: Arc<RwLock<Option<String>>>,
}

impl Default for MockRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRunner {
    /// Create a new mock runner.
    pub fn new() -> Self {
        Self {
            available: Arc::new(RwLock::new(true)),
            version: Arc::new(RwLock::new("Terraform v1.6.6 (mock)".to_string())),
            keyed_responses: Arc::new(RwLock::new(HashMap::new())),
            keyed_index: Arc::new(RwLock::new(HashMap::new())),
            responses: Arc::new(RwLock::new(Vec::new())),
            response_index: Arc::new(AtomicUsize::new(0)),
            captured_calls: Arc::new(RwLock::new(Vec::new())),
            simulate_failure: Arc::new(RwLock::new(None)),
        }
    }

    /// Set whether the runner is available.
    pub fn set_available(self, available: bool) -> Self {
        *self.available.write() = available;
        self
    }

    /// Set the version string.
    pub fn set_version(self, version: impl Into<String>) -> Self {
        *self.version.write() = version.into();
        self
    }

    /// Register a response for a subcommand. Multiple registrations for the
    /// same subcommand are consumed in order, the last one repeating.
    pub fn on(self, subcommand: impl Into<String>, response: MockResponse) -> Self {
        self.keyed_responses
            .write()
            .entry(subcommand.into())
            .or_default()
            .push(response);
        self
    }

    /// Queue a sequential response for the next unkeyed invocation.
    pub fn add_response(self, response: MockResponse) -> Self {
        self.responses.write().push(response);
        self
    }

    /// Set a transport-level failure to simulate.
    pub fn simulate_failure(self, message: impl Into<String>) -> Self {
        *self.simulate_failure.write() = Some(message.into());
        self
    }

    /// Clear all captured invocations.
    pub fn clear_calls(&self) {
        self.captured_calls.write().clear();
    }

    /// Get all captured invocations.
    pub fn get_calls(&self) -> Vec<CapturedCall> {
        self.captured_calls.read().clone()
    }

    /// Get the number of invocations made.
    pub fn call_count(&self) -> usize {
        self.captured_calls.read().len()
    }

    /// Check if a specific subcommand was invoked.
    pub fn was_called(&self, subcommand: &str) -> bool {
        self.captured_calls
            .read()
            .iter()
            .any(|c| c.subcommand.as_deref() == Some(subcommand))
    }

    /// Get invocations of a specific subcommand.
    pub fn get_subcommand_calls(&self, subcommand: &str) -> Vec<CapturedCall> {
        self.captured_calls
            .read()
            .iter()
            .filter(|c| c.subcommand.as_deref() == Some(subcommand))
            .cloned()
            .collect()
    }

    fn record_call(&self, invocation: &ToolInvocation) {
        self.captured_calls.write().push(CapturedCall {
            subcommand: invocation.subcommand().map(str::to_string),
            args: invocation.args.clone(),
            working_dir: invocation.working_dir.clone(),
            env: invocation.env.clone(),
        });
    }

    fn next_response(&self, subcommand: Option<&str>) -> MockResponse {
        if let Some(sub) = subcommand {
            let keyed = self.keyed_responses.read();
            if let Some(queue) = keyed.get(sub) {
                let mut index = self.keyed_index.write();
                let i = index.entry(sub.to_string()).or_insert(0);
                let response = queue.get(*i).or_else(|| queue.last()).cloned();
                if let Some(response) = response {
                    *i += 1;
                    return response;
                }
            }
        }

        let responses = self.responses.read();
        if responses.is_empty() {
            return MockResponse::success("");
        }
        let index = self.response_index.fetch_add(1, Ordering::SeqCst);
        responses
            .get(index % responses.len())
            .cloned()
            .unwrap_or_else(|| MockResponse::success(""))
    }

    fn check_failure(&self) -> ExecResult<()> {
        if let Some(msg) = self.simulate_failure.read().clone() {
            return Err(ExecError::ExecutionFailed(msg));
        }
        Ok(())
    }
}

#[async_trait]
impl ToolRunner for MockRunner {
    async fn is_available(&self) -> ExecResult<bool> {
        Ok(*self.available.read())
    }

    async fn version(&self) -> ExecResult<String> {
        self.check_failure()?;
        Ok(self.version.read().clone())
    }

    async fn run(
        &self,
        invocation: &ToolInvocation,
        _run_config: &RunConfig,
    ) -> ExecResult<ExecutionResult> {
        self.record_call(invocation);
        self.check_failure()?;

        let response = self.next_response(invocation.subcommand());
        let started_at = Utc::now();
        let finished_at = started_at + chrono::Duration::milliseconds(response.duration_ms as i64);

        Ok(ExecutionResult {
            invocation_id: format!("mock-{}", uuid::Uuid::new_v4()),
            exit_code: response.exit_code,
            stdout: response.stdout,
            stderr: response.stderr,
            started_at,
            finished_at,
            duration_ms: response.duration_ms,
        })
    }
}
