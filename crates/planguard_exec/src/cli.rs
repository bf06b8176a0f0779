//! CLI-based tool runner supporting Terraform and OpenTofu.
//!
//! This module provides an execution layer that works with both the
//! `terraform` and `tofu` binaries, with automatic detection and fallback.

use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::config::{RunConfig, ToolInvocation};
use crate::error::{ExecError, ExecResult};
use crate::runner::{ExecutionResult, ToolRunner};

/// Provisioning tool flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    Terraform,
    Tofu,
}

impl ToolKind {
    /// Get the CLI command name.
    pub fn command(&self) -> &'static str {
        match self {
            Self::Terraform => "terraform",
            Self::Tofu => "tofu",
        }
    }
}

impl std::fmt::Display for ToolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.command())
    }
}

/// Log output from tool execution.
#[derive(Debug, Clone)]
pub struct LogLine {
    pub timestamp: chrono::DateTime<Utc>,
    pub stream: LogStream,
    pub message: String,
}

/// Log stream type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStream {
    Stdout,
    Stderr,
}

impl std::fmt::Display for LogStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdout => write!(f, "stdout"),
            Self::Stderr => write!(f, "stderr"),
        }
    }
}

/// Log handler callback type.
pub type LogHandler = Arc<dyn Fn(LogLine) + Send + Sync>;

/// CLI runner options.
#[derive(Debug, Clone)]
pub struct RunnerOptions {
    /// Preferred tool (if not set, auto-detect)
    pub preferred_tool: Option<ToolKind>,
    /// Explicit binary path, bypassing PATH lookup and detection
    pub binary_path: Option<PathBuf>,
    /// Dry-run mode (print commands without executing)
    pub dry_run: bool,
    /// CI mode (format logs for CI systems)
    pub ci_mode: bool,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            preferred_tool: None,
            binary_path: None,
            dry_run: false,
            ci_mode: std::env::var("CI").is_ok(),
        }
    }
}

impl RunnerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    pub fn ci_mode(mut self) -> Self {
        self.ci_mode = true;
        self
    }

    pub fn prefer_terraform(mut self) -> Self {
        self.preferred_tool = Some(ToolKind::Terraform);
        self
    }

    pub fn prefer_tofu(mut self) -> Self {
        self.preferred_tool = Some(ToolKind::Tofu);
        self
    }

    pub fn binary(mut self, path: impl Into<PathBuf>) -> Self {
        self.binary_path = Some(path.into());
        self
    }
}

/// CLI-based tool runner.
///
/// Executes terraform or tofu through the local binary, supporting both
/// tools with automatic detection.
pub struct CliRunner {
    tool: ToolKind,
    options: RunnerOptions,
    log_handler: Option<LogHandler>,
}

impl CliRunner {
    /// Create a new CLI runner with automatic tool detection.
    pub fn new(options: RunnerOptions) -> ExecResult<Self> {
        let tool = Self::detect_tool(&options)?;
        info!("Using provisioning tool: {}", tool);

        Ok(Self {
            tool,
            options,
            log_handler: None,
        })
    }

    /// Create a runner with a specific tool.
    pub fn with_tool(tool: ToolKind, options: RunnerOptions) -> Self {
        Self {
            tool,
            options,
            log_handler: None,
        }
    }

    /// Set a log handler for streaming tool output.
    pub fn with_log_handler(mut self, handler: LogHandler) -> Self {
        self.log_handler = Some(handler);
        self
    }

    /// Detect an available tool binary.
    pub fn detect_tool(options: &RunnerOptions) -> ExecResult<ToolKind> {
        // An explicit binary path is taken at face value
        if options.binary_path.is_some() {
            return Ok(options.preferred_tool.unwrap_or(ToolKind::Terraform));
        }

        if let Some(preferred) = options.preferred_tool {
            if Self::is_tool_available(preferred) {
                return Ok(preferred);
            }
            warn!(
                "Preferred tool {} not available, trying alternatives",
                preferred
            );
        }

        if Self::is_tool_available(ToolKind::Terraform) {
            return Ok(ToolKind::Terraform);
        }

        if Self::is_tool_available(ToolKind::Tofu) {
            return Ok(ToolKind::Tofu);
        }

        Err(ExecError::ToolNotAvailable(
            "Neither terraform nor tofu is available".to_string(),
        ))
    }

    /// Check if a tool binary is on PATH.
    fn is_tool_available(tool: ToolKind) -> bool {
        Command::new(tool.command())
            .arg("version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Get the current tool.
    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    /// Check if dry-run mode is enabled.
    pub fn is_dry_run(&self) -> bool {
        self.options.dry_run
    }

    fn binary(&self) -> String {
        self.options
            .binary_path
            .as_ref()
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_else(|| self.tool.command().to_string())
    }

    /// Format an invocation for logging.
    fn format_command(&self, invocation: &ToolInvocation) -> String {
        let mut cmd = self.binary();
        for arg in &invocation.args {
            if arg.contains(' ') || arg.contains('=') {
                cmd.push_str(&format!(" '{}'", arg));
            } else {
                cmd.push_str(&format!(" {}", arg));
            }
        }
        cmd
    }

    /// Execute an invocation and capture output with streaming.
    fn execute_with_streaming(
        &self,
        invocation: &ToolInvocation,
        run_config: &RunConfig,
    ) -> ExecResult<(i64, String, String)> {
        let mut cmd = Command::new(self.binary());
        cmd.args(&invocation.args);
        cmd.current_dir(&invocation.working_dir);
        cmd.envs(&invocation.env);
        // Keeps the tool from prompting and from printing upgrade notices
        cmd.env("TF_IN_AUTOMATION", "1");
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        debug!("Executing: {}", self.format_command(invocation));

        let mut child = cmd.spawn().map_err(|e| {
            ExecError::ExecutionFailed(format!("Failed to spawn {}: {}", self.tool, e))
        })?;

        let stdout = child.stdout.take().unwrap();
        let stderr = child.stderr.take().unwrap();

        let stdout_handle = std::thread::spawn({
            let stream_logs = run_config.stream_logs;
            let ci_mode = self.options.ci_mode;
            let log_handler = self.log_handler.clone();
            move || {
                let reader = BufReader::new(stdout);
                let mut output = String::new();
                for line in reader.lines() {
                    if let Ok(line) = line {
                        output.push_str(&line);
                        output.push('\n');
                        if stream_logs {
                            let log_line = LogLine {
                                timestamp: Utc::now(),
                                stream: LogStream::Stdout,
                                message: line.clone(),
                            };
                            if ci_mode {
                                println!(
                                    "[{}] [stdout] {}",
                                    log_line.timestamp.format("%Y-%m-%dT%H:%M:%S%.3fZ"),
                                    line
                                );
                            } else {
                                println!("{}", line);
                            }
                            if let Some(handler) = &log_handler {
                                handler(log_line);
                            }
                        }
                    }
                }
                output
            }
        });

        let stderr_handle = std::thread::spawn({
            let stream_logs = run_config.stream_logs;
            let ci_mode = self.options.ci_mode;
            let log_handler = self.log_handler.clone();
            move || {
                let reader = BufReader::new(stderr);
                let mut output = String::new();
                for line in reader.lines() {
                    if let Ok(line) = line {
                        output.push_str(&line);
                        output.push('\n');
                        if stream_logs {
                            let log_line = LogLine {
                                timestamp: Utc::now(),
                                stream: LogStream::Stderr,
                                message: line.clone(),
                            };
                            if ci_mode {
                                println!(
                                    "[{}] [stderr] {}",
                                    log_line.timestamp.format("%Y-%m-%dT%H:%M:%S%.3fZ"),
                                    line
                                );
                            } else {
                                eprintln!("{}", line);
                            }
                            if let Some(handler) = &log_handler {
                                handler(log_line);
                            }
                        }
                    }
                }
                output
            }
        });

        // Wait for completion with timeout
        let status = if run_config.timeout_seconds > 0 {
            let timeout = std::time::Duration::from_secs(run_config.timeout_seconds);
            let start = Instant::now();
            loop {
                match child.try_wait() {
                    Ok(Some(status)) => break status,
                    Ok(None) => {
                        if start.elapsed() > timeout {
                            let _ = child.kill();
                            return Err(ExecError::Timeout(run_config.timeout_seconds));
                        }
                        std::thread::sleep(std::time::Duration::from_millis(100));
                    }
                    Err(e) => {
                        return Err(ExecError::ExecutionFailed(format!(
                            "Failed to wait for process: {}",
                            e
                        )));
                    }
                }
            }
        } else {
            child.wait().map_err(|e| {
                ExecError::ExecutionFailed(format!("Failed to wait for process: {}", e))
            })?
        };

        let stdout_output = stdout_handle.join().unwrap_or_default();
        let stderr_output = stderr_handle.join().unwrap_or_default();

        let exit_code = status.code().unwrap_or(-1) as i64;

        Ok((exit_code, stdout_output, stderr_output))
    }
}

#[async_trait]
impl ToolRunner for CliRunner {
    async fn is_available(&self) -> ExecResult<bool> {
        Ok(Self::is_tool_available(self.tool))
    }

    async fn version(&self) -> ExecResult<String> {
        let output = Command::new(self.binary())
            .arg("version")
            .output()
            .map_err(|e| ExecError::ExecutionFailed(e.to_string()))?;

        if output.status.success() {
            let stdout = String::from_utf8_lossy(&output.stdout);
            Ok(stdout.lines().next().unwrap_or_default().to_string())
        } else {
            Err(ExecError::ExecutionFailed(
                String::from_utf8_lossy(&output.stderr).to_string(),
            ))
        }
    }

    async fn run(
        &self,
        invocation: &ToolInvocation,
        run_config: &RunConfig,
    ) -> ExecResult<ExecutionResult> {
        let cmd_str = self.format_command(invocation);

        info!(
            "Running {} {} in {:?}",
            self.tool,
            invocation.subcommand().unwrap_or("<none>"),
            invocation.working_dir
        );
        debug!("Command: {}", cmd_str);

        if self.options.dry_run {
            info!("[DRY-RUN] Would execute: {}", cmd_str);
            return Ok(ExecutionResult {
                invocation_id: "dry-run".to_string(),
                exit_code: 0,
                stdout: format!("[DRY-RUN] Command: {}", cmd_str),
                stderr: String::new(),
                started_at: Utc::now(),
                finished_at: Utc::now(),
                duration_ms: 0,
            });
        }

        if !invocation.working_dir.is_dir() {
            return Err(ExecError::InvalidInvocation(format!(
                "Working directory does not exist: {}",
                invocation.working_dir.display()
            )));
        }

        let started_at = Utc::now();
        let (exit_code, stdout, stderr) = self.execute_with_streaming(invocation, run_config)?;
        let finished_at = Utc::now();
        let duration_ms = (finished_at - started_at).num_milliseconds() as u64;

        if exit_code == 0 {
            info!(
                "{} {} completed in {}ms",
                self.tool,
                invocation.subcommand().unwrap_or("<none>"),
                duration_ms
            );
        } else {
            error!(
                "{} {} failed with exit code {} after {}ms",
                self.tool,
                invocation.subcommand().unwrap_or("<none>"),
                exit_code,
                duration_ms
            );
        }

        Ok(ExecutionResult {
            invocation_id: format!("{}-{}", self.tool, uuid::Uuid::new_v4()),
            exit_code,
            stdout,
            stderr,
            started_at,
            finished_at,
            duration_ms,
        })
    }
}
