//! # planguard_exec
//!
//! Provisioning tool execution layer for planguard.
//!
//! This crate wraps invocation of the terraform/tofu binary, providing
//! detection, streamed output capture, timeouts, and a retry policy for
//! known-transient failures.
//!
//! # Features
//!
//! - **Tool Detection**: Auto-detect terraform vs tofu on PATH
//! - **Dry-Run Mode**: Log commands without executing
//! - **CI Integration**: Log formatting compatible with GitHub Actions
//! - **Retry Policy**: Regex signatures for transient registry/provider errors
//! - **Mock Runner**: For testing without a tool install
//!
//! # Example
//!
//! ```rust,no_run
//! use planguard_exec::{CliRunner, RunnerOptions, ToolRunner, ToolInvocation, RunConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Create a runner with auto-detection
//!     let runner = CliRunner::new(RunnerOptions::default())?;
//!
//!     // Validate a module directory
//!     let invocation = ToolInvocation::new("./modules/network").args(["validate", "-no-color"]);
//!     let result = runner.run(&invocation, &RunConfig::default()).await?;
//!     println!("Exit code: {}", result.exit_code);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod mock;
pub mod retry;
pub mod runner;

pub use cli::{CliRunner, LogHandler, LogLine, LogStream, RunnerOptions, ToolKind};
pub use config::{RunConfig, ToolInvocation};
pub use error::{ExecError, ExecResult};
pub use mock::{CapturedCall, MockResponse, MockRunner};
pub use retry::RetryPolicy;
pub use runner::{ExecutionResult, ToolRunner};
