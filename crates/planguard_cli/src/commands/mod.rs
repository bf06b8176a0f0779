//! CLI command definitions.
//!
//! This module defines the command structure for the planguard CLI.
//! Each subcommand maps to one driver operation or a full suite run.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;

use planguard_exec::{CliRunner, RunnerOptions};
use planguard_vars::VarMap;

pub mod plan;
pub mod run;
pub mod validate;

/// planguard - declarative plan verification for infrastructure modules
#[derive(Parser)]
#[command(name = "planguard")]
#[command(version, about = "planguard - declarative plan verification for infrastructure modules")]
#[command(long_about = r#"
planguard drives terraform/tofu through validate → init → plan against
isolated copies of your module directories and checks the resulting plans
for required resources, required literals, and forbidden configuration.

WORKFLOWS:
  validate  → Syntax/schema check of a module with a variable set
  plan      → Compute a plan and print its textual or structured rendering
  run       → Run a YAML scenario suite concurrently and report outcomes

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
  3 - Validation failure
  4 - Plan failure
  5 - Assertion failure
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a module configuration
    Validate(validate::ValidateArgs),

    /// Compute and inspect an execution plan
    Plan(plan::PlanArgs),

    /// Run a scenario suite
    Run(run::RunArgs),
}

/// Tool selection flags shared by every subcommand.
#[derive(Args)]
pub struct ToolArgs {
    /// Explicit tool binary path
    #[arg(long, env = "PLANGUARD_BIN")]
    pub binary: Option<PathBuf>,

    /// Prefer OpenTofu over Terraform
    #[arg(long)]
    pub tofu: bool,

    /// Log tool commands without executing them
    #[arg(long)]
    pub dry_run: bool,
}

/// Build the CLI runner from shared tool flags.
pub(crate) fn tool_runner(args: &ToolArgs) -> Result<Arc<CliRunner>> {
    let mut options = RunnerOptions::new();
    if args.tofu {
        options = options.prefer_tofu();
    }
    if args.dry_run {
        options = options.dry_run();
    }
    if let Some(binary) = &args.binary {
        options = options.binary(binary);
    }
    Ok(Arc::new(CliRunner::new(options)?))
}

/// Merge a var-file (tfvars JSON) with `key=value` overrides.
///
/// Override values parse as JSON where possible (`true`, `3`, `["a"]`) and
/// fall back to plain strings, matching how the tool treats -var flags.
pub(crate) fn collect_vars(pairs: &[String], var_file: Option<&Path>) -> Result<VarMap> {
    let mut vars = VarMap::new();

    if let Some(path) = var_file {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading var file {}", path.display()))?;
        let file_vars: VarMap = serde_json::from_str(&content)
            .with_context(|| format!("parsing var file {}", path.display()))?;
        vars = vars.merge(file_vars);
    }

    for pair in pairs {
        let (key, raw) = pair
            .split_once('=')
            .ok_or_else(|| anyhow!("--var takes key=value, got `{pair}`"))?;
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        vars.insert(key, value);
    }

    Ok(vars)
}
