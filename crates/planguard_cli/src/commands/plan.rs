//! Plan command - compute and inspect an execution plan.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tracing::info;

use planguard_plan::{DriverOptions, PlanDriver};

use super::ToolArgs;

#[derive(Args)]
pub struct PlanArgs {
    /// Module directory to plan
    #[arg(short, long)]
    pub module: PathBuf,

    /// Variable overrides (key=value, JSON values accepted)
    #[arg(long = "var")]
    pub var: Vec<String>,

    /// tfvars JSON file to load
    #[arg(long)]
    pub var_file: Option<PathBuf>,

    /// Persist the textual plan report to this path
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Print the structured (address-indexed) plan as JSON
    #[arg(long)]
    pub json: bool,

    /// Expect the plan to fail; succeed only when it does
    #[arg(long)]
    pub expect_failure: bool,

    #[command(flatten)]
    pub tool: ToolArgs,
}

pub async fn execute(args: PlanArgs) -> Result<()> {
    info!("Planning module {}", args.module.display());

    let vars = super::collect_vars(&args.var, args.var_file.as_deref())?;
    let runner = super::tool_runner(&args.tool)?;

    let mut options = DriverOptions::new();
    if let Some(out) = &args.out {
        options = options.plan_artifact(out);
    }
    let driver = PlanDriver::with_options(runner, options);

    if args.expect_failure {
        let captured = driver.plan_expecting_failure(&args.module, &vars).await?;
        println!("✅ Plan failed as expected: {captured}");
        return Ok(());
    }

    if args.json {
        let plan = driver.plan_structured(&args.module, &vars).await?;
        let resources: Vec<_> = plan
            .resources()
            .map(|r| {
                serde_json::json!({
                    "address": r.address,
                    "type": r.resource_type,
                    "values": r.values,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&resources)?);
        return Ok(());
    }

    let result = driver.plan(&args.module, &vars).await?;
    println!("{}", result.text());
    if let Some(summary) = result.summary() {
        println!(
            "Summary: {} to add, {} to change, {} to destroy",
            summary.add, summary.change, summary.destroy
        );
    }
    if let Some(artifact) = result.artifact() {
        println!("Plan report written to {}", artifact.display());
    }
    Ok(())
}
