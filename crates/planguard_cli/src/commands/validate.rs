//! Validate command - syntax/schema check of a module.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tracing::info;

use planguard_plan::PlanDriver;

use super::ToolArgs;

#[derive(Args)]
pub struct ValidateArgs {
    /// Module directory to validate
    #[arg(short, long)]
    pub module: PathBuf,

    /// Variable overrides (key=value, JSON values accepted)
    #[arg(long = "var")]
    pub var: Vec<String>,

    /// tfvars JSON file to load
    #[arg(long)]
    pub var_file: Option<PathBuf>,

    #[command(flatten)]
    pub tool: ToolArgs,
}

pub async fn execute(args: ValidateArgs) -> Result<()> {
    info!("Validating module {}", args.module.display());

    let vars = super::collect_vars(&args.var, args.var_file.as_deref())?;
    let runner = super::tool_runner(&args.tool)?;
    let driver = PlanDriver::new(runner);

    driver.validate_only(&args.module, &vars).await?;

    println!("✅ Module configuration is valid");
    Ok(())
}
