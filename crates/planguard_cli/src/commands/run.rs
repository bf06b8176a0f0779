//! Run command - execute a scenario suite.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use tracing::info;

use planguard_plan::PlanDriver;
use planguard_scenario::{ScenarioRunner, Suite};

use super::ToolArgs;

#[derive(Args)]
pub struct RunArgs {
    /// Scenario suite file (YAML)
    #[arg(short, long)]
    pub suite: PathBuf,

    #[command(flatten)]
    pub tool: ToolArgs,
}

pub async fn execute(args: RunArgs) -> Result<()> {
    let suite = Suite::from_path(&args.suite)?;
    if let Some(name) = &suite.name {
        info!("Running suite {}", name);
    }

    let table = suite.into_table()?;
    info!("Executing {} scenarios", table.len());

    let runner = super::tool_runner(&args.tool)?;
    let driver = Arc::new(PlanDriver::new(runner));
    let report = ScenarioRunner::new(driver).run_table(table).await;

    println!("{}", report.render());

    if report.passed() {
        println!("✅ All scenarios passed");
        Ok(())
    } else {
        anyhow::bail!(
            "assertion failures in {} of {} scenarios",
            report.failures().count(),
            report.len()
        )
    }
}
