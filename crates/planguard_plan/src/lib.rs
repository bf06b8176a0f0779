//! # planguard_plan
//!
//! Plan driver and assertion layer for planguard.
//!
//! The driver stages an isolated workspace copy of a module directory,
//! writes the scenario's variables into it, and runs the provisioning tool
//! through validate → init → plan (→ show → destroy). Assertions then match
//! required and forbidden literals against the textual plan rendering, or
//! planned attribute values against the structured representation.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! use planguard_exec::{CliRunner, RunnerOptions};
//! use planguard_plan::{assert_contains, PlanDriver};
//! use planguard_vars::{CloudSqlVars, DatabaseEngine, ModuleConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let runner = Arc::new(CliRunner::new(RunnerOptions::default())?);
//!     let driver = PlanDriver::new(runner);
//!
//!     let vars = CloudSqlVars::new(
//!         "test-project", "europe-west1", "test", "postgres-test",
//!         DatabaseEngine::PostgreSql,
//!     )
//!     .version("POSTGRES_15")
//!     .to_vars()?;
//!
//!     let result = driver.plan(Path::new("modules/cloudsql"), &vars).await?;
//!     assert_contains(&result, "google_sql_database_instance")?;
//!     assert_contains(&result, "POSTGRES_15")?;
//!     Ok(())
//! }
//! ```

pub mod assert;
pub mod driver;
pub mod error;
pub mod result;
pub mod structured;
pub mod workspace;

pub use assert::{
    assert_attribute, assert_attribute_absent, assert_contains, assert_not_contains,
    assert_resource_present, AssertResult, AssertionError,
};
pub use driver::{DriverOptions, PlanDriver};
pub use error::{DriverError, DriverResult};
pub use result::{excerpt, PlanResult, PlanSummary, EXCERPT_LIMIT};
pub use structured::{PlannedResource, StructuredPlan};
pub use workspace::{ModuleWorkspace, PLAN_FILE};
