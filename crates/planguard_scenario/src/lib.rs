//! # planguard_scenario
//!
//! Scenario tables and the concurrent table runner for planguard.
//!
//! A scenario bundles a module directory, a variable map, an expected
//! outcome, and a set of assertions. Tables enforce unique scenario names
//! and run their scenarios as independent concurrent tasks; the aggregate
//! report passes only if every scenario passed.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use planguard_exec::{CliRunner, RunnerOptions};
//! use planguard_plan::PlanDriver;
//! use planguard_scenario::{Scenario, ScenarioRunner, ScenarioTable};
//! use planguard_vars::VarMap;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let runner = Arc::new(CliRunner::new(RunnerOptions::default())?);
//!     let driver = Arc::new(PlanDriver::new(runner));
//!
//!     let mut table = ScenarioTable::new();
//!     table.push(
//!         Scenario::new("cloudsql_postgres", "modules/cloudsql")
//!             .vars(VarMap::new().set("database_version", "POSTGRES_15"))
//!             .assert_resource("google_sql_database_instance")
//!             .assert_contains("POSTGRES_15"),
//!     )?;
//!
//!     let report = ScenarioRunner::new(driver).run_table(table).await;
//!     println!("{}", report.render());
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod runner;
pub mod scenario;
pub mod table;

pub use error::{ScenarioError, ScenarioResult};
pub use runner::{ScenarioOutcome, ScenarioRunner, ScenarioState, TableReport};
pub use scenario::{Assertion, Expectation, Scenario};
pub use table::{ScenarioTable, Suite};
