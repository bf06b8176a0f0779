//! # planguard_vars
//!
//! Typed module variable builders for planguard.
//!
//! Each cloud module family gets a closed configuration struct that
//! validates shape at construction and renders into the generic [`VarMap`]
//! the plan driver writes into a module workspace as a tfvars file.
//!
//! # Example
//!
//! ```rust
//! use planguard_vars::{CloudSqlVars, DatabaseEngine, ModuleConfig};
//!
//! let vars = CloudSqlVars::new(
//!     "test-project",
//!     "europe-west1",
//!     "test",
//!     "postgres-test",
//!     DatabaseEngine::PostgreSql,
//! )
//! .version("POSTGRES_15")
//! .tier("db-custom-2-4096")
//! .to_vars()
//! .unwrap();
//!
//! assert_eq!(vars.get("database_version").unwrap(), "POSTGRES_15");
//! ```

pub mod cloudsql;
pub mod compute;
pub mod error;
pub mod iam;
pub mod load_balancer;
pub mod network;
pub mod varmap;

pub use cloudsql::{AvailabilityType, CloudSqlVars, DatabaseEngine};
pub use compute::{ComputeVars, InstanceKind};
pub use error::{VarsError, VarsResult};
pub use iam::{IamVars, RoleBinding, ServiceAccount, WorkloadIdentityConfig, PUBLIC_PRINCIPALS};
pub use load_balancer::{Backend, CdnPolicy, HealthCheck, LoadBalancerVars, SslProfile, UrlMapRule};
pub use network::NetworkVars;
pub use varmap::{ModuleConfig, ModuleFamily, VarMap, TFVARS_FILE};
