//! Integration tests for the plan driver against the mock runner.

use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;

use planguard_exec::{MockResponse, MockRunner, RetryPolicy};
use planguard_plan::{
    assert_attribute, assert_attribute_absent, assert_contains, assert_not_contains,
    assert_resource_present, DriverError, DriverOptions, PlanDriver,
};
use planguard_vars::{ComputeVars, ModuleConfig, VarMap, TFVARS_FILE};

const CLOUDSQL_PLAN: &str = "\
Terraform will perform the following actions:

  # google_sql_database_instance.main will be created
  + resource \"google_sql_database_instance\" \"main\" {
      + database_version = \"POSTGRES_15\"
      + region           = \"europe-west1\"
      + settings {
          + availability_type = \"REGIONAL\"
          + tier              = \"db-custom-2-4096\"
        }
    }

Plan: 1 to add, 0 to change, 0 to destroy.
";

const COMPUTE_PLAN_JSON: &str = r#"{
    "format_version": "1.2",
    "terraform_version": "1.6.6",
    "planned_values": {
        "root_module": {
            "resources": [{
                "address": "google_compute_instance_template.app",
                "type": "google_compute_instance_template",
                "name": "app",
                "provider_name": "registry.terraform.io/hashicorp/google",
                "values": {
                    "machine_type": "e2-medium",
                    "network_interface": [
                        { "network": "default", "access_config": [] }
                    ]
                }
            }]
        }
    }
}"#;

fn fixture_module() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("main.tf"),
        "resource \"google_sql_database_instance\" \"main\" {}\n",
    )
    .unwrap();
    dir
}

fn driver_with(runner: MockRunner) -> PlanDriver {
    let options = DriverOptions::new().retry(RetryPolicy::none());
    PlanDriver::with_options(Arc::new(runner), options)
}

#[tokio::test]
async fn test_plan_runs_init_then_plan_in_isolated_workspace() {
    let module = fixture_module();
    let runner = MockRunner::new().on("plan", MockResponse::success(CLOUDSQL_PLAN));
    let driver = driver_with(runner.clone());

    let vars = VarMap::new().set("database_version", "POSTGRES_15");
    driver.plan(module.path(), &vars).await.unwrap();

    let calls = runner.get_calls();
    assert_eq!(calls[0].subcommand.as_deref(), Some("init"));
    assert_eq!(calls[1].subcommand.as_deref(), Some("plan"));

    // Both phases share one workspace, which is not the module directory
    assert_eq!(calls[0].working_dir, calls[1].working_dir);
    assert_ne!(calls[0].working_dir, module.path());

    // Variables went into the workspace, never into the module itself
    assert!(!module.path().join(TFVARS_FILE).exists());
}

#[tokio::test]
async fn test_concurrent_plans_use_distinct_workspaces() {
    let module = fixture_module();
    let runner = MockRunner::new().on("plan", MockResponse::success(CLOUDSQL_PLAN));
    let driver = driver_with(runner.clone());
    let vars = VarMap::new();

    let (first, second) = tokio::join!(
        driver.plan(module.path(), &vars),
        driver.plan(module.path(), &vars),
    );
    first.unwrap();
    second.unwrap();

    let init_dirs: Vec<_> = runner
        .get_subcommand_calls("init")
        .into_iter()
        .map(|c| c.working_dir)
        .collect();
    assert_eq!(init_dirs.len(), 2);
    assert_ne!(init_dirs[0], init_dirs[1]);
}

#[tokio::test]
async fn test_plan_output_supports_assertions() {
    let module = fixture_module();
    let runner = MockRunner::new().on("plan", MockResponse::success(CLOUDSQL_PLAN));
    let driver = driver_with(runner);

    let result = driver.plan(module.path(), &VarMap::new()).await.unwrap();

    assert_resource_present(&result, "google_sql_database_instance").unwrap();
    assert_contains(&result, "POSTGRES_15").unwrap();
    assert_contains(&result, "REGIONAL").unwrap();
    assert_not_contains(&result, "allUsers").unwrap();
    assert_eq!(result.summary().unwrap().add, 1);
    assert!(result.has_changes());
}

#[tokio::test]
async fn test_transient_init_failure_is_retried() {
    let module = fixture_module();
    let runner = MockRunner::new()
        .on("init", MockResponse::failure(1, "Error: connection reset by peer"))
        .on("init", MockResponse::success("Terraform has been successfully initialized!"))
        .on("plan", MockResponse::success(CLOUDSQL_PLAN));

    let options = DriverOptions::new().retry(RetryPolicy::default_transient().backoff(0));
    let driver = PlanDriver::with_options(Arc::new(runner.clone()), options);

    driver.plan(module.path(), &VarMap::new()).await.unwrap();

    assert_eq!(runner.get_subcommand_calls("init").len(), 2);
}

#[tokio::test]
async fn test_non_transient_init_failure_is_fatal() {
    let module = fixture_module();
    let runner = MockRunner::new()
        .on("init", MockResponse::failure(1, "Error: Invalid provider configuration"));

    let options = DriverOptions::new().retry(RetryPolicy::default_transient().backoff(0));
    let driver = PlanDriver::with_options(Arc::new(runner.clone()), options);

    let err = driver.plan(module.path(), &VarMap::new()).await.unwrap_err();

    assert!(matches!(err, DriverError::Init(_)));
    assert_eq!(runner.get_subcommand_calls("init").len(), 1);
    assert!(!runner.was_called("plan"));
}

#[tokio::test]
async fn test_constraint_violation_surfaces_as_plan_error() {
    let module = fixture_module();
    let runner = MockRunner::new().on(
        "plan",
        MockResponse::failure(
            1,
            "Error: Invalid value for variable\n\nmax_replicas must be greater than or equal to min_replicas",
        ),
    );
    let driver = driver_with(runner);

    let vars = VarMap::new().set("min_replicas", 5).set("max_replicas", 2);
    let err = driver.plan(module.path(), &vars).await.unwrap_err();

    match err {
        DriverError::Plan(message) => assert!(message.contains("max_replicas")),
        other => panic!("expected plan error, got {other}"),
    }
}

#[tokio::test]
async fn test_plan_expecting_failure_returns_captured_error() {
    let module = fixture_module();
    let runner = MockRunner::new()
        .on("plan", MockResponse::failure(1, "Error: Invalid replica bounds"));
    let driver = driver_with(runner);

    let vars = VarMap::new().set("min_replicas", 5).set("max_replicas", 2);
    let captured = driver
        .plan_expecting_failure(module.path(), &vars)
        .await
        .unwrap();

    assert!(matches!(captured, DriverError::Plan(_)));
}

#[tokio::test]
async fn test_plan_expecting_failure_rejects_clean_plan() {
    let module = fixture_module();
    let runner = MockRunner::new().on("plan", MockResponse::success(CLOUDSQL_PLAN));
    let driver = driver_with(runner);

    let err = driver
        .plan_expecting_failure(module.path(), &VarMap::new())
        .await
        .unwrap_err();

    assert!(matches!(err, DriverError::UnexpectedSuccess));
}

#[tokio::test]
async fn test_validate_only_maps_to_validation_error() {
    let module = fixture_module();
    let runner = MockRunner::new().on(
        "validate",
        MockResponse::failure(1, "Error: Unsupported argument on main.tf line 3"),
    );
    let driver = driver_with(runner.clone());

    let err = driver
        .validate_only(module.path(), &VarMap::new())
        .await
        .unwrap_err();

    assert!(matches!(err, DriverError::Validation(_)));

    // validate initializes without a backend first
    let init = &runner.get_subcommand_calls("init")[0];
    assert!(init.args.contains(&"-backend=false".to_string()));
}

#[tokio::test]
async fn test_validate_only_succeeds_on_clean_module() {
    let module = fixture_module();
    let runner = MockRunner::new()
        .on("validate", MockResponse::success("Success! The configuration is valid."));
    let driver = driver_with(runner);

    driver
        .validate_only(module.path(), &VarMap::new())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_plan_structured_parses_show_output() {
    let module = fixture_module();
    let runner = MockRunner::new()
        .on("plan", MockResponse::success(CLOUDSQL_PLAN))
        .on("show", MockResponse::success(COMPUTE_PLAN_JSON));
    let driver = driver_with(runner.clone());

    let vars = ComputeVars::new("test-project", "europe-west1", "test", "no-public-ip-test")
        .public_ip(false)
        .to_vars()
        .unwrap();
    let plan = driver.plan_structured(module.path(), &vars).await.unwrap();

    assert!(plan.contains_type("google_compute_instance_template"));
    assert_attribute(
        &plan,
        "google_compute_instance_template.app",
        "/machine_type",
        &serde_json::json!("e2-medium"),
    )
    .unwrap();

    // No public IP: the network interface carries no access configuration
    assert_attribute_absent(
        &plan,
        "google_compute_instance_template.app",
        "/network_interface/0/access_config",
    )
    .unwrap();

    let show = &runner.get_subcommand_calls("show")[0];
    assert!(show.args.contains(&"-json".to_string()));
}

#[tokio::test]
async fn test_plan_artifact_persisted() {
    let module = fixture_module();
    let artifact_dir = TempDir::new().unwrap();
    let artifact = artifact_dir.path().join("network-plan.out");

    let runner = MockRunner::new().on("plan", MockResponse::success(CLOUDSQL_PLAN));
    let options = DriverOptions::new()
        .retry(RetryPolicy::none())
        .plan_artifact(&artifact);
    let driver = PlanDriver::with_options(Arc::new(runner), options);

    let result = driver.plan(module.path(), &VarMap::new()).await.unwrap();

    assert_eq!(result.artifact().unwrap(), &artifact);
    let persisted = std::fs::read_to_string(&artifact).unwrap();
    assert!(persisted.contains("POSTGRES_15"));
}

#[tokio::test]
async fn test_destroy_runs_auto_approved() {
    let module = fixture_module();
    let runner = MockRunner::new();
    let driver = driver_with(runner.clone());

    driver.destroy(module.path(), &VarMap::new()).await.unwrap();

    let destroy = &runner.get_subcommand_calls("destroy")[0];
    assert!(destroy.args.contains(&"-auto-approve".to_string()));
}

#[tokio::test]
async fn test_idempotent_plan_reports_no_changes() {
    let module = fixture_module();
    let runner = MockRunner::new().on(
        "plan",
        MockResponse::success(
            "No changes. Your infrastructure matches the configuration.\n\n\
             Plan: 0 to add, 0 to change, 0 to destroy.",
        ),
    );
    let driver = driver_with(runner);

    let result = driver.plan(module.path(), &VarMap::new()).await.unwrap();

    assert!(!result.has_changes());
    assert_eq!(result.summary().unwrap().total(), 0);
}
