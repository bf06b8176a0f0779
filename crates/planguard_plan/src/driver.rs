//! Plan driver.
//!
//! Drives the provisioning tool through validate → init → plan → show →
//! destroy against an isolated workspace copy of a module directory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use planguard_exec::{ExecutionResult, RetryPolicy, RunConfig, ToolInvocation, ToolRunner};
use planguard_vars::VarMap;

use crate::error::{DriverError, DriverResult};
use crate::result::{excerpt, PlanResult};
use crate::structured::StructuredPlan;
use crate::workspace::{ModuleWorkspace, PLAN_FILE};

/// Driver configuration.
#[derive(Clone)]
pub struct DriverOptions {
    /// Per-invocation run configuration (timeout, streaming)
    pub run_config: RunConfig,
    /// Retry policy applied to the init phase
    pub retry: RetryPolicy,
    /// Where to persist the textual plan report, if anywhere
    pub plan_artifact: Option<PathBuf>,
    /// Extra environment passed through to every invocation
    pub env: HashMap<String, String>,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            run_config: RunConfig::default(),
            retry: RetryPolicy::default_transient(),
            plan_artifact: None,
            env: HashMap::new(),
        }
    }
}

impl DriverOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn run_config(mut self, config: RunConfig) -> Self {
        self.run_config = config;
        self
    }

    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    pub fn plan_artifact(mut self, path: impl Into<PathBuf>) -> Self {
        self.plan_artifact = Some(path.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }
}

/// Drives the provisioning tool for one module at a time.
///
/// Every operation chain runs in a fresh [`ModuleWorkspace`], so concurrent
/// scenarios against the same module never share lock files or artifacts.
pub struct PlanDriver {
    runner: Arc<dyn ToolRunner>,
    options: DriverOptions,
}

impl PlanDriver {
    pub fn new(runner: Arc<dyn ToolRunner>) -> Self {
        Self {
            runner,
            options: DriverOptions::default(),
        }
    }

    pub fn with_options(runner: Arc<dyn ToolRunner>, options: DriverOptions) -> Self {
        Self { runner, options }
    }

    /// Stage an isolated workspace for `module` with `vars` written into it.
    pub fn stage(&self, module: &Path, vars: &VarMap) -> DriverResult<ModuleWorkspace> {
        let workspace = ModuleWorkspace::stage(module)?;
        workspace.write_vars(vars)?;
        Ok(workspace)
    }

    /// Syntax/schema check of the module configuration.
    pub async fn validate_only(&self, module: &Path, vars: &VarMap) -> DriverResult<()> {
        let workspace = self.stage(module, vars)?;
        self.validate_in(&workspace).await
    }

    /// Compute an execution plan, returning its textual result.
    pub async fn plan(&self, module: &Path, vars: &VarMap) -> DriverResult<PlanResult> {
        let workspace = self.stage(module, vars)?;
        self.plan_in(&workspace).await
    }

    /// Inverted success contract for negative-path scenarios: returns the
    /// captured driver error, and errors if the plan unexpectedly succeeds.
    pub async fn plan_expecting_failure(
        &self,
        module: &Path,
        vars: &VarMap,
    ) -> DriverResult<DriverError> {
        match self.plan(module, vars).await {
            Ok(_) => Err(DriverError::UnexpectedSuccess),
            Err(err) if err.is_expected_failure() => {
                info!("Plan failed as expected: {}", err);
                Ok(err)
            }
            Err(err) => Err(err),
        }
    }

    /// Compute a plan and parse it into the address-indexed representation.
    pub async fn plan_structured(
        &self,
        module: &Path,
        vars: &VarMap,
    ) -> DriverResult<StructuredPlan> {
        let workspace = self.stage(module, vars)?;
        self.plan_in(&workspace).await?;
        self.show_in(&workspace).await
    }

    /// Release any provisioned state for the module.
    pub async fn destroy(&self, module: &Path, vars: &VarMap) -> DriverResult<()> {
        let workspace = self.stage(module, vars)?;
        self.destroy_in(&workspace).await
    }

    /// Validate inside an already-staged workspace.
    pub async fn validate_in(&self, workspace: &ModuleWorkspace) -> DriverResult<()> {
        // Providers must be resolvable before validate; the backend is not
        let init = self
            .run_in(
                workspace.path(),
                &["init", "-backend=false", "-input=false", "-no-color"],
            )
            .await?;
        if !init.success() {
            return Err(DriverError::Validation(excerpt(&init.combined_output())));
        }

        let result = self.run_in(workspace.path(), &["validate", "-no-color"]).await?;
        if result.success() {
            Ok(())
        } else {
            Err(DriverError::Validation(excerpt(&result.combined_output())))
        }
    }

    /// Init and plan inside an already-staged workspace.
    pub async fn plan_in(&self, workspace: &ModuleWorkspace) -> DriverResult<PlanResult> {
        self.init_with_retry(workspace.path()).await?;

        let out_flag = format!("-out={}", PLAN_FILE);
        let result = self
            .run_in(
                workspace.path(),
                &["plan", "-input=false", "-no-color", out_flag.as_str()],
            )
            .await?;
        if !result.success() {
            return Err(DriverError::Plan(excerpt(&result.combined_output())));
        }

        let mut plan = PlanResult::new(result.combined_output());
        if let Some(artifact) = &self.options.plan_artifact {
            std::fs::write(artifact, plan.text())?;
            debug!("Persisted plan report to {}", artifact.display());
            plan = plan.with_artifact(artifact.clone());
        }
        Ok(plan)
    }

    /// Render the workspace's plan artifact as structured JSON.
    pub async fn show_in(&self, workspace: &ModuleWorkspace) -> DriverResult<StructuredPlan> {
        let result = self
            .run_in(workspace.path(), &["show", "-json", PLAN_FILE])
            .await?;
        if !result.success() {
            return Err(DriverError::Plan(excerpt(&result.combined_output())));
        }
        StructuredPlan::from_json(&result.stdout)
    }

    /// Destroy inside an already-staged workspace. Scoped cleanup: the
    /// scenario runner calls this unconditionally after the scenario body.
    pub async fn destroy_in(&self, workspace: &ModuleWorkspace) -> DriverResult<()> {
        let result = self
            .run_in(
                workspace.path(),
                &["destroy", "-auto-approve", "-input=false", "-no-color"],
            )
            .await?;
        if result.success() {
            Ok(())
        } else {
            Err(DriverError::Destroy(excerpt(&result.combined_output())))
        }
    }

    async fn init_with_retry(&self, dir: &Path) -> DriverResult<ExecutionResult> {
        let mut attempt = 1;
        loop {
            let result = self
                .run_in(dir, &["init", "-input=false", "-no-color"])
                .await?;
            if result.success() {
                return Ok(result);
            }

            let output = result.combined_output();
            if self.options.retry.allows_retry(attempt, &output) {
                warn!(
                    "init attempt {} failed with a transient error, retrying",
                    attempt
                );
                tokio::time::sleep(std::time::Duration::from_secs(
                    self.options.retry.backoff_seconds,
                ))
                .await;
                attempt += 1;
                continue;
            }

            return Err(DriverError::Init(excerpt(&output)));
        }
    }

    async fn run_in(&self, dir: &Path, args: &[&str]) -> DriverResult<ExecutionResult> {
        let mut invocation = ToolInvocation::new(dir).args(args.iter().copied());
        for (key, value) in &self.options.env {
            invocation = invocation.env(key.clone(), value.clone());
        }
        Ok(self.runner.run(&invocation, &self.options.run_config).await?)
    }
}
