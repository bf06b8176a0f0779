//! Concurrent scenario execution.
//!
//! Scenarios run as independent tasks; one scenario's failure never aborts
//! its siblings, and every staged workspace is destroyed after the scenario
//! body, including on assertion failure.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use serde::Serialize;
use tracing::{info, warn};

use planguard_plan::{
    assert_attribute, assert_attribute_absent, assert_contains, assert_not_contains,
    assert_resource_present, DriverError, ModuleWorkspace, PlanDriver, PlanResult, StructuredPlan,
};

use crate::scenario::{Assertion, Expectation, Scenario};
use crate::table::ScenarioTable;

/// Per-scenario progress states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioState {
    Built,
    Validated,
    Initialized,
    Planned,
    Asserted,
    Passed,
    Failed,
}

impl std::fmt::Display for ScenarioState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ScenarioState::Built => "built",
            ScenarioState::Validated => "validated",
            ScenarioState::Initialized => "initialized",
            ScenarioState::Planned => "planned",
            ScenarioState::Asserted => "asserted",
            ScenarioState::Passed => "passed",
            ScenarioState::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// Terminal record of one scenario run.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioOutcome {
    pub name: String,
    /// Terminal state: `Passed` or `Failed`
    pub state: ScenarioState,
    /// Furthest phase the scenario reached before terminating
    pub reached: ScenarioState,
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
}

impl ScenarioOutcome {
    pub fn passed(&self) -> bool {
        self.state == ScenarioState::Passed
    }
}

/// Aggregate result of a table run; passes only if every scenario passed.
#[derive(Debug, Clone, Serialize)]
pub struct TableReport {
    pub outcomes: Vec<ScenarioOutcome>,
}

impl TableReport {
    pub fn passed(&self) -> bool {
        self.outcomes.iter().all(ScenarioOutcome::passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &ScenarioOutcome> {
        self.outcomes.iter().filter(|o| !o.passed())
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Human-readable summary for CLI output.
    pub fn render(&self) -> String {
        let mut lines = Vec::with_capacity(self.outcomes.len() + 1);
        for outcome in &self.outcomes {
            match &outcome.error {
                None => lines.push(format!(
                    "PASS {} ({}ms)",
                    outcome.name, outcome.duration_ms
                )),
                Some(error) => lines.push(format!(
                    "FAIL {} (reached {}): {}",
                    outcome.name, outcome.reached, error
                )),
            }
        }
        let failed = self.failures().count();
        lines.push(format!(
            "{} scenarios: {} passed, {} failed",
            self.len(),
            self.len() - failed,
            failed
        ));
        lines.join("\n")
    }
}

/// Executes scenario tables against a shared plan driver.
pub struct ScenarioRunner {
    driver: Arc<PlanDriver>,
}

impl ScenarioRunner {
    pub fn new(driver: Arc<PlanDriver>) -> Self {
        Self { driver }
    }

    /// Run every scenario concurrently and gather the aggregate report.
    pub async fn run_table(&self, table: ScenarioTable) -> TableReport {
        let (names, handles): (Vec<_>, Vec<_>) = table
            .into_scenarios()
            .into_iter()
            .map(|scenario| {
                let name = scenario.name.clone();
                let driver = self.driver.clone();
                (name, tokio::spawn(run_scenario(driver, scenario)))
            })
            .unzip();

        let outcomes = names
            .into_iter()
            .zip(join_all(handles).await)
            .map(|(name, result)| match result {
                Ok(outcome) => outcome,
                // A panicking scenario still must not take down its siblings
                Err(err) => ScenarioOutcome {
                    name,
                    state: ScenarioState::Failed,
                    reached: ScenarioState::Built,
                    error: Some(format!("scenario task panicked: {err}")),
                    started_at: Utc::now(),
                    duration_ms: 0,
                },
            })
            .collect();
        TableReport { outcomes }
    }

    /// Run a single scenario.
    pub async fn run_scenario(&self, scenario: Scenario) -> ScenarioOutcome {
        run_scenario(self.driver.clone(), scenario).await
    }
}

struct BodyOutcome {
    reached: ScenarioState,
    error: Option<String>,
}

async fn run_scenario(driver: Arc<PlanDriver>, scenario: Scenario) -> ScenarioOutcome {
    let started_at = Utc::now();
    let timer = Instant::now();
    info!("Running scenario {}", scenario.name);

    let (workspace, body) = scenario_body(&driver, &scenario).await;

    // Scoped release of staged state, regardless of the body outcome
    if let Some(workspace) = &workspace {
        if let Err(err) = driver.destroy_in(workspace).await {
            warn!("Cleanup for scenario {} failed: {}", scenario.name, err);
        }
    }

    let duration_ms = timer.elapsed().as_millis() as u64;
    match body.error {
        None => {
            info!("Scenario {} passed in {}ms", scenario.name, duration_ms);
            ScenarioOutcome {
                name: scenario.name,
                state: ScenarioState::Passed,
                reached: body.reached,
                error: None,
                started_at,
                duration_ms,
            }
        }
        Some(error) => {
            warn!("Scenario {} failed: {}", scenario.name, error);
            ScenarioOutcome {
                name: scenario.name,
                state: ScenarioState::Failed,
                reached: body.reached,
                error: Some(error),
                started_at,
                duration_ms,
            }
        }
    }
}

async fn scenario_body(
    driver: &PlanDriver,
    scenario: &Scenario,
) -> (Option<ModuleWorkspace>, BodyOutcome) {
    let mut reached = ScenarioState::Built;
    let fail = |reached: ScenarioState, error: String| BodyOutcome {
        reached,
        error: Some(error),
    };

    let workspace = match driver.stage(&scenario.module, &scenario.vars) {
        Ok(workspace) => workspace,
        Err(err) => return (None, fail(reached, err.to_string())),
    };

    if let Err(err) = driver.validate_in(&workspace).await {
        let outcome = match scenario.expect {
            // A failure-path scenario may legitimately die before planning
            Expectation::Failure => BodyOutcome {
                reached,
                error: None,
            },
            Expectation::Success => fail(reached, err.to_string()),
        };
        return (Some(workspace), outcome);
    }
    reached = ScenarioState::Validated;

    match scenario.expect {
        Expectation::Failure => {
            let error = match driver.plan_in(&workspace).await {
                Err(err) if err.is_expected_failure() => {
                    reached = ScenarioState::Planned;
                    assert_failure_text(scenario, &err)
                }
                Err(err) => Some(err.to_string()),
                Ok(_) => {
                    Some("plan unexpectedly succeeded for a failure-path scenario".to_string())
                }
            };
            (Some(workspace), BodyOutcome { reached, error })
        }
        Expectation::Success => {
            let plan = match driver.plan_in(&workspace).await {
                Ok(plan) => {
                    reached = ScenarioState::Planned;
                    plan
                }
                Err(err) => {
                    // A plan-phase rejection means init already went through
                    if matches!(err, DriverError::Plan(_)) {
                        reached = ScenarioState::Initialized;
                    }
                    return (Some(workspace), fail(reached, err.to_string()));
                }
            };

            let structured = if scenario.needs_structured() {
                match driver.show_in(&workspace).await {
                    Ok(structured) => Some(structured),
                    Err(err) => return (Some(workspace), fail(reached, err.to_string())),
                }
            } else {
                None
            };

            for assertion in &scenario.assertions {
                if let Err(error) = evaluate(assertion, &plan, structured.as_ref()) {
                    return (Some(workspace), fail(reached, error));
                }
            }
            reached = ScenarioState::Asserted;
            (Some(workspace), BodyOutcome {
                reached,
                error: None,
            })
        }
    }
}

/// Textual assertions of a failure-path scenario run against the captured
/// error output; structural assertions have nothing to match against there.
fn assert_failure_text(scenario: &Scenario, err: &DriverError) -> Option<String> {
    let text = PlanResult::new(err.to_string());
    for assertion in &scenario.assertions {
        let result = match assertion {
            Assertion::Contains(literal) => assert_contains(&text, literal),
            Assertion::NotContains(literal) => assert_not_contains(&text, literal),
            _ => {
                return Some(
                    "structural assertions are not applicable to failure-path scenarios"
                        .to_string(),
                )
            }
        };
        if let Err(err) = result {
            return Some(err.to_string());
        }
    }
    None
}

fn evaluate(
    assertion: &Assertion,
    plan: &PlanResult,
    structured: Option<&StructuredPlan>,
) -> Result<(), String> {
    match assertion {
        Assertion::Contains(literal) => assert_contains(plan, literal).map_err(|e| e.to_string()),
        Assertion::NotContains(literal) => {
            assert_not_contains(plan, literal).map_err(|e| e.to_string())
        }
        Assertion::ResourcePresent(resource_type) => {
            assert_resource_present(plan, resource_type).map_err(|e| e.to_string())
        }
        Assertion::Attribute {
            address,
            path,
            expected,
        } => match structured {
            Some(structured) => {
                assert_attribute(structured, address, path, expected).map_err(|e| e.to_string())
            }
            None => Err("structured plan unavailable".to_string()),
        },
        Assertion::AttributeAbsent { address, path } => match structured {
            Some(structured) => {
                assert_attribute_absent(structured, address, path).map_err(|e| e.to_string())
            }
            None => Err("structured plan unavailable".to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_ordering_follows_progression() {
        assert!(ScenarioState::Built < ScenarioState::Validated);
        assert!(ScenarioState::Validated < ScenarioState::Initialized);
        assert!(ScenarioState::Initialized < ScenarioState::Planned);
        assert!(ScenarioState::Planned < ScenarioState::Asserted);
    }

    #[test]
    fn test_report_aggregation() {
        let report = TableReport {
            outcomes: vec![
                ScenarioOutcome {
                    name: "a".to_string(),
                    state: ScenarioState::Passed,
                    reached: ScenarioState::Asserted,
                    error: None,
                    started_at: Utc::now(),
                    duration_ms: 12,
                },
                ScenarioOutcome {
                    name: "b".to_string(),
                    state: ScenarioState::Failed,
                    reached: ScenarioState::Planned,
                    error: Some("plan output does not contain `POSTGRES_15`".to_string()),
                    started_at: Utc::now(),
                    duration_ms: 7,
                },
            ],
        };

        assert!(!report.passed());
        assert_eq!(report.failures().count(), 1);

        let rendered = report.render();
        assert!(rendered.contains("PASS a"));
        assert!(rendered.contains("FAIL b (reached planned)"));
        assert!(rendered.contains("2 scenarios: 1 passed, 1 failed"));
    }
}
