//! Scenario tables and suite files.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ScenarioError, ScenarioResult};
use crate::scenario::Scenario;

/// An ordered set of scenarios with unique names.
#[derive(Debug, Clone, Default)]
pub struct ScenarioTable {
    scenarios: Vec<Scenario>,
}

impl ScenarioTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a scenario, rejecting duplicate names.
    pub fn push(&mut self, scenario: Scenario) -> ScenarioResult<()> {
        if scenario.name.is_empty() {
            return Err(ScenarioError::InvalidScenario(
                "scenario with empty name".to_string(),
            ));
        }
        if self.scenarios.iter().any(|s| s.name == scenario.name) {
            return Err(ScenarioError::DuplicateName(scenario.name));
        }
        self.scenarios.push(scenario);
        Ok(())
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    pub fn into_scenarios(self) -> Vec<Scenario> {
        self.scenarios
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}

impl TryFrom<Vec<Scenario>> for ScenarioTable {
    type Error = ScenarioError;

    fn try_from(scenarios: Vec<Scenario>) -> ScenarioResult<Self> {
        let mut table = Self::new();
        for scenario in scenarios {
            table.push(scenario)?;
        }
        Ok(table)
    }
}

/// A suite file: a named collection of scenarios loaded from YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suite {
    #[serde(default)]
    pub name: Option<String>,
    pub scenarios: Vec<Scenario>,
}

impl Suite {
    /// Load a suite from a YAML file.
    pub fn from_path(path: &Path) -> ScenarioResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse a suite from YAML text.
    pub fn from_yaml(yaml: &str) -> ScenarioResult<Self> {
        let suite: Suite = serde_yaml::from_str(yaml)?;

        let mut seen = HashSet::new();
        for scenario in &suite.scenarios {
            if !seen.insert(scenario.name.as_str()) {
                return Err(ScenarioError::DuplicateName(scenario.name.clone()));
            }
        }
        Ok(suite)
    }

    /// Convert into a runnable table.
    pub fn into_table(self) -> ScenarioResult<ScenarioTable> {
        ScenarioTable::try_from(self.scenarios)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_rejects_duplicate_names() {
        let mut table = ScenarioTable::new();
        table
            .push(Scenario::new("valid_autoscaling", "modules/compute"))
            .unwrap();

        let err = table
            .push(Scenario::new("valid_autoscaling", "modules/compute"))
            .unwrap_err();

        assert!(matches!(err, ScenarioError::DuplicateName(name) if name == "valid_autoscaling"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_table_rejects_empty_name() {
        let mut table = ScenarioTable::new();
        let err = table.push(Scenario::new("", "modules/compute")).unwrap_err();
        assert!(matches!(err, ScenarioError::InvalidScenario(_)));
    }

    #[test]
    fn test_suite_from_yaml() {
        let yaml = r#"
name: compute-autoscaling
scenarios:
  - name: valid_autoscaling
    module: modules/compute
    vars:
      min_replicas: 2
      max_replicas: 10
  - name: single_instance
    module: modules/compute
    vars:
      min_replicas: 1
      max_replicas: 1
  - name: inverted_bounds
    module: modules/compute
    expect: failure
    vars:
      min_replicas: 5
      max_replicas: 2
"#;
        let suite = Suite::from_yaml(yaml).unwrap();
        assert_eq!(suite.name.as_deref(), Some("compute-autoscaling"));

        let table = suite.into_table().unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(
            table.scenarios()[2].expect,
            crate::scenario::Expectation::Failure
        );
    }

    #[test]
    fn test_suite_rejects_duplicates() {
        let yaml = r#"
scenarios:
  - name: same
    module: modules/network
  - name: same
    module: modules/network
"#;
        assert!(matches!(
            Suite::from_yaml(yaml),
            Err(ScenarioError::DuplicateName(_))
        ));
    }
}
