//! Scenario definitions.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use planguard_vars::VarMap;

/// Expected outcome of a scenario's plan phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expectation {
    #[default]
    Success,
    Failure,
}

/// A single check against a scenario's plan result.
///
/// `contains`/`not_contains`/`resource_present` match the textual plan
/// rendering; `attribute`/`attribute_absent` need the structured plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Assertion {
    Contains(String),
    NotContains(String),
    ResourcePresent(String),
    Attribute {
        address: String,
        path: String,
        expected: Value,
    },
    AttributeAbsent {
        address: String,
        path: String,
    },
}

impl Assertion {
    /// Whether this assertion needs the structured plan representation.
    pub fn needs_structure(&self) -> bool {
        matches!(
            self,
            Assertion::Attribute { .. } | Assertion::AttributeAbsent { .. }
        )
    }
}

/// One parameterized test case: a module, a variable set, the expected
/// outcome, and its assertions. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub module: PathBuf,
    #[serde(default)]
    pub vars: VarMap,
    #[serde(default)]
    pub expect: Expectation,
    #[serde(default)]
    pub assertions: Vec<Assertion>,
}

impl Scenario {
    pub fn new(name: impl Into<String>, module: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            module: module.into(),
            vars: VarMap::new(),
            expect: Expectation::Success,
            assertions: Vec::new(),
        }
    }

    pub fn vars(mut self, vars: VarMap) -> Self {
        self.vars = vars;
        self
    }

    pub fn expect_failure(mut self) -> Self {
        self.expect = Expectation::Failure;
        self
    }

    pub fn assert_contains(mut self, literal: impl Into<String>) -> Self {
        self.assertions.push(Assertion::Contains(literal.into()));
        self
    }

    pub fn assert_not_contains(mut self, literal: impl Into<String>) -> Self {
        self.assertions.push(Assertion::NotContains(literal.into()));
        self
    }

    pub fn assert_resource(mut self, resource_type: impl Into<String>) -> Self {
        self.assertions
            .push(Assertion::ResourcePresent(resource_type.into()));
        self
    }

    pub fn assert_attribute(
        mut self,
        address: impl Into<String>,
        path: impl Into<String>,
        expected: impl Into<Value>,
    ) -> Self {
        self.assertions.push(Assertion::Attribute {
            address: address.into(),
            path: path.into(),
            expected: expected.into(),
        });
        self
    }

    pub fn assert_attribute_absent(
        mut self,
        address: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        self.assertions.push(Assertion::AttributeAbsent {
            address: address.into(),
            path: path.into(),
        });
        self
    }

    /// Whether any assertion needs the structured plan.
    pub fn needs_structured(&self) -> bool {
        self.assertions.iter().any(Assertion::needs_structure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_builder() {
        let scenario = Scenario::new("cloudsql_postgres", "modules/cloudsql")
            .vars(VarMap::new().set("database_version", "POSTGRES_15"))
            .assert_resource("google_sql_database_instance")
            .assert_contains("POSTGRES_15")
            .assert_not_contains("allUsers");

        assert_eq!(scenario.expect, Expectation::Success);
        assert_eq!(scenario.assertions.len(), 3);
        assert!(!scenario.needs_structured());
    }

    #[test]
    fn test_structural_assertions_flagged() {
        let scenario = Scenario::new("no_public_ip", "modules/compute")
            .assert_attribute_absent(
                "google_compute_instance_template.app",
                "/network_interface/0/access_config",
            );

        assert!(scenario.needs_structured());
    }

    #[test]
    fn test_scenario_yaml_shape() {
        let yaml = r#"
name: iam_no_public_access
module: modules/iam
vars:
  project_id: test-project
  environment: test
expect: success
assertions:
  - contains: google_project_iam_member
  - not_contains: allUsers
  - attribute:
      address: google_service_account.app
      path: /account_id
      expected: app-a-sa
"#;
        let scenario: Scenario = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(scenario.name, "iam_no_public_access");
        assert_eq!(scenario.assertions.len(), 3);
        assert!(matches!(&scenario.assertions[1], Assertion::NotContains(s) if s == "allUsers"));
        assert!(scenario.needs_structured());
    }

    #[test]
    fn test_expectation_defaults_to_success() {
        let yaml = "name: x\nmodule: modules/network\n";
        let scenario: Scenario = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(scenario.expect, Expectation::Success);
    }
}
