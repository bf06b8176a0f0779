//! The generic variable map and its tfvars rendering.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{VarsError, VarsResult};

/// File name for variables written into a module workspace. The `auto`
/// infix makes the tool load it without an explicit `-var-file` flag.
pub const TFVARS_FILE: &str = "planguard.auto.tfvars.json";

/// Module families covered by the harness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleFamily {
    Network,
    Compute,
    LoadBalancer,
    CloudSql,
    Iam,
}

impl ModuleFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleFamily::Network => "network",
            ModuleFamily::Compute => "compute",
            ModuleFamily::LoadBalancer => "load-balancer",
            ModuleFamily::CloudSql => "cloudsql",
            ModuleFamily::Iam => "iam",
        }
    }
}

impl std::fmt::Display for ModuleFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A typed per-family module configuration that renders to a `VarMap`.
pub trait ModuleConfig: Serialize {
    const FAMILY: ModuleFamily;

    /// Shape validation, run before the tool is ever invoked.
    fn validate(&self) -> VarsResult<()>;

    /// Validate and render into a variable map.
    fn to_vars(&self) -> VarsResult<VarMap> {
        self.validate()?;
        VarMap::from_config(self)
    }
}

/// Named-parameter variable map passed to the provisioning tool.
///
/// Values may be scalars, booleans, numbers, or nested sequences/mappings.
/// Keys are unique; ordering is irrelevant to the tool but kept stable here
/// so rendered tfvars files diff cleanly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VarMap(BTreeMap<String, Value>);

impl VarMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Merge another map into this one; keys in `other` win.
    pub fn merge(mut self, other: VarMap) -> Self {
        self.0.extend(other.0);
        self
    }

    /// Build from any serializable configuration struct.
    ///
    /// The struct must serialize to a JSON object; optional fields that
    /// serialize to null are dropped rather than passed to the tool.
    pub fn from_config<T: Serialize + ?Sized>(config: &T) -> VarsResult<Self> {
        let value = serde_json::to_value(config)?;
        match value {
            Value::Object(map) => Ok(Self(
                map.into_iter().filter(|(_, v)| !v.is_null()).collect(),
            )),
            other => Err(VarsError::InvalidShape(format!(
                "expected an object of variables, got {}",
                json_type_name(&other)
            ))),
        }
    }

    /// Render as a tfvars JSON document.
    pub fn to_tfvars_json(&self) -> VarsResult<String> {
        Ok(serde_json::to_string_pretty(&self.0)?)
    }

    /// Write the tfvars file into a workspace directory, returning its path.
    pub fn write_tfvars(&self, dir: &Path) -> VarsResult<PathBuf> {
        let path = dir.join(TFVARS_FILE);
        std::fs::write(&path, self.to_tfvars_json()?)?;
        Ok(path)
    }
}

impl FromIterator<(String, Value)> for VarMap {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_and_get() {
        let vars = VarMap::new()
            .set("project_id", "test-project")
            .set("min_replicas", 2)
            .set("assign_public_ip", false);

        assert_eq!(vars.get("project_id"), Some(&json!("test-project")));
        assert_eq!(vars.get("min_replicas"), Some(&json!(2)));
        assert_eq!(vars.get("assign_public_ip"), Some(&json!(false)));
        assert_eq!(vars.len(), 3);
    }

    #[test]
    fn test_nested_values() {
        let vars = VarMap::new().set(
            "backends",
            json!([{ "group": "app-a-mig", "balancing_mode": "UTILIZATION" }]),
        );

        let backends = vars.get("backends").unwrap();
        assert_eq!(backends[0]["balancing_mode"], "UTILIZATION");
    }

    #[test]
    fn test_merge_overrides() {
        let base = VarMap::new().set("region", "europe-west1").set("environment", "test");
        let merged = base.merge(VarMap::new().set("environment", "prod"));

        assert_eq!(merged.get("environment"), Some(&json!("prod")));
        assert_eq!(merged.get("region"), Some(&json!("europe-west1")));
    }

    #[test]
    fn test_from_config_drops_nulls() {
        #[derive(serde::Serialize)]
        struct Config {
            name: String,
            tier: Option<String>,
        }

        let vars = VarMap::from_config(&Config {
            name: "db".to_string(),
            tier: None,
        })
        .unwrap();

        assert!(vars.contains("name"));
        assert!(!vars.contains("tier"));
    }

    #[test]
    fn test_from_config_rejects_non_object() {
        let result = VarMap::from_config(&vec![1, 2, 3]);
        assert!(matches!(result, Err(VarsError::InvalidShape(_))));
    }

    #[test]
    fn test_tfvars_rendering() {
        let vars = VarMap::new().set("database_version", "POSTGRES_15");
        let rendered = vars.to_tfvars_json().unwrap();

        assert!(rendered.contains("\"database_version\": \"POSTGRES_15\""));
    }
}
