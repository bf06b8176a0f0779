//! Structured plan representation.
//!
//! Parsed from the tool's JSON plan rendering into an address-indexed tree
//! of planned resources, for assertions substring matching cannot express
//! (e.g. absence of an access-configuration block on a specific resource).

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{DriverError, DriverResult};

#[derive(Debug, Deserialize)]
struct RawPlan {
    #[serde(default)]
    format_version: String,
    #[serde(default)]
    terraform_version: String,
    planned_values: Option<RawPlannedValues>,
}

#[derive(Debug, Deserialize)]
struct RawPlannedValues {
    root_module: Option<RawModule>,
}

#[derive(Debug, Deserialize)]
struct RawModule {
    #[serde(default)]
    resources: Vec<RawResource>,
    #[serde(default)]
    child_modules: Vec<RawModule>,
}

#[derive(Debug, Deserialize)]
struct RawResource {
    address: String,
    #[serde(rename = "type")]
    resource_type: String,
    name: String,
    #[serde(default)]
    provider_name: String,
    #[serde(default)]
    values: Value,
}

/// One planned resource instance.
#[derive(Debug, Clone)]
pub struct PlannedResource {
    pub address: String,
    pub resource_type: String,
    pub name: String,
    pub provider_name: String,
    /// Planned attribute values as a JSON tree.
    pub values: Value,
}

impl PlannedResource {
    /// Look up a planned attribute by JSON pointer
    /// (e.g. `/network_interface/0/access_config`).
    pub fn attribute(&self, pointer: &str) -> Option<&Value> {
        self.values.pointer(pointer)
    }
}

/// Address-indexed tree of planned resource changes.
#[derive(Debug, Clone, Default)]
pub struct StructuredPlan {
    pub format_version: String,
    pub tool_version: String,
    resources: BTreeMap<String, PlannedResource>,
}

impl StructuredPlan {
    /// Parse the tool's JSON plan rendering.
    pub fn from_json(json: &str) -> DriverResult<Self> {
        let raw: RawPlan = serde_json::from_str(json)?;

        let root = raw
            .planned_values
            .and_then(|v| v.root_module)
            .ok_or_else(|| {
                DriverError::MalformedPlan("plan JSON carries no planned values".to_string())
            })?;

        let mut resources = BTreeMap::new();
        collect(&mut resources, root);

        Ok(Self {
            format_version: raw.format_version,
            tool_version: raw.terraform_version,
            resources,
        })
    }

    pub fn resource(&self, address: &str) -> Option<&PlannedResource> {
        self.resources.get(address)
    }

    pub fn resources(&self) -> impl Iterator<Item = &PlannedResource> {
        self.resources.values()
    }

    pub fn resources_of_type<'a>(&'a self, resource_type: &'a str) -> impl Iterator<Item = &'a PlannedResource> {
        self.resources
            .values()
            .filter(move |r| r.resource_type == resource_type)
    }

    pub fn contains_type(&self, resource_type: &str) -> bool {
        self.resources_of_type(resource_type).next().is_some()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

fn collect(resources: &mut BTreeMap<String, PlannedResource>, module: RawModule) {
    for raw in module.resources {
        resources.insert(
            raw.address.clone(),
            PlannedResource {
                address: raw.address,
                resource_type: raw.resource_type,
                name: raw.name,
                provider_name: raw.provider_name,
                values: raw.values,
            },
        );
    }
    for child in module.child_modules {
        collect(resources, child);
    }
}
