//! Compute module variables.

use serde::{Deserialize, Serialize};

use crate::error::{VarsError, VarsResult};
use crate::varmap::{ModuleConfig, ModuleFamily};

/// Instance operating system kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceKind {
    Linux,
    Windows,
}

impl InstanceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstanceKind::Linux => "linux",
            InstanceKind::Windows => "windows",
        }
    }
}

impl std::fmt::Display for InstanceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Variables accepted by the compute module family: instance template
/// shape, scaling bounds, and the public-IP toggle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputeVars {
    pub project_id: String,
    pub region: String,
    pub environment: String,
    pub instance_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub machine_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<InstanceKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnetwork: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_replicas: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_replicas: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assign_public_ip: Option<bool>,
}

impl ComputeVars {
    pub fn new(
        project_id: impl Into<String>,
        region: impl Into<String>,
        environment: impl Into<String>,
        instance_name: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            region: region.into(),
            environment: environment.into(),
            instance_name: instance_name.into(),
            machine_type: None,
            instance_type: None,
            source_image: None,
            network: None,
            subnetwork: None,
            min_replicas: None,
            max_replicas: None,
            assign_public_ip: None,
        }
    }

    pub fn machine_type(mut self, machine_type: impl Into<String>) -> Self {
        self.machine_type = Some(machine_type.into());
        self
    }

    pub fn kind(mut self, kind: InstanceKind) -> Self {
        self.instance_type = Some(kind);
        self
    }

    pub fn source_image(mut self, image: impl Into<String>) -> Self {
        self.source_image = Some(image.into());
        self
    }

    pub fn network(mut self, network: impl Into<String>, subnetwork: impl Into<String>) -> Self {
        self.network = Some(network.into());
        self.subnetwork = Some(subnetwork.into());
        self
    }

    pub fn replicas(mut self, min: u32, max: u32) -> Self {
        self.min_replicas = Some(min);
        self.max_replicas = Some(max);
        self
    }

    pub fn public_ip(mut self, assign: bool) -> Self {
        self.assign_public_ip = Some(assign);
        self
    }
}

impl ModuleConfig for ComputeVars {
    const FAMILY: ModuleFamily = ModuleFamily::Compute;

    fn validate(&self) -> VarsResult<()> {
        if self.project_id.is_empty() {
            return Err(VarsError::MissingField("project_id"));
        }
        if self.instance_name.is_empty() {
            return Err(VarsError::MissingField("instance_name"));
        }
        if let (Some(min), Some(max)) = (self.min_replicas, self.max_replicas) {
            if min > max {
                return Err(VarsError::InvalidReplicaBounds { min, max });
            }
        }
        Ok(())
    }
}
