//! Network module variables.

use serde::{Deserialize, Serialize};

use crate::error::{VarsError, VarsResult};
use crate::varmap::{ModuleConfig, ModuleFamily};

/// Variables accepted by the network module family: VPC and subnet naming,
/// CIDR blocks, and firewall toggles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkVars {
    pub project_id: String,
    pub region: String,
    pub environment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vpc_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_subnet_cidr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_subnet_cidr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_ssh_firewall: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_http_firewall: Option<bool>,
}

impl NetworkVars {
    pub fn new(
        project_id: impl Into<String>,
        region: impl Into<String>,
        environment: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            region: region.into(),
            environment: environment.into(),
            vpc_name: None,
            public_subnet_cidr: None,
            private_subnet_cidr: None,
            enable_ssh_firewall: None,
            enable_http_firewall: None,
        }
    }

    pub fn vpc_name(mut self, name: impl Into<String>) -> Self {
        self.vpc_name = Some(name.into());
        self
    }

    pub fn subnets(mut self, public_cidr: impl Into<String>, private_cidr: impl Into<String>) -> Self {
        self.public_subnet_cidr = Some(public_cidr.into());
        self.private_subnet_cidr = Some(private_cidr.into());
        self
    }

    pub fn ssh_firewall(mut self, enabled: bool) -> Self {
        self.enable_ssh_firewall = Some(enabled);
        self
    }

    pub fn http_firewall(mut self, enabled: bool) -> Self {
        self.enable_http_firewall = Some(enabled);
        self
    }
}

impl ModuleConfig for NetworkVars {
    const FAMILY: ModuleFamily = ModuleFamily::Network;

    fn validate(&self) -> VarsResult<()> {
        if self.project_id.is_empty() {
            return Err(VarsError::MissingField("project_id"));
        }
        if self.region.is_empty() {
            return Err(VarsError::MissingField("region"));
        }
        if let Some(cidr) = &self.public_subnet_cidr {
            check_cidr("public_subnet_cidr", cidr)?;
        }
        if let Some(cidr) = &self.private_subnet_cidr {
            check_cidr("private_subnet_cidr", cidr)?;
        }
        Ok(())
    }
}

/// Syntactic IPv4 CIDR check; semantic overlap validation stays with the tool.
fn check_cidr(field: &'static str, value: &str) -> VarsResult<()> {
    let invalid = || VarsError::InvalidCidr {
        field,
        value: value.to_string(),
    };

    let (addr, prefix) = value.split_once('/').ok_or_else(invalid)?;
    let octets: Vec<&str> = addr.split('.').collect();
    if octets.len() != 4 {
        return Err(invalid());
    }
    for octet in octets {
        octet.parse::<u8>().map_err(|_| invalid())?;
    }
    let prefix: u8 = prefix.parse().map_err(|_| invalid())?;
    if prefix > 32 {
        return Err(invalid());
    }
    Ok(())
}
