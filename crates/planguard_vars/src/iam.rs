//! IAM module variables.

use serde::{Deserialize, Serialize};

use crate::error::{VarsError, VarsResult};
use crate::varmap::{ModuleConfig, ModuleFamily};

/// Principals that grant public access; never valid in this system.
pub const PUBLIC_PRINCIPALS: [&str; 2] = ["allUsers", "allAuthenticatedUsers"];

/// A service account definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceAccount {
    pub account_id: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ServiceAccount {
    pub fn new(account_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            display_name: display_name.into(),
            description: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A role granted to a set of members.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleBinding {
    pub role: String,
    pub members: Vec<String>,
}

impl RoleBinding {
    pub fn new(role: impl Into<String>, members: Vec<String>) -> Self {
        Self {
            role: role.into(),
            members,
        }
    }
}

/// Workload identity wiring between a Kubernetes and a cloud service account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkloadIdentityConfig {
    pub namespace: String,
    pub service_account: String,
    pub gcp_service_account: String,
}

/// Variables accepted by the IAM module family: service accounts, role
/// bindings, and workload identity configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IamVars {
    pub project_id: String,
    pub environment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_accounts: Option<Vec<ServiceAccount>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_bindings: Option<Vec<RoleBinding>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_workload_identity: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workload_identity_config: Option<WorkloadIdentityConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_type: Option<String>,
}

impl IamVars {
    pub fn new(project_id: impl Into<String>, environment: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            environment: environment.into(),
            service_accounts: None,
            role_bindings: None,
            enable_workload_identity: None,
            workload_identity_config: None,
            account_type: None,
        }
    }

    pub fn service_account(mut self, account: ServiceAccount) -> Self {
        self.service_accounts.get_or_insert_with(Vec::new).push(account);
        self
    }

    pub fn role_binding(mut self, binding: RoleBinding) -> Self {
        self.role_bindings.get_or_insert_with(Vec::new).push(binding);
        self
    }

    pub fn workload_identity(mut self, config: WorkloadIdentityConfig) -> Self {
        self.enable_workload_identity = Some(true);
        self.workload_identity_config = Some(config);
        self
    }

    pub fn account_type(mut self, account_type: impl Into<String>) -> Self {
        self.account_type = Some(account_type.into());
        self
    }
}

impl ModuleConfig for IamVars {
    const FAMILY: ModuleFamily = ModuleFamily::Iam;

    fn validate(&self) -> VarsResult<()> {
        if self.project_id.is_empty() {
            return Err(VarsError::MissingField("project_id"));
        }
        if let Some(accounts) = &self.service_accounts {
            for account in accounts {
                if account.account_id.is_empty() {
                    return Err(VarsError::InvalidShape(
                        "service account with empty account_id".to_string(),
                    ));
                }
            }
        }
        if let Some(bindings) = &self.role_bindings {
            for binding in bindings {
                if binding.members.is_empty() {
                    return Err(VarsError::InvalidShape(format!(
                        "role binding {} has no members",
                        binding.role
                    )));
                }
                for member in &binding.members {
                    if PUBLIC_PRINCIPALS.contains(&member.as_str()) {
                        return Err(VarsError::PublicPrincipal(member.clone()));
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_accounts_render() {
        let vars = IamVars::new("test-project", "test")
            .service_account(
                ServiceAccount::new("app-a-sa", "App A Service Account")
                    .description("Service account for App A"),
            )
            .service_account(ServiceAccount::new("app-b-sa", "App B Service Account"))
            .to_vars()
            .unwrap();

        let accounts = vars.get("service_accounts").unwrap();
        assert_eq!(accounts[0]["account_id"], "app-a-sa");
        assert_eq!(accounts[1]["account_id"], "app-b-sa");
        assert!(accounts[1].get("description").is_none());
    }

    #[test]
    fn test_role_bindings_render() {
        let vars = IamVars::new("test-project", "test")
            .role_binding(RoleBinding::new(
                "roles/compute.instanceAdmin.v1",
                vec!["serviceAccount:app-a-sa@test-project.iam.gserviceaccount.com".to_string()],
            ))
            .to_vars()
            .unwrap();

        let bindings = vars.get("role_bindings").unwrap();
        assert_eq!(bindings[0]["role"], "roles/compute.instanceAdmin.v1");
    }

    #[test]
    fn test_public_principal_rejected() {
        let result = IamVars::new("test-project", "test")
            .role_binding(RoleBinding::new(
                "roles/viewer",
                vec!["allUsers".to_string()],
            ))
            .validate();

        assert!(matches!(result, Err(VarsError::PublicPrincipal(p)) if p == "allUsers"));

        let result = IamVars::new("test-project", "test")
            .role_binding(RoleBinding::new(
                "roles/viewer",
                vec!["allAuthenticatedUsers".to_string()],
            ))
            .validate();

        assert!(matches!(result, Err(VarsError::PublicPrincipal(_))));
    }

    #[test]
    fn test_empty_members_rejected() {
        let result = IamVars::new("test-project", "test")
            .role_binding(RoleBinding::new("roles/viewer", Vec::new()))
            .validate();

        assert!(matches!(result, Err(VarsError::InvalidShape(_))));
    }

    #[test]
    fn test_workload_identity() {
        let vars = IamVars::new("test-project", "test")
            .workload_identity(WorkloadIdentityConfig {
                namespace: "default".to_string(),
                service_account: "app-sa".to_string(),
                gcp_service_account: "app-sa@test-project.iam.gserviceaccount.com".to_string(),
            })
            .to_vars()
            .unwrap();

        assert_eq!(*vars.get("enable_workload_identity").unwrap(), true);
        let config = vars.get("workload_identity_config").unwrap();
        assert_eq!(config["namespace"], "default");
    }
}
