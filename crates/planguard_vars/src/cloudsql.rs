//! Cloud SQL module variables.

use serde::{Deserialize, Serialize};

use crate::error::{VarsError, VarsResult};
use crate::varmap::{ModuleConfig, ModuleFamily};

/// Database engines the module family supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseEngine {
    PostgreSql,
    SqlServer,
}

impl DatabaseEngine {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatabaseEngine::PostgreSql => "postgresql",
            DatabaseEngine::SqlServer => "sqlserver",
        }
    }

    /// Prefix every engine version string carries (e.g. `POSTGRES_15`).
    pub fn version_prefix(&self) -> &'static str {
        match self {
            DatabaseEngine::PostgreSql => "POSTGRES_",
            DatabaseEngine::SqlServer => "SQLSERVER_",
        }
    }
}

impl std::fmt::Display for DatabaseEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Availability type for the instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AvailabilityType {
    Zonal,
    Regional,
}

impl AvailabilityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AvailabilityType::Zonal => "ZONAL",
            AvailabilityType::Regional => "REGIONAL",
        }
    }
}

/// Variables accepted by the Cloud SQL module family: engine and version,
/// tier, high availability, networking, backup policy, and deletion
/// protection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudSqlVars {
    pub project_id: String,
    pub region: String,
    pub environment: String,
    pub instance_name: String,
    pub database_type: DatabaseEngine,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high_availability: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability_type: Option<AvailabilityType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv4_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_network: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retained_backups: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_log_retention_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deletion_protection: Option<bool>,
}

impl CloudSqlVars {
    pub fn new(
        project_id: impl Into<String>,
        region: impl Into<String>,
        environment: impl Into<String>,
        instance_name: impl Into<String>,
        engine: DatabaseEngine,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            region: region.into(),
            environment: environment.into(),
            instance_name: instance_name.into(),
            database_type: engine,
            database_version: None,
            tier: None,
            high_availability: None,
            availability_type: None,
            ipv4_enabled: None,
            private_network: None,
            backup_enabled: None,
            backup_start_time: None,
            retained_backups: None,
            transaction_log_retention_days: None,
            deletion_protection: None,
        }
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.database_version = Some(version.into());
        self
    }

    pub fn tier(mut self, tier: impl Into<String>) -> Self {
        self.tier = Some(tier.into());
        self
    }

    pub fn high_availability(mut self, availability: AvailabilityType) -> Self {
        self.high_availability = Some(true);
        self.availability_type = Some(availability);
        self
    }

    pub fn private_ip(mut self, network: impl Into<String>) -> Self {
        self.ipv4_enabled = Some(false);
        self.private_network = Some(network.into());
        self
    }

    pub fn backups(mut self, start_time: impl Into<String>, retained: u32, log_retention_days: u32) -> Self {
        self.backup_enabled = Some(true);
        self.backup_start_time = Some(start_time.into());
        self.retained_backups = Some(retained);
        self.transaction_log_retention_days = Some(log_retention_days);
        self
    }

    pub fn deletion_protection(mut self, enabled: bool) -> Self {
        self.deletion_protection = Some(enabled);
        self
    }
}

impl ModuleConfig for CloudSqlVars {
    const FAMILY: ModuleFamily = ModuleFamily::CloudSql;

    fn validate(&self) -> VarsResult<()> {
        if self.project_id.is_empty() {
            return Err(VarsError::MissingField("project_id"));
        }
        if self.instance_name.is_empty() {
            return Err(VarsError::MissingField("instance_name"));
        }
        if let Some(version) = &self.database_version {
            if !version.starts_with(self.database_type.version_prefix()) {
                return Err(VarsError::InvalidShape(format!(
                    "database_version {} does not match engine {}",
                    version, self.database_type
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postgres_vars_render() {
        let vars = CloudSqlVars::new(
            "test-project",
            "europe-west1",
            "test",
            "postgres-test",
            DatabaseEngine::PostgreSql,
        )
        .version("POSTGRES_15")
        .tier("db-custom-2-4096")
        .to_vars()
        .unwrap();

        assert_eq!(vars.get("database_type").unwrap(), "postgresql");
        assert_eq!(vars.get("database_version").unwrap(), "POSTGRES_15");
        assert_eq!(vars.get("tier").unwrap(), "db-custom-2-4096");
    }

    #[test]
    fn test_sqlserver_vars_render() {
        let vars = CloudSqlVars::new(
            "test-project",
            "europe-west1",
            "test",
            "sqlserver-test",
            DatabaseEngine::SqlServer,
        )
        .version("SQLSERVER_2019_STANDARD")
        .to_vars()
        .unwrap();

        assert_eq!(vars.get("database_type").unwrap(), "sqlserver");
        assert_eq!(vars.get("database_version").unwrap(), "SQLSERVER_2019_STANDARD");
    }

    #[test]
    fn test_version_engine_mismatch_rejected() {
        let result = CloudSqlVars::new(
            "test-project",
            "europe-west1",
            "test",
            "postgres-test",
            DatabaseEngine::PostgreSql,
        )
        .version("SQLSERVER_2019_STANDARD")
        .validate();

        assert!(matches!(result, Err(VarsError::InvalidShape(_))));
    }

    #[test]
    fn test_high_availability_sets_both_fields() {
        let vars = CloudSqlVars::new(
            "test-project",
            "europe-west1",
            "test",
            "ha-test",
            DatabaseEngine::PostgreSql,
        )
        .high_availability(AvailabilityType::Regional)
        .to_vars()
        .unwrap();

        assert_eq!(*vars.get("high_availability").unwrap(), true);
        assert_eq!(vars.get("availability_type").unwrap(), "REGIONAL");
    }

    #[test]
    fn test_private_ip_disables_ipv4() {
        let vars = CloudSqlVars::new(
            "test-project",
            "europe-west1",
            "test",
            "private-ip-test",
            DatabaseEngine::PostgreSql,
        )
        .private_ip("projects/test-project/global/networks/test-vpc")
        .to_vars()
        .unwrap();

        assert_eq!(*vars.get("ipv4_enabled").unwrap(), false);
        assert!(vars.contains("private_network"));
    }

    #[test]
    fn test_backup_policy() {
        let vars = CloudSqlVars::new(
            "test-project",
            "europe-west1",
            "test",
            "backup-test",
            DatabaseEngine::PostgreSql,
        )
        .backups("03:00", 14, 7)
        .to_vars()
        .unwrap();

        assert_eq!(*vars.get("backup_enabled").unwrap(), true);
        assert_eq!(vars.get("backup_start_time").unwrap(), "03:00");
        assert_eq!(*vars.get("retained_backups").unwrap(), 14);
        assert_eq!(*vars.get("transaction_log_retention_days").unwrap(), 7);
    }
}
