//! Load balancer module variables.

use serde::{Deserialize, Serialize};

use crate::error::{VarsError, VarsResult};
use crate::varmap::{ModuleConfig, ModuleFamily};

/// SSL policy profile names accepted by the load balancer module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SslProfile {
    Compatible,
    Modern,
    Restricted,
}

impl SslProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            SslProfile::Compatible => "COMPATIBLE",
            SslProfile::Modern => "MODERN",
            SslProfile::Restricted => "RESTRICTED",
        }
    }
}

impl std::fmt::Display for SslProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A backend attached to the balanced service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Backend {
    pub group: String,
    pub balancing_mode: String,
    pub capacity_scaler: f64,
}

impl Backend {
    pub fn new(group: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            balancing_mode: "UTILIZATION".to_string(),
            capacity_scaler: 1.0,
        }
    }

    pub fn balancing_mode(mut self, mode: impl Into<String>) -> Self {
        self.balancing_mode = mode.into();
        self
    }

    pub fn capacity_scaler(mut self, scaler: f64) -> Self {
        self.capacity_scaler = scaler;
        self
    }
}

/// A host-to-backend routing rule in the URL map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlMapRule {
    pub hosts: Vec<String>,
    pub path_matcher: String,
    pub backend: String,
}

/// Health check parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheck {
    pub check_interval_sec: u32,
    pub timeout_sec: u32,
    pub healthy_threshold: u32,
    pub unhealthy_threshold: u32,
    pub request_path: String,
    pub port: u16,
}

impl Default for HealthCheck {
    fn default() -> Self {
        Self {
            check_interval_sec: 10,
            timeout_sec: 5,
            healthy_threshold: 2,
            unhealthy_threshold: 3,
            request_path: "/health".to_string(),
            port: 8080,
        }
    }
}

/// CDN caching policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CdnPolicy {
    pub cache_mode: String,
    pub default_ttl: u32,
    pub max_ttl: u32,
    pub negative_caching: bool,
    pub serve_while_stale: u32,
}

impl Default for CdnPolicy {
    fn default() -> Self {
        Self {
            cache_mode: "CACHE_ALL_STATIC".to_string(),
            default_ttl: 3600,
            max_ttl: 86400,
            negative_caching: true,
            serve_while_stale: 86400,
        }
    }
}

/// Variables accepted by the load balancer module family: HTTPS wiring,
/// SSL profile, backends, URL-map rules, health check, and CDN policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadBalancerVars {
    pub project_id: String,
    pub region: String,
    pub environment: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_https: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssl_policy: Option<SslProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_tls_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backends: Option<Vec<Backend>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_map_rules: Option<Vec<UrlMapRule>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_check: Option<HealthCheck>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_cdn: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cdn_policy: Option<CdnPolicy>,
}

impl LoadBalancerVars {
    pub fn new(
        project_id: impl Into<String>,
        region: impl Into<String>,
        environment: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            region: region.into(),
            environment: environment.into(),
            name: name.into(),
            enable_https: None,
            ssl_policy: None,
            min_tls_version: None,
            backends: None,
            url_map_rules: None,
            health_check: None,
            enable_cdn: None,
            cdn_policy: None,
        }
    }

    pub fn https(mut self, profile: SslProfile) -> Self {
        self.enable_https = Some(true);
        self.ssl_policy = Some(profile);
        self
    }

    pub fn min_tls(mut self, version: impl Into<String>) -> Self {
        self.min_tls_version = Some(version.into());
        self
    }

    pub fn backend(mut self, backend: Backend) -> Self {
        self.backends.get_or_insert_with(Vec::new).push(backend);
        self
    }

    pub fn url_map_rule(mut self, rule: UrlMapRule) -> Self {
        self.url_map_rules.get_or_insert_with(Vec::new).push(rule);
        self
    }

    pub fn health_check(mut self, check: HealthCheck) -> Self {
        self.health_check = Some(check);
        self
    }

    pub fn cdn(mut self, policy: CdnPolicy) -> Self {
        self.enable_cdn = Some(true);
        self.cdn_policy = Some(policy);
        self
    }
}

impl ModuleConfig for LoadBalancerVars {
    const FAMILY: ModuleFamily = ModuleFamily::LoadBalancer;

    fn validate(&self) -> VarsResult<()> {
        if self.project_id.is_empty() {
            return Err(VarsError::MissingField("project_id"));
        }
        if self.name.is_empty() {
            return Err(VarsError::MissingField("name"));
        }
        if let Some(backends) = &self.backends {
            for backend in backends {
                if backend.group.is_empty() {
                    return Err(VarsError::InvalidShape(
                        "backend with empty instance group".to_string(),
                    ));
                }
                if !(0.0..=1.0).contains(&backend.capacity_scaler) {
                    return Err(VarsError::InvalidShape(format!(
                        "capacity_scaler {} outside [0.0, 1.0]",
                        backend.capacity_scaler
                    )));
                }
            }
        }
        if let Some(check) = &self.health_check {
            if check.healthy_threshold == 0 || check.unhealthy_threshold == 0 {
                return Err(VarsError::InvalidShape(
                    "health check thresholds must be positive".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_https_profile_renders_uppercase() {
        let vars = LoadBalancerVars::new("test-project", "europe-west1", "test", "https-lb-test")
            .https(SslProfile::Modern)
            .min_tls("TLS_1_2")
            .to_vars()
            .unwrap();

        assert_eq!(*vars.get("enable_https").unwrap(), true);
        assert_eq!(vars.get("ssl_policy").unwrap(), "MODERN");
        assert_eq!(vars.get("min_tls_version").unwrap(), "TLS_1_2");
    }

    #[test]
    fn test_backend_list_renders_nested() {
        let vars = LoadBalancerVars::new("test-project", "europe-west1", "test", "backend-test")
            .backend(Backend::new(
                "projects/test-project/regions/europe-west1/instanceGroups/app-a-mig",
            ))
            .to_vars()
            .unwrap();

        let backends = vars.get("backends").unwrap();
        assert_eq!(backends[0]["balancing_mode"], "UTILIZATION");
        assert_eq!(backends[0]["capacity_scaler"], 1.0);
    }

    #[test]
    fn test_url_map_rules() {
        let vars = LoadBalancerVars::new("test-project", "europe-west1", "test", "url-map-test")
            .url_map_rule(UrlMapRule {
                hosts: vec!["app-a.example.com".to_string()],
                path_matcher: "app-a-paths".to_string(),
                backend: "app-a-backend".to_string(),
            })
            .url_map_rule(UrlMapRule {
                hosts: vec!["app-b.example.com".to_string()],
                path_matcher: "app-b-paths".to_string(),
                backend: "app-b-backend".to_string(),
            })
            .to_vars()
            .unwrap();

        let rules = vars.get("url_map_rules").unwrap();
        assert_eq!(rules.as_array().unwrap().len(), 2);
        assert_eq!(rules[1]["hosts"][0], "app-b.example.com");
    }

    #[test]
    fn test_rejects_capacity_scaler_out_of_range() {
        let result = LoadBalancerVars::new("test-project", "europe-west1", "test", "backend-test")
            .backend(Backend::new("group").capacity_scaler(1.5))
            .validate();

        assert!(matches!(result, Err(VarsError::InvalidShape(_))));
    }

    #[test]
    fn test_cdn_policy_defaults() {
        let vars = LoadBalancerVars::new("test-project", "europe-west1", "test", "cdn-test")
            .cdn(CdnPolicy::default())
            .to_vars()
            .unwrap();

        assert_eq!(*vars.get("enable_cdn").unwrap(), true);
        let policy = vars.get("cdn_policy").unwrap();
        assert_eq!(policy["cache_mode"], "CACHE_ALL_STATIC");
        assert_eq!(policy["max_ttl"], 86400);
    }
}
