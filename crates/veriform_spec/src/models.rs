//! Data models for extracted infrastructure specifications.

use serde::{Deserialize, Serialize};

use crate::error::{SpecError, SpecResult};

/// Supported cloud providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CloudProvider {
    Aws,
    Azure,
    Gcp,
    OpenStack,
}

impl CloudProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            CloudProvider::Aws => "aws",
            CloudProvider::Azure => "azure",
            CloudProvider::Gcp => "gcp",
            CloudProvider::OpenStack => "openstack",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "aws" => Some(CloudProvider::Aws),
            "azure" => Some(CloudProvider::Azure),
            "gcp" => Some(CloudProvider::Gcp),
            "openstack" => Some(CloudProvider::OpenStack),
            _ => None,
        }
    }

    pub fn all() -> Vec<Self> {
        vec![
            CloudProvider::Aws,
            CloudProvider::Azure,
            CloudProvider::Gcp,
            CloudProvider::OpenStack,
        ]
    }
}

impl std::fmt::Display for CloudProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Risky intents detected in the user's request.
///
/// The extractor records what the user asked for; the security evaluator
/// decides whether each request is downgraded to a safe equivalent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskRequests {
    /// Database reachable from the public internet.
    #[serde(default)]
    pub public_database: bool,
    /// Storage without encryption at rest.
    #[serde(default)]
    pub unencrypted_storage: bool,
    /// SSH open to 0.0.0.0/0.
    #[serde(default)]
    pub open_ssh: bool,
}

impl RiskRequests {
    /// Whether any risky request was recorded.
    pub fn any(&self) -> bool {
        self.public_database || self.unencrypted_storage || self.open_ssh
    }
}

/// Requested infrastructure for a single cloud provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub provider: CloudProvider,
    #[serde(default)]
    pub servers: u32,
    #[serde(default)]
    pub databases: u32,
    #[serde(default)]
    pub networks: u32,
    #[serde(default)]
    pub load_balancers: u32,
    #[serde(default)]
    pub security_groups: u32,
    #[serde(default)]
    pub requests: RiskRequests,
}

impl ProviderConfig {
    /// Create a config for a provider with everything zeroed.
    pub fn new(provider: CloudProvider) -> Self {
        Self {
            provider,
            servers: 0,
            databases: 0,
            networks: 0,
            load_balancers: 0,
            security_groups: 0,
            requests: RiskRequests::default(),
        }
    }

    pub fn with_servers(mut self, servers: u32) -> Self {
        self.servers = servers;
        self
    }

    pub fn with_databases(mut self, databases: u32) -> Self {
        self.databases = databases;
        self
    }

    pub fn with_networks(mut self, networks: u32) -> Self {
        self.networks = networks;
        self
    }

    pub fn with_load_balancers(mut self, load_balancers: u32) -> Self {
        self.load_balancers = load_balancers;
        self
    }

    pub fn with_security_groups(mut self, security_groups: u32) -> Self {
        self.security_groups = security_groups;
        self
    }

    pub fn with_requests(mut self, requests: RiskRequests) -> Self {
        self.requests = requests;
        self
    }

    /// Total resource count across all categories.
    pub fn resource_count(&self) -> u32 {
        self.servers + self.databases + self.networks + self.load_balancers + self.security_groups
    }
}

/// An extracted infrastructure specification.
///
/// Always carries a list of provider configs; a single-cloud plan is a list
/// of length one. Insertion order is preserved through the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfrastructureSpec {
    pub providers: Vec<ProviderConfig>,
}

impl InfrastructureSpec {
    /// Create a single-provider spec.
    pub fn single(config: ProviderConfig) -> Self {
        Self {
            providers: vec![config],
        }
    }

    /// Create a multi-provider spec.
    pub fn multi(providers: Vec<ProviderConfig>) -> Self {
        Self { providers }
    }

    /// Whether this is a multi-cloud plan.
    pub fn is_multi_cloud(&self) -> bool {
        self.providers.len() > 1
    }

    /// Parse extractor output into the canonical list shape.
    ///
    /// Accepts the three shapes extractors have produced over time: a bare
    /// provider object, a bare array of provider objects, and an object
    /// wrapping a `providers` array. Everything converges here so the rest
    /// of the pipeline only ever sees a list.
    pub fn from_extractor_json(raw: &str) -> SpecResult<Self> {
        let value: serde_json::Value = serde_json::from_str(raw.trim())
            .map_err(|e| SpecError::MalformedOutput(format!("invalid JSON: {}", e)))?;

        let spec = if value.is_array() {
            let providers: Vec<ProviderConfig> = serde_json::from_value(value)?;
            Self { providers }
        } else if value.is_object() {
            if value.get("providers").is_some() {
                serde_json::from_value(value)?
            } else {
                let config: ProviderConfig = serde_json::from_value(value)?;
                Self::single(config)
            }
        } else {
            return Err(SpecError::MalformedOutput(format!(
                "expected object or array, got {}",
                value
            )));
        };

        if spec.providers.is_empty() {
            return Err(SpecError::EmptySpec);
        }
        Ok(spec)
    }
}
