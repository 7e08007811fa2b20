//! Built-in rule-based security evaluator.
//!
//! Re-expresses the platform's baseline policies over the extracted
//! specification: structural checks become scored violations, and risky
//! requests are downgraded to safe equivalents instead of being silently
//! honored.

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use veriform_spec::{InfrastructureSpec, ProviderConfig};

use crate::error::{PolicyError, PolicyResult};
use crate::evaluator::{Evaluation, SecurityEvaluator};
use crate::report::{DangerousRequest, SecurityReport, Severity, Violation};
use crate::verdict::Verdict;

/// Structural checks a rule can run against one provider config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCheck {
    /// Servers requested without any security group.
    ComputeWithoutSecurityGroup,
    /// Databases requested without any security group.
    DatabaseWithoutSecurityGroup,
    /// Compute, database or load balancer resources without a network.
    ResourcesWithoutNetwork,
    /// Load balancer requested with no servers behind it.
    LoadBalancerWithoutServers,
}

impl RuleCheck {
    /// Whether the check fires for the given provider config.
    fn fires(&self, config: &ProviderConfig) -> bool {
        match self {
            RuleCheck::ComputeWithoutSecurityGroup => {
                config.servers > 0 && config.security_groups == 0
            }
            RuleCheck::DatabaseWithoutSecurityGroup => {
                config.databases > 0 && config.security_groups == 0
            }
            RuleCheck::ResourcesWithoutNetwork => {
                (config.servers + config.databases + config.load_balancers) > 0
                    && config.networks == 0
            }
            RuleCheck::LoadBalancerWithoutServers => {
                config.load_balancers > 0 && config.servers == 0
            }
        }
    }
}

/// A single policy rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    pub name: String,
    pub severity: Severity,
    pub check: RuleCheck,
    pub message: String,
    pub recommendation: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// A named set of rules with a rejection threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSet {
    pub name: String,
    /// Scores below this threshold are rejected.
    #[serde(default = "default_threshold")]
    pub threshold: u8,
    pub rules: Vec<Rule>,
}

fn default_threshold() -> u8 {
    70
}

impl RuleSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            threshold: default_threshold(),
            rules: Vec::new(),
        }
    }

    pub fn add(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.threshold = threshold;
        self
    }

    /// The baseline rule set applied when nothing else is configured.
    pub fn standard() -> Self {
        let mut set = Self::new("Standard Security Rules");

        set.add(Rule {
            id: "compute-without-security-group".to_string(),
            name: "Compute Behind Security Groups".to_string(),
            severity: Severity::High,
            check: RuleCheck::ComputeWithoutSecurityGroup,
            message: "servers requested without any security group".to_string(),
            recommendation: "add at least one security group restricting ingress".to_string(),
            enabled: true,
        });

        set.add(Rule {
            id: "database-without-security-group".to_string(),
            name: "Databases Behind Security Groups".to_string(),
            severity: Severity::Critical,
            check: RuleCheck::DatabaseWithoutSecurityGroup,
            message: "databases requested without any security group".to_string(),
            recommendation: "front databases with a security group allowing only app traffic"
                .to_string(),
            enabled: true,
        });

        set.add(Rule {
            id: "resources-without-network".to_string(),
            name: "Resources In Isolated Networks".to_string(),
            severity: Severity::High,
            check: RuleCheck::ResourcesWithoutNetwork,
            message: "resources requested without an isolated network".to_string(),
            recommendation: "provision at least one private network for the workload".to_string(),
            enabled: true,
        });

        set.add(Rule {
            id: "load-balancer-without-servers".to_string(),
            name: "Load Balancers Need Backends".to_string(),
            severity: Severity::Low,
            check: RuleCheck::LoadBalancerWithoutServers,
            message: "load balancer requested with no servers behind it".to_string(),
            recommendation: "add servers or drop the load balancer".to_string(),
            enabled: true,
        });

        set
    }

    /// Load a rule set from a YAML file.
    pub fn from_yaml_file(path: &Path) -> PolicyResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Parse a rule set from YAML.
    pub fn from_yaml_str(yaml: &str) -> PolicyResult<Self> {
        let set: RuleSet = serde_yaml::from_str(yaml)?;
        if set.rules.is_empty() {
            return Err(PolicyError::InvalidRule {
                rule: set.name,
                message: "rule set contains no rules".to_string(),
            });
        }
        Ok(set)
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::standard()
    }
}

/// In-process evaluator applying a [`RuleSet`] to a specification.
pub struct RuleEvaluator {
    rule_set: RuleSet,
}

impl RuleEvaluator {
    pub fn new(rule_set: RuleSet) -> Self {
        Self { rule_set }
    }

    pub fn standard() -> Self {
        Self::new(RuleSet::standard())
    }

    /// Collect downgrades for risky requests on one provider config.
    ///
    /// The requests are not honored: each one is recorded with the safe
    /// setting that will be applied instead, and generation proceeds with
    /// the downgraded configuration.
    fn downgrade_requests(config: &ProviderConfig) -> Vec<DangerousRequest> {
        let mut downgrades = Vec::new();
        let provider = config.provider;

        if config.requests.public_database {
            downgrades.push(DangerousRequest {
                requested: format!("{}: publicly accessible database", provider),
                reason: "databases must never be reachable from the internet".to_string(),
                applied: "database kept private".to_string(),
            });
        }

        if config.requests.unencrypted_storage {
            downgrades.push(DangerousRequest {
                requested: format!("{}: unencrypted storage", provider),
                reason: "data at rest must be encrypted".to_string(),
                applied: "encryption at rest enabled".to_string(),
            });
        }

        if config.requests.open_ssh {
            downgrades.push(DangerousRequest {
                requested: format!("{}: SSH open to 0.0.0.0/0", provider),
                reason: "SSH must only be reachable from trusted address ranges".to_string(),
                applied: "SSH ingress restricted".to_string(),
            });
        }

        downgrades
    }
}

/// Score deduction per downgraded request. Downgrades are safe after the
/// rewrite but still represent intent worth surfacing.
const DOWNGRADE_PENALTY: u8 = 5;

#[async_trait]
impl SecurityEvaluator for RuleEvaluator {
    async fn evaluate(&self, spec: &InfrastructureSpec) -> PolicyResult<Evaluation> {
        let mut violations = Vec::new();
        let mut dangerous_requests = Vec::new();

        for config in &spec.providers {
            for rule in &self.rule_set.rules {
                if !rule.enabled {
                    continue;
                }
                if rule.check.fires(config) {
                    debug!("Rule {} fired for {}", rule.id, config.provider);
                    violations.push(Violation {
                        rule: rule.id.clone(),
                        severity: rule.severity,
                        message: format!("{}: {}", config.provider, rule.message),
                        recommendation: rule.recommendation.clone(),
                    });
                }
            }

            dangerous_requests.extend(Self::downgrade_requests(config));
        }

        let penalty: u32 = violations
            .iter()
            .map(|v| v.severity.penalty() as u32)
            .sum::<u32>()
            + dangerous_requests.len() as u32 * DOWNGRADE_PENALTY as u32;
        let score = 100u32.saturating_sub(penalty) as u8;

        let verdict = if score < self.rule_set.threshold {
            Verdict::Rejected
        } else {
            Verdict::Approved
        };

        info!(
            "Security evaluation: {} (score {}, {} violations, {} downgrades)",
            verdict,
            score,
            violations.len(),
            dangerous_requests.len()
        );

        Ok(Evaluation {
            verdict,
            report: SecurityReport {
                violations,
                dangerous_requests,
                score,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veriform_spec::{CloudProvider, RiskRequests};

    fn well_formed() -> ProviderConfig {
        ProviderConfig::new(CloudProvider::Aws)
            .with_servers(3)
            .with_networks(1)
            .with_security_groups(1)
    }

    #[tokio::test]
    async fn test_clean_spec_approved_with_full_score() {
        let evaluator = RuleEvaluator::standard();
        let spec = InfrastructureSpec::single(well_formed());

        let evaluation = evaluator.evaluate(&spec).await.unwrap();
        assert_eq!(evaluation.verdict, Verdict::Approved);
        assert_eq!(evaluation.report.score, 100);
        assert!(evaluation.report.violations.is_empty());
    }

    #[tokio::test]
    async fn test_missing_security_group_and_network_rejected() {
        let evaluator = RuleEvaluator::standard();
        let spec = InfrastructureSpec::single(
            ProviderConfig::new(CloudProvider::Aws)
                .with_servers(2)
                .with_databases(1),
        );

        let evaluation = evaluator.evaluate(&spec).await.unwrap();
        // High + Critical + High deductions push the score below the
        // rejection threshold.
        assert_eq!(evaluation.verdict, Verdict::Rejected);
        assert_eq!(evaluation.report.violations.len(), 3);
        assert!(evaluation.report.score < 70);
    }

    #[tokio::test]
    async fn test_risky_requests_downgraded_not_rejected() {
        let evaluator = RuleEvaluator::standard();
        let spec = InfrastructureSpec::single(
            well_formed()
                .with_databases(1)
                .with_requests(RiskRequests {
                    public_database: true,
                    unencrypted_storage: true,
                    open_ssh: false,
                }),
        );

        let evaluation = evaluator.evaluate(&spec).await.unwrap();
        assert_eq!(evaluation.verdict, Verdict::Approved);
        assert_eq!(evaluation.report.dangerous_requests.len(), 2);
        assert_eq!(evaluation.report.score, 90);
        assert!(evaluation
            .report
            .dangerous_requests
            .iter()
            .any(|d| d.applied.contains("private")));
    }

    #[tokio::test]
    async fn test_multi_cloud_violations_carry_provider() {
        let evaluator = RuleEvaluator::standard();
        let spec = InfrastructureSpec::multi(vec![
            well_formed(),
            ProviderConfig::new(CloudProvider::Azure).with_load_balancers(1),
        ]);

        let evaluation = evaluator.evaluate(&spec).await.unwrap();
        assert!(evaluation
            .report
            .violations
            .iter()
            .all(|v| v.message.starts_with("azure:")));
    }

    #[test]
    fn test_rule_set_from_yaml() {
        let yaml = r#"
name: Custom Rules
threshold: 80
rules:
  - id: lb-backends
    name: Load Balancers Need Backends
    severity: low
    check: load_balancer_without_servers
    message: load balancer with no servers
    recommendation: add servers
"#;
        let set = RuleSet::from_yaml_str(yaml).unwrap();
        assert_eq!(set.threshold, 80);
        assert_eq!(set.rules.len(), 1);
        assert_eq!(set.rules[0].check, RuleCheck::LoadBalancerWithoutServers);
        assert!(set.rules[0].enabled);
    }

    #[test]
    fn test_empty_rule_set_invalid() {
        let yaml = "name: Empty\nrules: []\n";
        assert!(RuleSet::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn test_rule_set_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.yaml");
        let yaml = serde_yaml::to_string(&RuleSet::standard()).unwrap();
        std::fs::write(&path, yaml).unwrap();

        let set = RuleSet::from_yaml_file(&path).unwrap();
        assert_eq!(set.rules.len(), RuleSet::standard().rules.len());
    }
}
