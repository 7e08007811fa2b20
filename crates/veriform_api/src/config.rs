//! Environment-driven configuration.

use std::path::PathBuf;
use std::time::Duration;

use veriform_core::PipelineConfig;

/// Service configuration, read from `VERIFORM_*` environment variables.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Bind address for the HTTP listener.
    pub bind: String,
    /// External extractor command; the LLM extractor is used when unset.
    pub extract_command: Option<String>,
    /// External evaluator command; the rule evaluator is used when unset.
    pub evaluate_command: Option<String>,
    /// External generator command; the Terraform renderer is used when unset.
    pub generate_command: Option<String>,
    /// Optional YAML rule set for the built-in evaluator.
    pub rules_file: Option<PathBuf>,
    pub extract_timeout: Duration,
    pub evaluate_timeout: Duration,
    pub generate_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        let defaults = PipelineConfig::default();
        Self {
            bind: "127.0.0.1:8080".to_string(),
            extract_command: None,
            evaluate_command: None,
            generate_command: None,
            rules_file: None,
            extract_timeout: defaults.extract_timeout,
            evaluate_timeout: defaults.evaluate_timeout,
            generate_timeout: defaults.generate_timeout,
        }
    }
}

fn env_duration(name: &str, fallback: Duration) -> Duration {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(fallback)
}

impl ApiConfig {
    /// Load configuration from the environment.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind: std::env::var("VERIFORM_BIND").unwrap_or(defaults.bind),
            extract_command: std::env::var("VERIFORM_EXTRACT_CMD").ok(),
            evaluate_command: std::env::var("VERIFORM_EVALUATE_CMD").ok(),
            generate_command: std::env::var("VERIFORM_GENERATE_CMD").ok(),
            rules_file: std::env::var("VERIFORM_RULES_FILE").ok().map(PathBuf::from),
            extract_timeout: env_duration("VERIFORM_EXTRACT_TIMEOUT_SECS", defaults.extract_timeout),
            evaluate_timeout: env_duration(
                "VERIFORM_EVALUATE_TIMEOUT_SECS",
                defaults.evaluate_timeout,
            ),
            generate_timeout: env_duration(
                "VERIFORM_GENERATE_TIMEOUT_SECS",
                defaults.generate_timeout,
            ),
        }
    }

    /// Per-stage timeouts for the pipeline.
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig::default()
            .with_extract_timeout(self.extract_timeout)
            .with_evaluate_timeout(self.evaluate_timeout)
            .with_generate_timeout(self.generate_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.bind, "127.0.0.1:8080");
        assert!(config.extract_command.is_none());
        assert_eq!(config.extract_timeout, Duration::from_secs(30));
    }
}
