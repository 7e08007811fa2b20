//! Security evaluation contract and command-based transport.

use std::process::Stdio;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use veriform_spec::InfrastructureSpec;

use crate::error::{PolicyError, PolicyResult};
use crate::report::SecurityReport;
use crate::verdict::Verdict;

/// Result of a security evaluation: the gate decision plus its report.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub verdict: Verdict,
    pub report: SecurityReport,
}

impl Evaluation {
    pub fn approved(report: SecurityReport) -> Self {
        Self {
            verdict: Verdict::Approved,
            report,
        }
    }

    pub fn rejected(report: SecurityReport) -> Self {
        Self {
            verdict: Verdict::Rejected,
            report,
        }
    }
}

/// Contract for evaluating a specification against security policy.
#[async_trait]
pub trait SecurityEvaluator: Send + Sync {
    async fn evaluate(&self, spec: &InfrastructureSpec) -> PolicyResult<Evaluation>;
}

/// Wire shape emitted by external evaluator commands.
///
/// Matches the historical evaluator output: a raw status token plus
/// whichever report fields the evaluator chose to include.
#[derive(Debug, Deserialize)]
struct CommandVerdict {
    #[serde(default)]
    status: String,
    #[serde(default)]
    score: u8,
    #[serde(default)]
    violations: Vec<crate::report::Violation>,
    #[serde(default)]
    dangerous_requests: Vec<crate::report::DangerousRequest>,
}

/// Evaluator that delegates to an external command.
///
/// The spec is written as JSON to the command's stdin; the command must
/// print a JSON object with a `status` token on stdout. The token goes
/// through [`Verdict::from_status_token`], the single fail-closed parsing
/// boundary, so an evaluator that prints anything unexpected yields
/// `Indeterminate` rather than an approval.
pub struct CommandEvaluator {
    program: String,
    args: Vec<String>,
}

impl CommandEvaluator {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Build from a single shell-style string.
    pub fn from_command_line(line: &str) -> PolicyResult<Self> {
        let mut parts = line.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| PolicyError::NotConfigured("empty evaluator command".to_string()))?;
        Ok(Self::new(program).with_args(parts.map(String::from).collect()))
    }
}

#[async_trait]
impl SecurityEvaluator for CommandEvaluator {
    async fn evaluate(&self, spec: &InfrastructureSpec) -> PolicyResult<Evaluation> {
        debug!("Running evaluator command: {}", self.program);

        let input = serde_json::to_vec(spec)?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| PolicyError::CommandFailed(format!("{}: {}", self.program, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(&input).await?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| PolicyError::CommandFailed(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!("Evaluator command exited non-zero: {}", stderr.trim());
            return Err(PolicyError::CommandFailed(format!(
                "exit status {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let parsed: CommandVerdict = serde_json::from_str(stdout.trim())
            .map_err(|e| PolicyError::MalformedOutput(format!("invalid JSON: {}", e)))?;

        // The status token is interpreted in exactly one place. A missing
        // or garbled token comes back Indeterminate, never Approved.
        let verdict = Verdict::from_status_token(&parsed.status);

        let report = SecurityReport {
            violations: parsed.violations,
            dangerous_requests: parsed.dangerous_requests,
            score: parsed.score,
        };

        Ok(Evaluation { verdict, report })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veriform_spec::{CloudProvider, ProviderConfig};

    fn spec() -> InfrastructureSpec {
        InfrastructureSpec::single(ProviderConfig::new(CloudProvider::Aws).with_servers(1))
    }

    #[tokio::test]
    async fn test_command_evaluator_ok_token() {
        // `cat` is not a real evaluator, so feed it via a shell echo instead.
        let evaluator = CommandEvaluator::new("sh").with_args(vec![
            "-c".to_string(),
            r#"cat > /dev/null; echo '{"status": "OK", "score": 92}'"#.to_string(),
        ]);

        let evaluation = evaluator.evaluate(&spec()).await.unwrap();
        assert_eq!(evaluation.verdict, Verdict::Approved);
        assert_eq!(evaluation.report.score, 92);
    }

    #[tokio::test]
    async fn test_command_evaluator_unknown_token_fails_closed() {
        let evaluator = CommandEvaluator::new("sh").with_args(vec![
            "-c".to_string(),
            r#"cat > /dev/null; echo '{"status": "MAYBE"}'"#.to_string(),
        ]);

        let evaluation = evaluator.evaluate(&spec()).await.unwrap();
        assert_eq!(evaluation.verdict, Verdict::Indeterminate);
    }

    #[tokio::test]
    async fn test_command_evaluator_garbage_is_error() {
        let evaluator = CommandEvaluator::new("sh").with_args(vec![
            "-c".to_string(),
            "cat > /dev/null; echo not-json".to_string(),
        ]);

        let err = evaluator.evaluate(&spec()).await.unwrap_err();
        assert!(matches!(err, PolicyError::MalformedOutput(_)));
    }

    #[tokio::test]
    async fn test_command_evaluator_report_fields() {
        let evaluator = CommandEvaluator::new("sh").with_args(vec![
            "-c".to_string(),
            r#"cat > /dev/null; echo '{"status": "NOT_OK", "violations": [{"rule": "r1", "severity": "high", "message": "m", "recommendation": "fix"}]}'"#
                .to_string(),
        ]);

        let evaluation = evaluator.evaluate(&spec()).await.unwrap();
        assert_eq!(evaluation.verdict, Verdict::Rejected);
        assert_eq!(evaluation.report.violations.len(), 1);
        assert_eq!(evaluation.report.violations[0].rule, "r1");
    }
}
