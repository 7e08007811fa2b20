//! Code generation contract and command-based transport.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use veriform_spec::InfrastructureSpec;

use crate::error::{IacError, IacResult};

/// Contract for rendering a specification into a raw IaC artifact.
///
/// Only ever invoked for approved specifications; the gate lives in the
/// orchestrator, not here.
#[async_trait]
pub trait CodeGenerator: Send + Sync {
    async fn generate(&self, spec: &InfrastructureSpec) -> IacResult<String>;
}

/// Generator that delegates to an external command.
///
/// The spec is written as JSON to the command's stdin; the command prints
/// the artifact text on stdout.
pub struct CommandGenerator {
    program: String,
    args: Vec<String>,
}

impl CommandGenerator {
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
    pub fn from_command_line(line: &str) -> IacResult<Self> {
        let mut parts = line.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| IacError::NotConfigured("empty generator command".to_string()))?;
        Ok(Self::new(program).with_args(parts.map(String::from).collect()))
    }
}

#[async_trait]
impl CodeGenerator for CommandGenerator {
    async fn generate(&self, spec: &InfrastructureSpec) -> IacResult<String> {
        debug!("Running generator command: {}", self.program);

        let input = serde_json::to_vec(spec)
            .map_err(|e| IacError::CommandFailed(format!("spec serialization: {}", e)))?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| IacError::CommandFailed(format!("{}: {}", self.program, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(&input).await?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| IacError::CommandFailed(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!("Generator command exited non-zero: {}", stderr.trim());
            return Err(IacError::CommandFailed(format!(
                "exit status {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let artifact = String::from_utf8_lossy(&output.stdout).to_string();
        if artifact.trim().is_empty() {
            return Err(IacError::EmptyArtifact);
        }
        Ok(artifact)
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
    async fn test_command_generator_captures_stdout() {
        let generator = CommandGenerator::new("sh").with_args(vec![
            "-c".to_string(),
            "cat > /dev/null; printf 'resource {}\\n'".to_string(),
        ]);

        let artifact = generator.generate(&spec()).await.unwrap();
        assert_eq!(artifact, "resource {}\n");
    }

    #[tokio::test]
    async fn test_command_generator_empty_output_is_error() {
        let generator = CommandGenerator::new("sh")
            .with_args(vec!["-c".to_string(), "cat > /dev/null".to_string()]);

        let err = generator.generate(&spec()).await.unwrap_err();
        assert!(matches!(err, IacError::EmptyArtifact));
    }

    #[tokio::test]
    async fn test_command_generator_failure() {
        let generator = CommandGenerator::new("false");
        let err = generator.generate(&spec()).await.unwrap_err();
        assert!(matches!(err, IacError::CommandFailed(_)));
    }
}
