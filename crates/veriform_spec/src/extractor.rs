//! Specification extraction contract and command-based transport.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{SpecError, SpecResult};
use crate::models::InfrastructureSpec;

/// Contract for turning a natural-language description into a specification.
///
/// Implementations own the transport (in-process call, subprocess, remote
/// API); callers only see a typed result or a typed error.
#[async_trait]
pub trait SpecExtractor: Send + Sync {
    async fn extract(&self, description: &str) -> SpecResult<InfrastructureSpec>;
}

/// Extractor that delegates to an external command.
///
/// The description is written to the command's stdin; the command must print
/// the specification as JSON on stdout. Input travels through the process
/// pipe rather than a shared temp file, so concurrent requests cannot
/// observe each other's data.
pub struct CommandExtractor {
    program: String,
    args: Vec<String>,
}

impl CommandExtractor {
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

    /// Build from a single shell-style string, e.g. `"python3 extract.py"`.
    pub fn from_command_line(line: &str) -> SpecResult<Self> {
        let mut parts = line.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| SpecError::NotConfigured("empty extractor command".to_string()))?;
        Ok(Self::new(program).with_args(parts.map(String::from).collect()))
    }
}

#[async_trait]
impl SpecExtractor for CommandExtractor {
    async fn extract(&self, description: &str) -> SpecResult<InfrastructureSpec> {
        debug!("Running extractor command: {}", self.program);

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| SpecError::CommandFailed(format!("{}: {}", self.program, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(description.as_bytes()).await?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| SpecError::CommandFailed(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!("Extractor command exited non-zero: {}", stderr.trim());
            return Err(SpecError::CommandFailed(format!(
                "exit status {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        InfrastructureSpec::from_extractor_json(&stdout)
    }
}
