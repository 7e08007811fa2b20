//! Pipeline orchestration.
//!
//! Sequences the three adapter stages (extract, evaluate, generate) under
//! the security gate: code generation runs if and only if the evaluator
//! approved the specification. Everything else fails closed.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::timeout;
use tracing::{info, warn};
use uuid::Uuid;

use veriform_iac::{parse_sections, CodeGenerator, ProviderSections};
use veriform_policy::{SecurityEvaluator, SecurityReport, Verdict};
use veriform_spec::{InfrastructureSpec, SpecExtractor};

use crate::error::{CoreError, CoreResult};

/// Terminal outcome of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// Code was generated and parsed into sections.
    Generated,
    /// The evaluator rejected the specification; generation was withheld.
    Blocked,
    /// No code exists, due to an adapter failure or an inconclusive verdict.
    NotGenerated,
}

/// Why a run ended `NotGenerated`.
///
/// Kept distinct internally even though all causes collapse to the same
/// external outcome; callers that later need the distinction can read it
/// without a wire-format change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotGeneratedCause {
    /// The extraction adapter failed or timed out; no spec exists.
    ExtractionFailed,
    /// The evaluation adapter failed or timed out; no verdict was reached.
    EvaluationFailed,
    /// The evaluator answered, but with an unrecognisable verdict.
    IndeterminateVerdict,
    /// The spec was approved but the generation adapter failed or timed out.
    GenerationFailed,
}

/// Result of one pipeline run. Created fresh per request, never shared.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub request_id: Uuid,
    pub outcome: PipelineOutcome,
    pub cause: Option<NotGeneratedCause>,
    pub spec: Option<InfrastructureSpec>,
    pub report: Option<SecurityReport>,
    pub artifact: Option<String>,
    pub sections: ProviderSections,
    pub message: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl PipelineResult {
    fn begin() -> Self {
        let now = Utc::now();
        Self {
            request_id: Uuid::new_v4(),
            outcome: PipelineOutcome::NotGenerated,
            cause: None,
            spec: None,
            report: None,
            artifact: None,
            sections: ProviderSections::new(),
            message: String::new(),
            started_at: now,
            completed_at: now,
        }
    }

    fn finish(
        mut self,
        outcome: PipelineOutcome,
        cause: Option<NotGeneratedCause>,
        message: impl Into<String>,
    ) -> Self {
        self.outcome = outcome;
        self.cause = cause;
        self.message = message.into();
        self.completed_at = Utc::now();
        self
    }

    pub fn is_generated(&self) -> bool {
        self.outcome == PipelineOutcome::Generated
    }
}

/// Per-stage call timeouts.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub extract_timeout: Duration,
    pub evaluate_timeout: Duration,
    pub generate_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            extract_timeout: Duration::from_secs(30),
            evaluate_timeout: Duration::from_secs(15),
            generate_timeout: Duration::from_secs(60),
        }
    }
}

impl PipelineConfig {
    pub fn with_extract_timeout(mut self, timeout: Duration) -> Self {
        self.extract_timeout = timeout;
        self
    }

    pub fn with_evaluate_timeout(mut self, timeout: Duration) -> Self {
        self.evaluate_timeout = timeout;
        self
    }

    pub fn with_generate_timeout(mut self, timeout: Duration) -> Self {
        self.generate_timeout = timeout;
        self
    }
}

/// Orchestrates extraction, evaluation and generation for one request.
///
/// The orchestrator is shared across concurrent requests behind `Arc`; all
/// intermediate state lives in request-scoped locals, so runs cannot
/// observe each other. Dropping the future returned by [`run`](Self::run)
/// abandons the request without side effects.
pub struct PipelineOrchestrator {
    extractor: Arc<dyn SpecExtractor>,
    evaluator: Arc<dyn SecurityEvaluator>,
    generator: Arc<dyn CodeGenerator>,
    config: PipelineConfig,
}

impl PipelineOrchestrator {
    pub fn new(
        extractor: Arc<dyn SpecExtractor>,
        evaluator: Arc<dyn SecurityEvaluator>,
        generator: Arc<dyn CodeGenerator>,
    ) -> Self {
        Self {
            extractor,
            evaluator,
            generator,
            config: PipelineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Run the full pipeline for one description.
    ///
    /// Returns `Err` only for unrecoverable input (empty description).
    /// Adapter failures and rejections come back as a `PipelineResult`.
    pub async fn run(&self, description: &str) -> CoreResult<PipelineResult> {
        if description.trim().is_empty() {
            return Err(CoreError::EmptyDescription);
        }

        let mut result = PipelineResult::begin();
        info!(request_id = %result.request_id, "Pipeline started");

        // Extracting
        let spec = match timeout(
            self.config.extract_timeout,
            self.extractor.extract(description),
        )
        .await
        {
            Ok(Ok(spec)) => spec,
            Ok(Err(e)) => {
                warn!(request_id = %result.request_id, "Extraction failed: {}", e);
                return Ok(result.finish(
                    PipelineOutcome::NotGenerated,
                    Some(NotGeneratedCause::ExtractionFailed),
                    "Not generated: could not extract an infrastructure specification",
                ));
            }
            Err(_) => {
                warn!(request_id = %result.request_id, "Extraction timed out");
                return Ok(result.finish(
                    PipelineOutcome::NotGenerated,
                    Some(NotGeneratedCause::ExtractionFailed),
                    "Not generated: specification extraction timed out",
                ));
            }
        };
        result.spec = Some(spec.clone());

        // Evaluating
        let evaluation = match timeout(
            self.config.evaluate_timeout,
            self.evaluator.evaluate(&spec),
        )
        .await
        {
            Ok(Ok(evaluation)) => evaluation,
            Ok(Err(e)) => {
                warn!(request_id = %result.request_id, "Evaluation failed: {}", e);
                return Ok(result.finish(
                    PipelineOutcome::NotGenerated,
                    Some(NotGeneratedCause::EvaluationFailed),
                    "Not generated: security evaluation error",
                ));
            }
            Err(_) => {
                warn!(request_id = %result.request_id, "Evaluation timed out");
                return Ok(result.finish(
                    PipelineOutcome::NotGenerated,
                    Some(NotGeneratedCause::EvaluationFailed),
                    "Not generated: security evaluation timed out",
                ));
            }
        };
        info!(
            request_id = %result.request_id,
            verdict = %evaluation.verdict,
            score = evaluation.report.score,
            "Security evaluation complete"
        );
        result.report = Some(evaluation.report);

        // Gate: generation happens only on an explicit approval.
        match evaluation.verdict {
            Verdict::Approved => {}
            Verdict::Rejected => {
                return Ok(result.finish(
                    PipelineOutcome::Blocked,
                    None,
                    "Generation blocked for security reasons",
                ));
            }
            Verdict::Indeterminate => {
                // Fail closed: an ambiguous evaluator is never an approval.
                return Ok(result.finish(
                    PipelineOutcome::NotGenerated,
                    Some(NotGeneratedCause::IndeterminateVerdict),
                    "Not generated: security evaluation was inconclusive",
                ));
            }
        }

        // Generating
        let artifact = match timeout(
            self.config.generate_timeout,
            self.generator.generate(&spec),
        )
        .await
        {
            Ok(Ok(artifact)) => artifact,
            Ok(Err(e)) => {
                warn!(request_id = %result.request_id, "Generation failed: {}", e);
                return Ok(result.finish(
                    PipelineOutcome::NotGenerated,
                    Some(NotGeneratedCause::GenerationFailed),
                    "Not generated: code generation error",
                ));
            }
            Err(_) => {
                warn!(request_id = %result.request_id, "Generation timed out");
                return Ok(result.finish(
                    PipelineOutcome::NotGenerated,
                    Some(NotGeneratedCause::GenerationFailed),
                    "Not generated: code generation timed out",
                ));
            }
        };

        result.sections = parse_sections(&artifact);
        if result.sections.is_empty() {
            // A generated result must carry at least one section; a blank
            // artifact is a generator failure, not a success.
            warn!(request_id = %result.request_id, "Generator produced an empty artifact");
            return Ok(result.finish(
                PipelineOutcome::NotGenerated,
                Some(NotGeneratedCause::GenerationFailed),
                "Not generated: code generation error",
            ));
        }
        result.artifact = Some(artifact);

        info!(
            request_id = %result.request_id,
            sections = result.sections.len(),
            "Pipeline complete"
        );
        Ok(result.finish(
            PipelineOutcome::Generated,
            None,
            "Infrastructure generated successfully",
        ))
    }
}
