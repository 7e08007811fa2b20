//! # veriform_core
//!
//! Pipeline orchestration for Veriform.
//!
//! The [`PipelineOrchestrator`] sequences the three adapter stages
//! (specification extraction, security evaluation, code generation) with a
//! fail-closed gate between evaluation and generation: code is generated if
//! and only if the evaluator returned an explicit approval. Rejections,
//! inconclusive verdicts, adapter errors and timeouts all terminate the
//! request without generation.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use veriform_core::PipelineOrchestrator;
//! use veriform_iac::TerraformGenerator;
//! use veriform_policy::RuleEvaluator;
//! use veriform_spec::CommandExtractor;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let orchestrator = PipelineOrchestrator::new(
//!     Arc::new(CommandExtractor::from_command_line("python3 extract.py")?),
//!     Arc::new(RuleEvaluator::standard()),
//!     Arc::new(TerraformGenerator::new()),
//! );
//!
//! let result = orchestrator.run("three servers on AWS").await?;
//! if result.is_generated() {
//!     for (provider, code) in result.sections.iter() {
//!         println!("## {provider}\n{code}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod pipeline;

pub use error::{CoreError, CoreResult};
pub use pipeline::{
    NotGeneratedCause, PipelineConfig, PipelineOrchestrator, PipelineOutcome, PipelineResult,
};
