//! `veriform generate` command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use serde_json::json;

use veriform_core::{CoreError, PipelineOrchestrator, PipelineOutcome};
use veriform_iac::{CodeGenerator, CommandGenerator, TerraformGenerator};
use veriform_policy::{CommandEvaluator, RuleEvaluator, RuleSet, SecurityEvaluator};
use veriform_spec::{CommandExtractor, LlmExtractor, SpecExtractor};

use crate::ExitCodes;

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Natural-language infrastructure description
    pub description: String,

    /// External extractor command (defaults to the LLM extractor)
    #[arg(long, env = "VERIFORM_EXTRACT_CMD")]
    pub extract_cmd: Option<String>,

    /// External evaluator command (defaults to the built-in rule evaluator)
    #[arg(long, env = "VERIFORM_EVALUATE_CMD")]
    pub evaluate_cmd: Option<String>,

    /// External generator command (defaults to the Terraform renderer)
    #[arg(long, env = "VERIFORM_GENERATE_CMD")]
    pub generate_cmd: Option<String>,

    /// YAML rule set for the built-in evaluator
    #[arg(long, env = "VERIFORM_RULES_FILE")]
    pub rules: Option<PathBuf>,

    /// Emit machine-readable JSON instead of human output
    #[arg(long)]
    pub json: bool,
}

pub async fn execute(args: GenerateArgs) -> anyhow::Result<u8> {
    let extractor: Arc<dyn SpecExtractor> = match &args.extract_cmd {
        Some(command) => Arc::new(
            CommandExtractor::from_command_line(command).context("invalid extractor command")?,
        ),
        None => Arc::new(LlmExtractor::from_env().context("no extractor configured")?),
    };

    let evaluator: Arc<dyn SecurityEvaluator> = match &args.evaluate_cmd {
        Some(command) => Arc::new(
            CommandEvaluator::from_command_line(command).context("invalid evaluator command")?,
        ),
        None => match &args.rules {
            Some(path) => Arc::new(RuleEvaluator::new(
                RuleSet::from_yaml_file(path).context("invalid rule set")?,
            )),
            None => Arc::new(RuleEvaluator::standard()),
        },
    };

    let generator: Arc<dyn CodeGenerator> = match &args.generate_cmd {
        Some(command) => Arc::new(
            CommandGenerator::from_command_line(command).context("invalid generator command")?,
        ),
        None => Arc::new(TerraformGenerator::new()),
    };

    let pipeline = PipelineOrchestrator::new(extractor, evaluator, generator);

    let result = match pipeline.run(&args.description).await {
        Ok(result) => result,
        Err(CoreError::EmptyDescription) => {
            anyhow::bail!("description must not be empty")
        }
    };

    if args.json {
        print_json(&result)?;
    } else {
        print_human(&result);
    }

    Ok(match result.outcome {
        PipelineOutcome::Generated => ExitCodes::SUCCESS,
        PipelineOutcome::Blocked => ExitCodes::POLICY_BLOCKED,
        PipelineOutcome::NotGenerated => ExitCodes::NOT_GENERATED,
    })
}

fn print_json(result: &veriform_core::PipelineResult) -> anyhow::Result<()> {
    let sections: Vec<_> = result
        .sections
        .iter()
        .map(|(provider, code)| json!({ "provider": provider, "code": code }))
        .collect();

    let body = json!({
        "success": result.is_generated(),
        "message": result.message,
        "infrastructure": result.spec,
        "sections": sections,
        "security_report": result.report.as_ref().map(|report| json!({
            "violations": report.violations,
            "dangerous_requests": report.dangerous_requests,
            "total_issues": report.total_issues(),
            "security_score": report.score,
        })),
    });

    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

fn print_human(result: &veriform_core::PipelineResult) {
    println!("{}", result.message);

    if let Some(report) = &result.report {
        println!("Security score: {} (grade {})", report.score, report.grade());

        for violation in &report.violations {
            println!("  violation [{:?}] {}", violation.severity, violation.message);
            println!("    recommendation: {}", violation.recommendation);
        }
        for request in &report.dangerous_requests {
            println!("  downgraded: {} -> {}", request.requested, request.applied);
            println!("    reason: {}", request.reason);
        }
    }

    for (provider, code) in result.sections.iter() {
        println!("\n----- {} -----", provider);
        println!("{}", code);
    }
}
