//! Veriform API server entry point.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use veriform_api::{router, ApiConfig, AppState};
use veriform_core::PipelineOrchestrator;
use veriform_iac::{CodeGenerator, CommandGenerator, TerraformGenerator};
use veriform_policy::{CommandEvaluator, RuleEvaluator, RuleSet, SecurityEvaluator};
use veriform_spec::{CommandExtractor, LlmExtractor, SpecExtractor};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let log_result = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(
            EnvFilter::from_default_env()
                .add_directive("veriform=info".parse()?)
                .add_directive("warn".parse()?),
        )
        .try_init();

    if log_result.is_err() {
        // Logging already initialized, continue
    }

    let config = ApiConfig::from_env();

    let extractor: Arc<dyn SpecExtractor> = match &config.extract_command {
        Some(command) => Arc::new(
            CommandExtractor::from_command_line(command)
                .context("invalid VERIFORM_EXTRACT_CMD")?,
        ),
        None => Arc::new(LlmExtractor::from_env().context("no extractor configured")?),
    };

    let evaluator: Arc<dyn SecurityEvaluator> = match &config.evaluate_command {
        Some(command) => Arc::new(
            CommandEvaluator::from_command_line(command)
                .context("invalid VERIFORM_EVALUATE_CMD")?,
        ),
        None => match &config.rules_file {
            Some(path) => Arc::new(RuleEvaluator::new(
                RuleSet::from_yaml_file(path).context("invalid VERIFORM_RULES_FILE")?,
            )),
            None => Arc::new(RuleEvaluator::standard()),
        },
    };

    let generator: Arc<dyn CodeGenerator> = match &config.generate_command {
        Some(command) => Arc::new(
            CommandGenerator::from_command_line(command)
                .context("invalid VERIFORM_GENERATE_CMD")?,
        ),
        None => Arc::new(TerraformGenerator::new()),
    };

    let pipeline = PipelineOrchestrator::new(extractor, evaluator, generator)
        .with_config(config.pipeline_config());
    let app = router(Arc::new(AppState { pipeline }));

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    info!("Veriform API listening on {}", config.bind);

    axum::serve(listener, app).await.context("server failed")?;
    Ok(())
}
