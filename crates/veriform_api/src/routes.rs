//! HTTP routes for the generation pipeline.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use veriform_core::{CoreError, NotGeneratedCause, PipelineOrchestrator};

use crate::response::{ErrorResponse, GenerateResponse};

/// Shared application state. The orchestrator is the only shared piece;
/// every request's intermediate data is request-scoped inside it.
pub struct AppState {
    pub pipeline: PipelineOrchestrator,
}

/// Request body for `POST /generate`.
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub description: String,
}

/// Build the service router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/generate", post(post_generate).get(get_generate))
        .with_state(state)
}

async fn post_generate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GenerateRequest>,
) -> Response {
    if request.description.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("description must not be empty")),
        )
            .into_response();
    }

    info!(
        "Generation request ({} chars)",
        request.description.chars().count()
    );

    match state.pipeline.run(&request.description).await {
        Ok(result) => {
            // No spec exists at all, so there is no usable result to return.
            if result.cause == Some(NotGeneratedCause::ExtractionFailed) {
                return (
                    StatusCode::BAD_GATEWAY,
                    Json(ErrorResponse::new(result.message)),
                )
                    .into_response();
            }
            (StatusCode::OK, Json(GenerateResponse::from(result))).into_response()
        }
        Err(CoreError::EmptyDescription) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("description must not be empty")),
        )
            .into_response(),
    }
}

/// Readiness probe. Not part of the pipeline contract.
async fn get_generate() -> Response {
    Json(json!({
        "status": "ok",
        "service": "veriform",
        "version": env!("CARGO_PKG_VERSION"),
    }))
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use veriform_iac::{CodeGenerator, IacResult};
    use veriform_policy::{
        DangerousRequest, Evaluation, PolicyResult, SecurityEvaluator, SecurityReport, Severity,
        Violation,
    };
    use veriform_spec::{
        CloudProvider, InfrastructureSpec, ProviderConfig, SpecError, SpecExtractor, SpecResult,
    };

    struct StubExtractor {
        fail: bool,
    }

    #[async_trait]
    impl SpecExtractor for StubExtractor {
        async fn extract(&self, _description: &str) -> SpecResult<InfrastructureSpec> {
            if self.fail {
                return Err(SpecError::CommandFailed("unreachable".to_string()));
            }
            Ok(InfrastructureSpec::single(
                ProviderConfig::new(CloudProvider::Aws)
                    .with_servers(3)
                    .with_networks(1)
                    .with_security_groups(1),
            ))
        }
    }

    struct StubEvaluator;

    #[async_trait]
    impl SecurityEvaluator for StubEvaluator {
        async fn evaluate(&self, _spec: &InfrastructureSpec) -> PolicyResult<Evaluation> {
            Ok(Evaluation::approved(
                SecurityReport::new(92)
                    .with_violation(Violation {
                        rule: "load-balancer-without-servers".to_string(),
                        severity: Severity::Low,
                        message: "aws: load balancer with no servers".to_string(),
                        recommendation: "add servers".to_string(),
                    })
                    .with_dangerous_request(DangerousRequest {
                        requested: "aws: publicly accessible database".to_string(),
                        reason: "databases must never be reachable from the internet".to_string(),
                        applied: "database kept private".to_string(),
                    }),
            ))
        }
    }

    struct StubGenerator;

    #[async_trait]
    impl CodeGenerator for StubGenerator {
        async fn generate(&self, _spec: &InfrastructureSpec) -> IacResult<String> {
            Ok("# SECTION AWS\nresource...\n".to_string())
        }
    }

    fn test_router(failing_extractor: bool) -> Router {
        let pipeline = PipelineOrchestrator::new(
            Arc::new(StubExtractor {
                fail: failing_extractor,
            }),
            Arc::new(StubEvaluator),
            Arc::new(StubGenerator),
        );
        router(Arc::new(AppState { pipeline }))
    }

    fn post_body(description: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/generate")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({ "description": description }).to_string(),
            ))
            .unwrap()
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_post_generate_success() {
        let response = test_router(false)
            .oneshot(post_body("three servers on AWS"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;

        assert_eq!(body["success"], json!(true));
        assert_eq!(body["sections"][0]["provider"], json!("aws"));
        assert_eq!(body["sections"][0]["code"], json!("resource..."));
        assert_eq!(body["infrastructure"]["providers"][0]["servers"], json!(3));
    }

    #[tokio::test]
    async fn test_total_issues_is_the_sum_of_both_channels() {
        let response = test_router(false)
            .oneshot(post_body("three servers on AWS"))
            .await
            .unwrap();
        let body = json_body(response).await;

        assert_eq!(body["security_report"]["total_issues"], json!(2));
        assert_eq!(body["security_report"]["security_score"], json!(92));
    }

    #[tokio::test]
    async fn test_empty_description_is_400() {
        for description in ["", "   ", "\n\t"] {
            let response = test_router(false)
                .oneshot(post_body(description))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn test_missing_description_field_is_400() {
        let request = Request::builder()
            .method("POST")
            .uri("/generate")
            .header("content-type", "application/json")
            .body(Body::from("{}"))
            .unwrap();

        let response = test_router(false).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_extraction_failure_is_502() {
        let response = test_router(true)
            .oneshot(post_body("three servers"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = json_body(response).await;
        assert!(body["error"].as_str().unwrap().contains("Not generated"));
    }

    #[tokio::test]
    async fn test_readiness_probe() {
        let request = Request::builder()
            .method("GET")
            .uri("/generate")
            .body(Body::empty())
            .unwrap();

        let response = test_router(false).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], json!("ok"));
    }
}
