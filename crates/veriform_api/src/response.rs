//! External response shapes and the result adapter.

use serde::Serialize;

use veriform_core::PipelineResult;
use veriform_policy::{DangerousRequest, SecurityReport, Violation};
use veriform_spec::InfrastructureSpec;

/// One provider's code segment, in artifact order.
#[derive(Debug, Clone, Serialize)]
pub struct SectionView {
    pub provider: String,
    pub code: String,
}

/// Security report as consumed by clients.
///
/// `total_issues` is computed here, not by upstream adapters.
#[derive(Debug, Clone, Serialize)]
pub struct SecurityReportView {
    pub violations: Vec<Violation>,
    pub dangerous_requests: Vec<DangerousRequest>,
    pub total_issues: usize,
    pub security_score: u8,
}

impl From<SecurityReport> for SecurityReportView {
    fn from(report: SecurityReport) -> Self {
        let total_issues = report.total_issues();
        Self {
            violations: report.violations,
            dangerous_requests: report.dangerous_requests,
            total_issues,
            security_score: report.score,
        }
    }
}

/// Response body for `POST /generate`.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub infrastructure: Option<InfrastructureSpec>,
    pub terraform_code: String,
    pub sections: Vec<SectionView>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_report: Option<SecurityReportView>,
}

impl From<PipelineResult> for GenerateResponse {
    fn from(result: PipelineResult) -> Self {
        let sections = result
            .sections
            .iter()
            .map(|(provider, code)| SectionView {
                provider: provider.to_string(),
                code: code.to_string(),
            })
            .collect();

        Self {
            success: result.is_generated(),
            infrastructure: result.spec,
            terraform_code: result.artifact.unwrap_or_default(),
            sections,
            // The message comes from the orchestrator's fixed per-outcome
            // strings; raw adapter output is never echoed to clients.
            message: result.message,
            security_report: result.report.map(SecurityReportView::from),
        }
    }
}

/// Error body for non-200 responses.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
