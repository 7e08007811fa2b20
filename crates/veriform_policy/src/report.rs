//! Security report data model.

use serde::{Deserialize, Serialize};

/// Severity of a security violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    /// Score deduction applied per violation of this severity.
    pub fn penalty(&self) -> u8 {
        match self {
            Severity::Critical => 40,
            Severity::High => 25,
            Severity::Medium => 10,
            Severity::Low => 5,
        }
    }
}

/// Residual risk found in an otherwise processable specification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    pub rule: String,
    pub severity: Severity,
    pub message: String,
    pub recommendation: String,
}

/// A risky request the evaluator downgraded to a safe equivalent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DangerousRequest {
    pub requested: String,
    pub reason: String,
    pub applied: String,
}

/// Full security evaluation report.
///
/// `violations` and `dangerous_requests` are independent channels: the
/// former flags residual risk, the latter records requests that were
/// proactively rewritten before approval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityReport {
    #[serde(default)]
    pub violations: Vec<Violation>,
    #[serde(default)]
    pub dangerous_requests: Vec<DangerousRequest>,
    /// Security score, 0-100.
    #[serde(default)]
    pub score: u8,
}

impl SecurityReport {
    pub fn new(score: u8) -> Self {
        Self {
            violations: Vec::new(),
            dangerous_requests: Vec::new(),
            score,
        }
    }

    pub fn with_violation(mut self, violation: Violation) -> Self {
        self.violations.push(violation);
        self
    }

    pub fn with_dangerous_request(mut self, request: DangerousRequest) -> Self {
        self.dangerous_requests.push(request);
        self
    }

    /// Total number of flagged items across both channels.
    pub fn total_issues(&self) -> usize {
        self.violations.len() + self.dangerous_requests.len()
    }

    /// Letter grade for the score.
    pub fn grade(&self) -> char {
        match self.score {
            90..=100 => 'A',
            80..=89 => 'B',
            70..=79 => 'C',
            60..=69 => 'D',
            _ => 'F',
        }
    }
}

impl Default for SecurityReport {
    fn default() -> Self {
        Self::new(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_issues_sums_both_channels() {
        let report = SecurityReport::new(70)
            .with_violation(Violation {
                rule: "compute-without-security-group".to_string(),
                severity: Severity::High,
                message: "aws: servers with no security group".to_string(),
                recommendation: "add at least one security group".to_string(),
            })
            .with_dangerous_request(DangerousRequest {
                requested: "Public database".to_string(),
                reason: "Databases must never be reachable from the internet".to_string(),
                applied: "Database kept private".to_string(),
            });

        assert_eq!(report.total_issues(), 2);
    }

    #[test]
    fn test_grades() {
        assert_eq!(SecurityReport::new(92).grade(), 'A');
        assert_eq!(SecurityReport::new(85).grade(), 'B');
        assert_eq!(SecurityReport::new(70).grade(), 'C');
        assert_eq!(SecurityReport::new(60).grade(), 'D');
        assert_eq!(SecurityReport::new(12).grade(), 'F');
    }

    #[test]
    fn test_penalties_ordered_by_severity() {
        assert!(Severity::Critical.penalty() > Severity::High.penalty());
        assert!(Severity::High.penalty() > Severity::Medium.penalty());
        assert!(Severity::Medium.penalty() > Severity::Low.penalty());
    }
}
