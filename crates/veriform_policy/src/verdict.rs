//! The three-valued security verdict and its single parsing boundary.

use serde::{Deserialize, Serialize};

/// Outcome of security evaluation.
///
/// `Indeterminate` is the fail-closed default: an evaluator that errors,
/// times out or emits anything unrecognisable must never be treated as an
/// approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Approved,
    Rejected,
    Indeterminate,
}

impl Verdict {
    /// Map a raw evaluator status token to a verdict.
    ///
    /// This is the only place in the codebase where status tokens are
    /// interpreted. Exactly `"OK"` approves, exactly `"NOT_OK"` rejects,
    /// everything else (empty output, garbage, wrong case, stray
    /// whitespace) is `Indeterminate`.
    pub fn from_status_token(token: &str) -> Self {
        match token {
            "OK" => Verdict::Approved,
            "NOT_OK" => Verdict::Rejected,
            _ => Verdict::Indeterminate,
        }
    }

    pub fn is_approved(&self) -> bool {
        matches!(self, Verdict::Approved)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Approved => "approved",
            Verdict::Rejected => "rejected",
            Verdict::Indeterminate => "indeterminate",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
