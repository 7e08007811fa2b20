//! # veriform_policy
//!
//! Security verdicts, reports and evaluation adapters for Veriform.
//!
//! This crate provides:
//! - **[`Verdict`]**: the three-valued gate decision with one fail-closed
//!   parsing boundary for raw status tokens
//! - **[`SecurityReport`]**: violations and dangerous-request channels with
//!   a 0-100 score
//! - **[`SecurityEvaluator`]**: the adapter contract, with a command-based
//!   transport and a built-in rule evaluator
//! - **[`RuleSet`]**: declarative structural rules, loadable from YAML

pub mod error;
pub mod evaluator;
pub mod report;
pub mod rules;
pub mod verdict;

pub use error::{PolicyError, PolicyResult};
pub use evaluator::{CommandEvaluator, Evaluation, SecurityEvaluator};
pub use report::{DangerousRequest, SecurityReport, Severity, Violation};
pub use rules::{Rule, RuleCheck, RuleEvaluator, RuleSet};
pub use verdict::Verdict;
