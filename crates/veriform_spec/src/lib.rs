//! # veriform_spec
//!
//! Infrastructure specification model and extraction adapters for Veriform.
//!
//! This crate defines the canonical [`InfrastructureSpec`] shape (always a
//! list of per-provider configs, length one for single-cloud) and the
//! [`SpecExtractor`] contract that turns a natural-language description into
//! that shape. The transport behind the contract is an implementation
//! detail: an external command or a chat-completions API.
//!
//! ## Example
//!
//! ```rust,no_run
//! use veriform_spec::{CommandExtractor, SpecExtractor};
//!
//! # async fn run() -> veriform_spec::SpecResult<()> {
//! let extractor = CommandExtractor::from_command_line("python3 extract.py")?;
//! let spec = extractor.extract("three servers on AWS with a MySQL database").await?;
//! assert_eq!(spec.providers.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod extractor;
pub mod llm;
pub mod models;

pub use error::{SpecError, SpecResult};
pub use extractor::{CommandExtractor, SpecExtractor};
pub use llm::{LlmExtractor, LlmProvider};
pub use models::{CloudProvider, InfrastructureSpec, ProviderConfig, RiskRequests};
