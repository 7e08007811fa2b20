//! # veriform_iac
//!
//! Terraform generation and artifact section parsing for Veriform.
//!
//! This crate provides:
//! - **[`CodeGenerator`]**: the generation adapter contract, with a
//!   command-based transport and a built-in multi-cloud Terraform renderer
//! - **[`parse_sections`]** / **[`ProviderSections`]**: deterministic
//!   splitting of one generated artifact into per-provider segments
//!
//! ## Example
//!
//! ```rust
//! use veriform_iac::parse_sections;
//!
//! let artifact = "# SECTION AWS\nresource \"aws_vpc\" \"main\" {}\n";
//! let sections = parse_sections(artifact);
//! assert_eq!(sections.get("aws"), Some("resource \"aws_vpc\" \"main\" {}"));
//! ```

pub mod error;
pub mod generator;
pub mod sections;
pub mod terraform;

pub use error::{IacError, IacResult};
pub use generator::{CodeGenerator, CommandGenerator};
pub use sections::{parse_sections, ProviderSections, FALLBACK_KEY};
pub use terraform::TerraformGenerator;
