//! CLI command definitions.

use clap::{Parser, Subcommand};

pub mod generate;

/// Veriform: natural-language infrastructure requests to vetted Terraform.
#[derive(Parser)]
#[command(name = "veriform", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate security-vetted Terraform from a description
    Generate(generate::GenerateArgs),
}
