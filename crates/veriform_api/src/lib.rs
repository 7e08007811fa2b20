//! # veriform_api
//!
//! HTTP surface for the Veriform generation pipeline.
//!
//! Exposes `POST /generate` (description in, vetted Terraform out) and a
//! readiness probe on `GET /generate`. The [`response`] module is the result
//! adapter mapping internal pipeline results onto the external contract.

pub mod config;
pub mod response;
pub mod routes;

pub use config::ApiConfig;
pub use response::{ErrorResponse, GenerateResponse, SectionView, SecurityReportView};
pub use routes::{router, AppState, GenerateRequest};
