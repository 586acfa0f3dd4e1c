//! HTTP service for ContractGuard.
//!
//! This crate provides:
//! - Upload URL issuance (`POST /upload-url`)
//! - The analysis pipeline (`POST /analyze`)
//! - Result lookup (`GET /analysis/{id}`)
//! - Signed direct uploads for the filesystem backend
//! - Health and Prometheus endpoints

pub mod bootstrap;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod orchestrator;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use orchestrator::{AnalysisFailure, AnalysisFault, AnalysisOutcome, Analyzer};
pub use routes::create_router;
pub use state::AppState;
