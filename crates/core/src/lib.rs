//! Core domain types and shared logic for ContractGuard.
//!
//! This crate defines the data model used across all other crates:
//! - Contract identifiers, records and the status lifecycle
//! - The structured analysis schema and risk bands
//! - The company playbook and review prompt rendering
//! - Extraction of an analysis from raw model output
//! - Configuration types

pub mod analysis;
pub mod config;
pub mod contract;
pub mod error;
pub mod extract;
pub mod numeric;
pub mod playbook;
pub mod prompt;

pub use analysis::{ContractAnalysis, CriticalIssue, MediumIssue, RiskBand};
pub use contract::{ContractId, ContractRecord, ContractStatus, validate_file_name};
pub use error::{Error, Result};
pub use extract::{CompletionError, CompletionErrorKind, parse_analysis, unwrap_completion};
pub use numeric::normalize_numbers;
pub use playbook::{Playbook, Rule};
pub use prompt::{
    DEFAULT_MAX_DOCUMENT_CHARS, PreparedDocument, prepare_document, render_review_prompt,
};

/// Default lifetime of an upload URL: 5 minutes.
pub const DEFAULT_UPLOAD_URL_TTL_SECS: u64 = 300;
