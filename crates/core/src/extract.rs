//! Extraction of a structured analysis from raw model output.
//!
//! Models are asked for bare JSON but frequently wrap it in a markdown code
//! fence anyway. [`unwrap_completion`] removes exactly one surrounding fence
//! and [`parse_analysis`] turns the remaining text into a [`ContractAnalysis`].

use crate::analysis::{ContractAnalysis, MAX_RISK_SCORE};
use crate::numeric::normalize_numbers;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

const FENCE: &str = "```";

/// Why a completion could not be turned into an analysis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompletionErrorKind {
    /// Opening fence with no matching closing fence.
    UnterminatedFence,
    /// Fence tagged with something other than `json`.
    UnsupportedFence,
    /// Text is not valid JSON.
    InvalidJson,
    /// JSON does not match the analysis schema.
    SchemaMismatch,
}

impl CompletionErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnterminatedFence => "unterminated_fence",
            Self::UnsupportedFence => "unsupported_fence",
            Self::InvalidJson => "invalid_json",
            Self::SchemaMismatch => "schema_mismatch",
        }
    }
}

impl fmt::Display for CompletionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Malformed model output. Carries the raw completion for diagnosis.
#[derive(Debug, Clone, Error)]
#[error("malformed completion ({kind}): {message}")]
pub struct CompletionError {
    pub kind: CompletionErrorKind,
    pub message: String,
    pub raw: String,
}

impl CompletionError {
    fn new(kind: CompletionErrorKind, message: impl Into<String>, raw: &str) -> Self {
        Self {
            kind,
            message: message.into(),
            raw: raw.to_string(),
        }
    }

    /// First `max_chars` characters of the raw completion, for logging.
    pub fn raw_preview(&self, max_chars: usize) -> &str {
        crate::prompt::truncate_chars(&self.raw, max_chars)
    }
}

/// Strip one surrounding markdown code fence, if present.
///
/// Surrounding whitespace is trimmed. Text without a leading fence is returned
/// as is; text with one must also end in a fence whose info string is empty or
/// `json`.
pub fn unwrap_completion(text: &str) -> Result<&str, CompletionError> {
    let trimmed = text.trim();
    if !trimmed.starts_with(FENCE) {
        return Ok(trimmed);
    }

    if trimmed.len() < 2 * FENCE.len() || !trimmed.ends_with(FENCE) {
        return Err(CompletionError::new(
            CompletionErrorKind::UnterminatedFence,
            "code fence is not closed",
            text,
        ));
    }

    let inner = &trimmed[FENCE.len()..trimmed.len() - FENCE.len()];
    let (info, body) = match inner.split_once('\n') {
        Some((info, body)) => (info.trim(), body),
        // Single-line fence: ```json {...}```
        None => match inner.get(..4) {
            Some(tag) if tag.eq_ignore_ascii_case("json") => ("json", &inner[4..]),
            _ => ("", inner),
        },
    };

    if !info.is_empty() && !info.eq_ignore_ascii_case("json") {
        return Err(CompletionError::new(
            CompletionErrorKind::UnsupportedFence,
            format!("unsupported code fence language: {info}"),
            text,
        ));
    }

    Ok(body.trim())
}

/// Parse a raw completion into a validated analysis.
pub fn parse_analysis(text: &str) -> Result<ContractAnalysis, CompletionError> {
    let body = unwrap_completion(text)?;

    let value: Value = serde_json::from_str(body).map_err(|e| {
        CompletionError::new(CompletionErrorKind::InvalidJson, e.to_string(), text)
    })?;

    if !value.is_object() {
        return Err(CompletionError::new(
            CompletionErrorKind::SchemaMismatch,
            "expected a JSON object",
            text,
        ));
    }

    let analysis: ContractAnalysis = serde_json::from_value(normalize_numbers(value))
        .map_err(|e| CompletionError::new(CompletionErrorKind::SchemaMismatch, e.to_string(), text))?;

    if analysis.risk_score > MAX_RISK_SCORE {
        return Err(CompletionError::new(
            CompletionErrorKind::SchemaMismatch,
            format!(
                "riskScore {} is outside 0-{MAX_RISK_SCORE}",
                analysis.risk_score
            ),
            text,
        ));
    }

    Ok(analysis)
}
