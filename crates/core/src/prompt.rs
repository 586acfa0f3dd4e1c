//! Review prompt rendering.

use crate::config::{AnalysisConfig, OversizePolicy};
use crate::error::{Error, Result};
use crate::playbook::Playbook;

/// Default character budget for the document body in the prompt.
pub const DEFAULT_MAX_DOCUMENT_CHARS: usize = 15_000;

const RESPONSE_SCHEMA: &str = r#"{
  "riskScore": <number 0-100>,
  "criticalIssues": [
    {
      "clause": "Section name or clause text",
      "issue": "What's wrong with it",
      "suggestion": "How to fix it"
    }
  ],
  "mediumIssues": [
    {
      "clause": "Section name",
      "issue": "Concern description"
    }
  ],
  "compliantSections": [
    "List of sections that comply with playbook"
  ]
}"#;

/// Document text prepared for the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedDocument<'a> {
    pub text: &'a str,
    /// Character count of the original document.
    pub original_chars: usize,
    pub truncated: bool,
}

/// Cut `text` down to at most `max_chars` characters without splitting one.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Apply the configured size budget to a document.
pub fn prepare_document<'a>(text: &'a str, config: &AnalysisConfig) -> Result<PreparedDocument<'a>> {
    let original_chars = text.chars().count();
    if original_chars <= config.max_document_chars {
        return Ok(PreparedDocument {
            text,
            original_chars,
            truncated: false,
        });
    }

    match config.oversize_policy {
        OversizePolicy::Truncate => Ok(PreparedDocument {
            text: truncate_chars(text, config.max_document_chars),
            original_chars,
            truncated: true,
        }),
        OversizePolicy::Reject => Err(Error::DocumentTooLarge {
            chars: original_chars,
            limit: config.max_document_chars,
        }),
    }
}

/// Render the full review prompt for a document.
pub fn render_review_prompt(playbook: &Playbook, document: &str) -> String {
    format!(
        "You are a legal contract analyst. Review this contract against our company playbook and return ONLY valid JSON.

<company_playbook>
{playbook}
</company_playbook>

<contract>
{document}
</contract>

Analyze the contract and return ONLY a JSON object with this exact structure (no markdown, no explanation):

{RESPONSE_SCHEMA}

Risk scoring:
- 70-100: High risk (multiple critical issues)
- 40-69: Medium risk (some concerning terms)
- 0-39: Low risk (mostly compliant)

Return ONLY the JSON, nothing else.",
        playbook = playbook.render(),
    )
}
