//! Contract record types and lifecycle.

use crate::analysis::ContractAnalysis;
use serde::{Deserialize, Serialize};
use std::fmt;
use time::OffsetDateTime;
use uuid::Uuid;

/// Prefix under which every uploaded contract document is stored.
pub const CONTRACTS_PREFIX: &str = "contracts";

/// Unique identifier for a contract record.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContractId(Uuid);

impl ContractId {
    /// Generate a new random contract ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse from a string.
    pub fn parse(s: &str) -> crate::Result<Self> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| crate::Error::InvalidContractId(format!("{s}: {e}")))
    }

    /// Get the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Derive the object storage key for a document uploaded under this ID.
    ///
    /// The key is namespaced by the ID so two uploads with the same file name
    /// never collide: `contracts/{id}/{file_name}`.
    pub fn storage_key(&self, file_name: &str) -> String {
        format!("{CONTRACTS_PREFIX}/{}/{file_name}", self.0)
    }
}

impl Default for ContractId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for ContractId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Debug for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContractId({})", self.0)
    }
}

impl fmt::Display for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validate a user-supplied file name.
///
/// The name is stored verbatim; only an empty name is rejected here. Key-level
/// safety (path traversal and the like) is enforced by the storage backend.
pub fn validate_file_name(file_name: &str) -> crate::Result<()> {
    if file_name.is_empty() {
        return Err(crate::Error::InvalidFileName(
            "file name must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Contract record status.
///
/// Transitions only move forward:
/// `pending_upload -> analyzing -> {completed | failed}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    /// Upload URL issued, document not yet analyzed.
    PendingUpload,
    /// Analysis in progress.
    Analyzing,
    /// Analysis finished and the result is stored.
    Completed,
    /// Analysis failed; the record carries a diagnostic.
    Failed,
}

impl ContractStatus {
    /// Get the wire/database representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PendingUpload => "pending_upload",
            Self::Analyzing => "analyzing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Parse the wire/database representation.
    pub fn parse(s: &str) -> crate::Result<Self> {
        match s {
            "pending_upload" => Ok(Self::PendingUpload),
            "analyzing" => Ok(Self::Analyzing),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(crate::Error::UnknownStatus(other.to_string())),
        }
    }

    /// Check if the record reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Check whether moving to `next` keeps the lifecycle forward-only.
    ///
    /// Re-entering `analyzing` is allowed so a repeated analysis request for the
    /// same record simply overwrites the interim status.
    pub fn can_transition_to(&self, next: ContractStatus) -> bool {
        use ContractStatus::*;
        matches!(
            (self, next),
            (PendingUpload, Analyzing)
                | (Analyzing, Analyzing)
                | (Analyzing, Completed)
                | (Analyzing, Failed)
        )
    }

    /// Return an error unless `next` is a legal successor.
    pub fn ensure_transition(&self, next: ContractStatus) -> crate::Result<()> {
        if self.can_transition_to(next) {
            Ok(())
        } else {
            Err(crate::Error::InvalidTransition {
                from: self.as_str().to_string(),
                to: next.as_str().to_string(),
            })
        }
    }
}

impl fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted state for one uploaded contract document.
///
/// `analysis` is present only when `status == completed`; `error` only when
/// `status == failed`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractRecord {
    pub contract_id: ContractId,
    pub file_name: String,
    #[serde(rename = "s3Key")]
    pub s3_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    pub status: ContractStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<ContractAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Model output that could not be parsed, kept for diagnosis.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_completion: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub completed_at: Option<OffsetDateTime>,
}

impl ContractRecord {
    /// Create a fresh record in `pending_upload`.
    pub fn pending(id: ContractId, file_name: &str, content_type: Option<String>) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            contract_id: id,
            file_name: file_name.to_string(),
            s3_key: id.storage_key(file_name),
            content_type,
            status: ContractStatus::PendingUpload,
            analysis: None,
            error: None,
            raw_completion: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }
}
