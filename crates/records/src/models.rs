//! Database models mapping to the record schema.

use crate::error::{RecordError, RecordResult};
use contractguard_core::{ContractAnalysis, ContractId, ContractRecord, ContractStatus};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// One row of the `contracts` table.
///
/// `analysis` holds the serialized [`ContractAnalysis`] as JSON text.
#[derive(Debug, Clone, FromRow)]
pub struct ContractRow {
    pub contract_id: Uuid,
    pub file_name: String,
    pub s3_key: String,
    pub content_type: Option<String>,
    pub status: String,
    pub analysis: Option<String>,
    pub error: Option<String>,
    pub raw_completion: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub completed_at: Option<OffsetDateTime>,
}

impl ContractRow {
    pub fn from_record(record: &ContractRecord) -> RecordResult<Self> {
        let analysis = record
            .analysis
            .as_ref()
            .map(encode_analysis)
            .transpose()?;

        Ok(Self {
            contract_id: *record.contract_id.as_uuid(),
            file_name: record.file_name.clone(),
            s3_key: record.s3_key.clone(),
            content_type: record.content_type.clone(),
            status: record.status.as_str().to_string(),
            analysis,
            error: record.error.clone(),
            raw_completion: record.raw_completion.clone(),
            created_at: record.created_at,
            updated_at: record.updated_at,
            completed_at: record.completed_at,
        })
    }

    pub fn into_record(self) -> RecordResult<ContractRecord> {
        let id = self.contract_id;
        let corrupt = |reason: String| RecordError::Corrupt {
            contract_id: id.to_string(),
            reason,
        };

        let status = ContractStatus::parse(&self.status).map_err(|e| corrupt(e.to_string()))?;
        let analysis = self
            .analysis
            .as_deref()
            .map(serde_json::from_str::<ContractAnalysis>)
            .transpose()
            .map_err(|e| corrupt(format!("invalid analysis JSON: {e}")))?;

        Ok(ContractRecord {
            contract_id: ContractId::from(id),
            file_name: self.file_name,
            s3_key: self.s3_key,
            content_type: self.content_type,
            status,
            analysis,
            error: self.error,
            raw_completion: self.raw_completion,
            created_at: self.created_at,
            updated_at: self.updated_at,
            completed_at: self.completed_at,
        })
    }
}

pub(crate) fn encode_analysis(analysis: &ContractAnalysis) -> RecordResult<String> {
    serde_json::to_string(analysis).map_err(|e| RecordError::Serialization(e.to_string()))
}
