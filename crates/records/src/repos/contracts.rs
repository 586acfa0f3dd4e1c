//! Contract record repository.

use crate::error::RecordResult;
use async_trait::async_trait;
use contractguard_core::{ContractAnalysis, ContractId, ContractRecord, ContractStatus};
use time::OffsetDateTime;

/// Repository for contract records.
///
/// Writes are plain overwrites of the addressed fields; callers that need a
/// status precondition read the record first.
#[async_trait]
pub trait ContractRepo: Send + Sync {
    /// Insert a new record. Fails with `AlreadyExists` on a duplicate ID.
    async fn create_contract(&self, record: &ContractRecord) -> RecordResult<()>;

    /// Get a record by ID.
    async fn get_contract(&self, contract_id: ContractId) -> RecordResult<Option<ContractRecord>>;

    /// Set the status field only.
    async fn set_status(
        &self,
        contract_id: ContractId,
        status: ContractStatus,
        updated_at: OffsetDateTime,
    ) -> RecordResult<()>;

    /// Store a finished analysis: status `completed`, analysis and
    /// `completed_at` set, any earlier error cleared.
    async fn complete_analysis(
        &self,
        contract_id: ContractId,
        analysis: &ContractAnalysis,
        completed_at: OffsetDateTime,
    ) -> RecordResult<()>;

    /// Mark the analysis failed with a diagnostic and, for unparseable model
    /// output, the raw completion.
    async fn fail_analysis(
        &self,
        contract_id: ContractId,
        error: &str,
        raw_completion: Option<&str>,
        failed_at: OffsetDateTime,
    ) -> RecordResult<()>;
}
