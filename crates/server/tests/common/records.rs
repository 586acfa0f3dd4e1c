//! Record store wrapper that observes writes and can inject failures.

use async_trait::async_trait;
use contractguard_core::{ContractAnalysis, ContractId, ContractRecord, ContractStatus};
use contractguard_records::{ContractRepo, RecordError, RecordResult, RecordStore, SqliteStore};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use time::OffsetDateTime;

/// Delegates to SQLite, logging every status written.
pub struct ObservedRecords {
    inner: SqliteStore,
    statuses: Mutex<Vec<ContractStatus>>,
    fail_failure_writes: AtomicBool,
}

#[allow(dead_code)]
impl ObservedRecords {
    pub fn new(inner: SqliteStore) -> Self {
        Self {
            inner,
            statuses: Mutex::new(Vec::new()),
            fail_failure_writes: AtomicBool::new(false),
        }
    }

    /// Make every `fail_analysis` call error.
    pub fn break_failure_writes(&self) {
        self.fail_failure_writes.store(true, Ordering::SeqCst);
    }

    /// Statuses written so far, in order, including the initial insert.
    pub fn statuses(&self) -> Vec<ContractStatus> {
        self.statuses.lock().unwrap().clone()
    }

    fn note(&self, status: ContractStatus) {
        self.statuses.lock().unwrap().push(status);
    }
}

#[async_trait]
impl ContractRepo for ObservedRecords {
    async fn create_contract(&self, record: &ContractRecord) -> RecordResult<()> {
        self.note(record.status);
        self.inner.create_contract(record).await
    }

    async fn get_contract(&self, contract_id: ContractId) -> RecordResult<Option<ContractRecord>> {
        self.inner.get_contract(contract_id).await
    }

    async fn set_status(
        &self,
        contract_id: ContractId,
        status: ContractStatus,
        updated_at: OffsetDateTime,
    ) -> RecordResult<()> {
        self.note(status);
        self.inner.set_status(contract_id, status, updated_at).await
    }

    async fn complete_analysis(
        &self,
        contract_id: ContractId,
        analysis: &ContractAnalysis,
        completed_at: OffsetDateTime,
    ) -> RecordResult<()> {
        self.note(ContractStatus::Completed);
        self.inner
            .complete_analysis(contract_id, analysis, completed_at)
            .await
    }

    async fn fail_analysis(
        &self,
        contract_id: ContractId,
        error: &str,
        raw_completion: Option<&str>,
        failed_at: OffsetDateTime,
    ) -> RecordResult<()> {
        if self.fail_failure_writes.load(Ordering::SeqCst) {
            return Err(RecordError::Config("record table unavailable".to_string()));
        }
        self.note(ContractStatus::Failed);
        self.inner
            .fail_analysis(contract_id, error, raw_completion, failed_at)
            .await
    }
}

#[async_trait]
impl RecordStore for ObservedRecords {
    async fn migrate(&self) -> RecordResult<()> {
        self.inner.migrate().await
    }

    async fn health_check(&self) -> RecordResult<()> {
        self.inner.health_check().await
    }
}
