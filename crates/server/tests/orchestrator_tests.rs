//! Analyzer tests against injected collaborators.

mod common;

use common::{ObservedRecords, Reply, ScriptedInference, analysis_json, fenced_json, sample_contract};
use contractguard_core::config::{AnalysisConfig, OversizePolicy, StorageConfig};
use contractguard_core::{ContractId, ContractRecord, ContractStatus, Playbook};
use contractguard_records::{ContractRepo, SqliteStore};
use contractguard_server::orchestrator::review_text;
use contractguard_server::{AnalysisFault, AnalysisOutcome, Analyzer, ApiError};
use contractguard_storage::ObjectStore;
use std::sync::Arc;
use tempfile::TempDir;

struct Harness {
    analyzer: Analyzer,
    storage: Arc<dyn ObjectStore>,
    records: Arc<ObservedRecords>,
    inference: Arc<ScriptedInference>,
    _dir: TempDir,
}

async fn harness(config: AnalysisConfig) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let storage = contractguard_storage::from_config(
        &StorageConfig::Filesystem {
            path: dir.path().join("storage"),
            signing_secret: common::SIGNING_SECRET.to_string(),
        },
        "http://127.0.0.1:8080",
    )
    .await
    .unwrap();
    let records = Arc::new(ObservedRecords::new(
        SqliteStore::new(dir.path().join("records.db"), None)
            .await
            .unwrap(),
    ));
    let inference = Arc::new(ScriptedInference::new());

    let analyzer = Analyzer::new(
        storage.clone(),
        records.clone(),
        inference.clone(),
        Arc::new(Playbook::builtin().unwrap()),
        config,
    );

    Harness {
        analyzer,
        storage,
        records,
        inference,
        _dir: dir,
    }
}

/// Create a pending record and store its document.
async fn seed(h: &Harness, body: bytes::Bytes) -> ContractRecord {
    let record = ContractRecord::pending(ContractId::new(), "msa.txt", None);
    h.records.create_contract(&record).await.unwrap();
    h.storage.put(&record.s3_key, body).await.unwrap();
    record
}

#[tokio::test]
async fn test_completed_outcome_and_status_sequence() {
    let h = harness(AnalysisConfig::default()).await;
    h.inference.push_text(fenced_json(analysis_json()));
    let record = seed(&h, sample_contract()).await;

    let outcome = h
        .analyzer
        .run(record.contract_id, &record.s3_key)
        .await
        .unwrap();

    let AnalysisOutcome::Completed(analysis) = &outcome else {
        panic!("expected completion, got {outcome:?}");
    };
    assert_eq!(analysis.risk_score, 70);
    assert_eq!(outcome.status(), ContractStatus::Completed);
    assert_eq!(
        h.records.statuses(),
        vec![
            ContractStatus::PendingUpload,
            ContractStatus::Analyzing,
            ContractStatus::Completed
        ]
    );

    let stored = h
        .records
        .get_contract(record.contract_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.analysis.as_ref(), Some(analysis));
    assert!(stored.completed_at.is_some());
    assert!(stored.error.is_none());
}

#[tokio::test]
async fn test_failed_state_write_is_reported_not_swallowed() {
    let h = harness(AnalysisConfig::default()).await;
    h.inference.push_text("not json at all");
    h.records.break_failure_writes();
    let record = seed(&h, sample_contract()).await;

    let outcome = h
        .analyzer
        .run(record.contract_id, &record.s3_key)
        .await
        .unwrap();

    let AnalysisOutcome::Failed(failure) = outcome else {
        panic!("expected failure");
    };
    assert!(matches!(failure.fault, AnalysisFault::MalformedCompletion(_)));
    assert!(failure.state_write.is_some());

    // The failure could not be recorded, so the record is left in analyzing.
    let stored = h
        .records
        .get_contract(record.contract_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, ContractStatus::Analyzing);

    // Only the primary fault reaches the caller.
    let api = ApiError::from(failure.fault);
    assert_eq!(api.code(), "malformed_completion");
}

#[tokio::test]
async fn test_failed_outcome_persists_raw_completion() {
    let h = harness(AnalysisConfig::default()).await;
    h.inference.push_text("```yaml\nriskScore: 10\n```");
    let record = seed(&h, sample_contract()).await;

    let outcome = h
        .analyzer
        .run(record.contract_id, &record.s3_key)
        .await
        .unwrap();

    let AnalysisOutcome::Failed(failure) = outcome else {
        panic!("expected failure");
    };
    assert!(failure.state_write.is_none());
    assert_eq!(failure.fault.label(), "malformed_completion");

    let stored = h
        .records
        .get_contract(record.contract_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, ContractStatus::Failed);
    assert_eq!(
        stored.raw_completion.as_deref(),
        Some("```yaml\nriskScore: 10\n```")
    );
    assert!(stored.error.unwrap().contains("unsupported_fence"));
}

#[tokio::test]
async fn test_upstream_fault_does_not_store_raw_completion() {
    let h = harness(AnalysisConfig::default()).await;
    h.inference.push(Reply::Status(429));
    let record = seed(&h, sample_contract()).await;

    let outcome = h
        .analyzer
        .run(record.contract_id, &record.s3_key)
        .await
        .unwrap();

    let AnalysisOutcome::Failed(failure) = outcome else {
        panic!("expected failure");
    };
    assert!(matches!(failure.fault, AnalysisFault::Inference(_)));
    assert!(failure.fault.raw_completion().is_none());

    let stored = h
        .records
        .get_contract(record.contract_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, ContractStatus::Failed);
    assert!(stored.raw_completion.is_none());
}

#[tokio::test]
async fn test_preconditions_leave_record_untouched() {
    let h = harness(AnalysisConfig::default()).await;
    let record = seed(&h, sample_contract()).await;

    let err = h
        .analyzer
        .run(record.contract_id, "contracts/elsewhere/msa.txt")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));

    let err = h
        .analyzer
        .run(ContractId::new(), &record.s3_key)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));

    assert_eq!(h.records.statuses(), vec![ContractStatus::PendingUpload]);
    assert_eq!(h.inference.calls(), 0);
}

#[tokio::test]
async fn test_review_text_rejects_oversize_without_calling_model() {
    let config = AnalysisConfig {
        max_document_chars: 5,
        oversize_policy: OversizePolicy::Reject,
    };
    let inference = ScriptedInference::new();
    let playbook = Playbook::builtin().unwrap();

    let fault = review_text(&inference, &playbook, &config, "twelve chars")
        .await
        .unwrap_err();

    assert!(matches!(fault, AnalysisFault::Document(_)));
    assert_eq!(inference.calls(), 0);
}

#[tokio::test]
async fn test_review_text_truncates_on_char_boundary() {
    let config = AnalysisConfig {
        max_document_chars: 3,
        oversize_policy: OversizePolicy::Truncate,
    };
    let inference = ScriptedInference::new();
    inference.push_text(analysis_json());
    let playbook = Playbook::builtin().unwrap();

    let analysis = review_text(&inference, &playbook, &config, "§§§§§§")
        .await
        .unwrap();

    assert_eq!(analysis.risk_score, 70);
    assert!(inference.prompts()[0].contains("<contract>\n§§§\n</contract>"));
}
