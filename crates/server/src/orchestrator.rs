//! Analysis pipeline for one uploaded contract.
//!
//! [`Analyzer::run`] checks the record, moves it to `analyzing`, and then runs
//! the review: fetch the document, render the prompt, call the model, extract
//! the analysis. Any fault after the status change is written back to the
//! record as `failed`. That write is best effort, and its own error is returned
//! next to the primary fault instead of being dropped.

use crate::error::{ApiError, ApiResult};
use crate::metrics::{DOCUMENTS_TRUNCATED, INFERENCE_DURATION, STATE_WRITE_FAILURES};
use crate::state::AppState;
use contractguard_core::config::AnalysisConfig;
use contractguard_core::{
    CompletionError, ContractAnalysis, ContractId, ContractStatus, Playbook, parse_analysis,
    prepare_document, render_review_prompt,
};
use contractguard_inference::{InferenceClient, InferenceError};
use contractguard_records::{RecordError, RecordStore};
use contractguard_storage::{ObjectStore, StorageError};
use std::sync::Arc;
use time::OffsetDateTime;
use tracing::{info, instrument, warn};

/// Characters of an unparseable completion included in logs.
const RAW_PREVIEW_CHARS: usize = 500;

/// A fault after the record entered `analyzing`.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisFault {
    #[error("failed to fetch document: {0}")]
    Storage(#[from] StorageError),

    #[error("unusable document: {0}")]
    Document(String),

    #[error("inference call failed: {0}")]
    Inference(#[from] InferenceError),

    #[error(transparent)]
    MalformedCompletion(#[from] CompletionError),

    #[error("failed to store analysis: {0}")]
    Records(#[from] RecordError),
}

impl AnalysisFault {
    /// Metric and log label for this kind of fault.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Storage(_) => "storage_error",
            Self::Document(_) => "document_error",
            Self::Inference(_) => "inference_error",
            Self::MalformedCompletion(_) => "malformed_completion",
            Self::Records(_) => "record_store_error",
        }
    }

    /// Model output worth keeping on the record for diagnosis.
    pub fn raw_completion(&self) -> Option<&str> {
        match self {
            Self::MalformedCompletion(e) => Some(&e.raw),
            _ => None,
        }
    }
}

impl From<AnalysisFault> for ApiError {
    fn from(fault: AnalysisFault) -> Self {
        match fault {
            AnalysisFault::Storage(e) => ApiError::Storage(e),
            AnalysisFault::Document(msg) => ApiError::Document(msg),
            AnalysisFault::Inference(e) => ApiError::Inference(e),
            AnalysisFault::MalformedCompletion(e) => ApiError::MalformedCompletion(e),
            AnalysisFault::Records(e) => ApiError::Records(e),
        }
    }
}

/// A failed analysis.
#[derive(Debug)]
pub struct AnalysisFailure {
    /// What went wrong in the pipeline.
    pub fault: AnalysisFault,
    /// Error from recording the failure on the contract, if that also failed.
    pub state_write: Option<RecordError>,
}

/// Result of an analysis that got past its preconditions.
#[derive(Debug)]
pub enum AnalysisOutcome {
    Completed(ContractAnalysis),
    Failed(AnalysisFailure),
}

impl AnalysisOutcome {
    pub fn status(&self) -> ContractStatus {
        match self {
            Self::Completed(_) => ContractStatus::Completed,
            Self::Failed(_) => ContractStatus::Failed,
        }
    }
}

/// Review a document's text against a playbook.
///
/// Shared by the HTTP pipeline and the local `review` command. No record
/// store or object storage is involved.
pub async fn review_text(
    inference: &dyn InferenceClient,
    playbook: &Playbook,
    config: &AnalysisConfig,
    text: &str,
) -> Result<ContractAnalysis, AnalysisFault> {
    let document =
        prepare_document(text, config).map_err(|e| AnalysisFault::Document(e.to_string()))?;
    if document.truncated {
        DOCUMENTS_TRUNCATED.inc();
        warn!(
            chars = document.original_chars,
            limit = config.max_document_chars,
            truncated = true,
            "Document exceeds character budget, truncating"
        );
    }

    let prompt = render_review_prompt(playbook, document.text);

    let timer = INFERENCE_DURATION.start_timer();
    let completion = inference.complete(&prompt).await;
    timer.observe_duration();
    let completion = completion?;

    parse_analysis(&completion).map_err(|e| {
        warn!(
            kind = %e.kind,
            model = inference.model(),
            raw_preview = e.raw_preview(RAW_PREVIEW_CHARS),
            "Model returned a malformed completion"
        );
        AnalysisFault::MalformedCompletion(e)
    })
}

/// Runs analyses against injected collaborators.
#[derive(Clone)]
pub struct Analyzer {
    storage: Arc<dyn ObjectStore>,
    records: Arc<dyn RecordStore>,
    inference: Arc<dyn InferenceClient>,
    playbook: Arc<Playbook>,
    config: AnalysisConfig,
}

impl Analyzer {
    pub fn new(
        storage: Arc<dyn ObjectStore>,
        records: Arc<dyn RecordStore>,
        inference: Arc<dyn InferenceClient>,
        playbook: Arc<Playbook>,
        config: AnalysisConfig,
    ) -> Self {
        Self {
            storage,
            records,
            inference,
            playbook,
            config,
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(
            state.storage.clone(),
            state.records.clone(),
            state.inference.clone(),
            state.playbook.clone(),
            state.config.analysis.clone(),
        )
    }

    /// Check preconditions, enter `analyzing`, then analyze.
    ///
    /// Errors returned here happened before the status change and left the
    /// record untouched: unknown contract, mismatched key, terminal record, or
    /// a failure writing `analyzing` itself.
    #[instrument(skip(self), fields(contract_id = %contract_id))]
    pub async fn run(&self, contract_id: ContractId, s3_key: &str) -> ApiResult<AnalysisOutcome> {
        self.begin(contract_id, s3_key).await?;
        Ok(self.analyze(contract_id, s3_key).await)
    }

    async fn begin(&self, contract_id: ContractId, s3_key: &str) -> ApiResult<()> {
        let record = self
            .records
            .get_contract(contract_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("contract {contract_id} not found")))?;

        if record.s3_key != s3_key {
            return Err(ApiError::BadRequest(format!(
                "s3Key does not match contract {contract_id}"
            )));
        }

        record.status.ensure_transition(ContractStatus::Analyzing)?;

        self.records
            .set_status(
                contract_id,
                ContractStatus::Analyzing,
                OffsetDateTime::now_utc(),
            )
            .await?;
        info!(status = %ContractStatus::Analyzing, "Analysis started");
        Ok(())
    }

    /// Run the pipeline for a record already in `analyzing` and persist the
    /// terminal state.
    pub async fn analyze(&self, contract_id: ContractId, s3_key: &str) -> AnalysisOutcome {
        let outcome = match self.review(s3_key).await {
            Ok(analysis) => match self
                .records
                .complete_analysis(contract_id, &analysis, OffsetDateTime::now_utc())
                .await
            {
                Ok(()) => {
                    info!(
                        status = %ContractStatus::Completed,
                        risk_score = analysis.risk_score,
                        risk_band = analysis.risk_band().as_str(),
                        critical = analysis.critical_issues.len(),
                        medium = analysis.medium_issues.len(),
                        "Analysis completed"
                    );
                    AnalysisOutcome::Completed(analysis)
                }
                Err(e) => self.fail(contract_id, e.into()).await,
            },
            Err(fault) => self.fail(contract_id, fault).await,
        };

        let label = match &outcome {
            AnalysisOutcome::Completed(_) => "completed",
            AnalysisOutcome::Failed(failure) => failure.fault.label(),
        };
        crate::metrics::record_analysis_outcome(label);
        outcome
    }

    async fn review(&self, s3_key: &str) -> Result<ContractAnalysis, AnalysisFault> {
        let body = self.storage.get(s3_key).await?;
        let text = std::str::from_utf8(&body)
            .map_err(|e| AnalysisFault::Document(format!("document is not valid UTF-8: {e}")))?;
        review_text(self.inference.as_ref(), &self.playbook, &self.config, text).await
    }

    async fn fail(&self, contract_id: ContractId, fault: AnalysisFault) -> AnalysisOutcome {
        warn!(
            status = %ContractStatus::Failed,
            fault = fault.label(),
            error = %fault,
            "Analysis failed"
        );

        let state_write = self
            .records
            .fail_analysis(
                contract_id,
                &fault.to_string(),
                fault.raw_completion(),
                OffsetDateTime::now_utc(),
            )
            .await
            .err();

        if state_write.is_some() {
            STATE_WRITE_FAILURES.inc();
        }

        AnalysisOutcome::Failed(AnalysisFailure { fault, state_write })
    }
}
