//! Analysis trigger and result lookup.

use crate::error::{ApiError, ApiResult};
use crate::handlers::read_json_body;
use crate::metrics::ANALYSIS_DURATION;
use crate::orchestrator::{AnalysisOutcome, Analyzer};
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, Request, State};
use contractguard_core::{ContractId, ContractStatus, normalize_numbers};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Maximum request body size for analysis requests (64 KiB).
const MAX_ANALYZE_BODY_SIZE: usize = 64 * 1024;

/// POST /analyze request body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub contract_id: Option<String>,
    #[serde(default)]
    pub s3_key: Option<String>,
}

/// POST /analyze response body.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub status: ContractStatus,
    pub contract_id: ContractId,
}

/// POST /analyze - Review an uploaded document.
///
/// Runs synchronously. The result itself is read back with
/// `GET /analysis/{id}`.
#[tracing::instrument(skip(state, req), fields(contract_id, s3_key))]
pub async fn run_analysis(
    State(state): State<AppState>,
    req: Request,
) -> ApiResult<Json<AnalyzeResponse>> {
    let body: AnalyzeRequest = read_json_body(req, MAX_ANALYZE_BODY_SIZE).await?;

    let (Some(contract_id), Some(s3_key)) = (body.contract_id, body.s3_key) else {
        return Err(ApiError::BadRequest(
            "contractId and s3Key are required".to_string(),
        ));
    };
    if contract_id.is_empty() || s3_key.is_empty() {
        return Err(ApiError::BadRequest(
            "contractId and s3Key are required".to_string(),
        ));
    }

    let span = tracing::Span::current();
    span.record("contract_id", contract_id.as_str());
    span.record("s3_key", s3_key.as_str());

    // An ID that was never issued cannot exist, whatever its shape.
    let contract_id = ContractId::parse(&contract_id)
        .map_err(|_| ApiError::NotFound(format!("contract {contract_id} not found")))?;

    let timer = ANALYSIS_DURATION.start_timer();
    let outcome = Analyzer::from_state(&state).run(contract_id, &s3_key).await;
    timer.observe_duration();

    match outcome? {
        AnalysisOutcome::Completed(_) => Ok(Json(AnalyzeResponse {
            status: ContractStatus::Completed,
            contract_id,
        })),
        AnalysisOutcome::Failed(failure) => {
            if let Some(write_err) = &failure.state_write {
                tracing::error!(
                    error = %write_err,
                    fault = %failure.fault,
                    "Failed to record analysis failure"
                );
            }
            Err(failure.fault.into())
        }
    }
}

/// GET /analysis/{id} - Fetch a contract record.
///
/// Never mutates. Numbers are normalized so whole values come back as
/// integers.
#[tracing::instrument(skip(state))]
pub async fn get_analysis(
    State(state): State<AppState>,
    Path(contract_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let not_found = || ApiError::NotFound(format!("contract {contract_id} not found"));

    let id = ContractId::parse(&contract_id).map_err(|_| not_found())?;
    let record = state.records.get_contract(id).await?.ok_or_else(not_found)?;

    let value = serde_json::to_value(&record)
        .map_err(|e| ApiError::Internal(format!("failed to encode record: {e}")))?;
    Ok(Json(normalize_numbers(value)))
}
