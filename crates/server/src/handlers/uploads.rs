//! Upload URL issuance and the signed direct-upload route.

use crate::error::{ApiError, ApiResult};
use crate::handlers::read_json_body;
use crate::metrics::{SIGNED_UPLOADS, UPLOAD_URLS_ISSUED};
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, Query, Request, State};
use axum::http::{StatusCode, header};
use contractguard_core::{ContractId, ContractRecord, validate_file_name};
use contractguard_storage::StorageError;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Maximum request body size for upload URL requests (64 KiB).
const MAX_ISSUE_BODY_SIZE: usize = 64 * 1024;

/// POST /upload-url request body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadUrlRequest {
    #[serde(default)]
    pub file_name: Option<String>,
    /// Content type hint, bound into S3 presigned URLs.
    #[serde(default)]
    pub file_type: Option<String>,
}

/// POST /upload-url response body.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadUrlResponse {
    pub upload_url: String,
    pub contract_id: ContractId,
    pub s3_key: String,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

/// POST /upload-url - Allocate a contract ID and a short-lived upload URL.
#[tracing::instrument(skip(state, req), fields(contract_id, s3_key))]
pub async fn issue_upload_url(
    State(state): State<AppState>,
    req: Request,
) -> ApiResult<Json<UploadUrlResponse>> {
    let body: UploadUrlRequest = read_json_body(req, MAX_ISSUE_BODY_SIZE).await?;

    let file_name = body
        .file_name
        .ok_or_else(|| ApiError::BadRequest("fileName is required".to_string()))?;
    validate_file_name(&file_name)?;

    let contract_id = ContractId::new();
    let record = ContractRecord::pending(contract_id, &file_name, body.file_type.clone());

    let span = tracing::Span::current();
    span.record("contract_id", tracing::field::display(contract_id));
    span.record("s3_key", record.s3_key.as_str());

    // Presign before persisting so an unusable key leaves no record behind.
    let upload = state
        .storage
        .presign_put(
            &record.s3_key,
            body.file_type.as_deref(),
            state.config.server.upload_url_ttl(),
        )
        .await?;

    state.records.create_contract(&record).await?;
    UPLOAD_URLS_ISSUED.inc();

    tracing::info!(
        file_name = %record.file_name,
        status = %record.status,
        expires_at = %upload.expires_at,
        "Upload URL issued"
    );

    Ok(Json(UploadUrlResponse {
        upload_url: upload.url,
        contract_id,
        s3_key: record.s3_key,
        expires_at: upload.expires_at,
    }))
}

/// Query string of a signed upload URL.
#[derive(Debug, Deserialize)]
pub struct SignedUploadParams {
    pub expires: Option<i64>,
    pub signature: Option<String>,
}

/// PUT /v1/objects/{*key} - Direct upload through a signed URL.
///
/// Only served for the filesystem backend; S3 clients upload to the bucket.
/// Each key accepts a single write.
#[tracing::instrument(skip(state, params, req), fields(key = %key))]
pub async fn put_signed_object(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(params): Query<SignedUploadParams>,
    req: Request,
) -> ApiResult<StatusCode> {
    let signer = state
        .upload_signer
        .as_ref()
        .ok_or_else(|| ApiError::NotFound("direct uploads are not enabled".to_string()))?;

    let (Some(expires), Some(signature)) = (params.expires, params.signature.as_deref()) else {
        SIGNED_UPLOADS.with_label_values(&["rejected"]).inc();
        return Err(ApiError::Forbidden(
            "upload URL is missing expires or signature".to_string(),
        ));
    };

    signer
        .verify(
            &key,
            expires,
            signature,
            OffsetDateTime::now_utc().unix_timestamp(),
        )
        .map_err(|e| {
            SIGNED_UPLOADS.with_label_values(&["rejected"]).inc();
            match e {
                StorageError::Expired => ApiError::UploadExpired,
                other => ApiError::Forbidden(other.to_string()),
            }
        })?;

    let limit = state.config.server.max_upload_bytes;
    let declared = req
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    if declared.is_some_and(|len| len > limit) {
        return Err(ApiError::PayloadTooLarge(format!(
            "document exceeds {limit} bytes"
        )));
    }

    let data = axum::body::to_bytes(req.into_body(), limit)
        .await
        .map_err(|e| ApiError::PayloadTooLarge(format!("failed to read document: {e}")))?;
    let size = data.len();

    if !state.storage.put_if_not_exists(&key, data).await? {
        SIGNED_UPLOADS.with_label_values(&["conflict"]).inc();
        return Err(ApiError::Conflict(format!("object {key} already uploaded")));
    }

    SIGNED_UPLOADS.with_label_values(&["stored"]).inc();
    tracing::info!(size, "Document uploaded");
    Ok(StatusCode::OK)
}
