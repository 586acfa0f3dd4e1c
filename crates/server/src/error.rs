//! API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use contractguard_core::CompletionError;
use contractguard_inference::InferenceError;
use contractguard_records::RecordError;
use contractguard_storage::StorageError;
use serde::Serialize;

/// API error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
    /// Error code for programmatic handling.
    pub code: String,
}

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("upload URL expired")]
    UploadExpired,

    #[error("{0}")]
    PayloadTooLarge(String),

    /// The document could not be turned into a prompt.
    #[error("document error: {0}")]
    Document(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("record store error: {0}")]
    Records(#[from] RecordError),

    #[error("inference error: {0}")]
    Inference(#[from] InferenceError),

    /// Model output that could not be parsed into an analysis.
    #[error("{0}")]
    MalformedCompletion(#[from] CompletionError),

    #[error("{0}")]
    Core(#[from] contractguard_core::Error),
}

impl ApiError {
    /// Get the error code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::BadRequest(_) => "bad_request",
            Self::Conflict(_) => "conflict",
            Self::Forbidden(_) => "forbidden",
            Self::UploadExpired => "upload_expired",
            Self::PayloadTooLarge(_) => "payload_too_large",
            Self::Document(_) => "document_error",
            Self::Internal(_) => "internal_error",
            Self::Storage(_) => "storage_error",
            Self::Records(_) => "record_store_error",
            Self::Inference(_) => "inference_error",
            Self::MalformedCompletion(_) => "malformed_completion",
            Self::Core(contractguard_core::Error::InvalidTransition { .. }) => "conflict",
            Self::Core(_) => "bad_request",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::UploadExpired => StatusCode::GONE,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Document(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Storage(e) => match e {
                StorageError::InvalidKey(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Records(e) => match e {
                RecordError::NotFound(_) => StatusCode::NOT_FOUND,
                RecordError::AlreadyExists(_) => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Inference(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::MalformedCompletion(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Core(e) => match e {
                contractguard_core::Error::InvalidTransition { .. } => StatusCode::CONFLICT,
                contractguard_core::Error::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
                contractguard_core::Error::DocumentTooLarge { .. } => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
                _ => StatusCode::BAD_REQUEST,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: self.to_string(),
            code: self.code().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;
