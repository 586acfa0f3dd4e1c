//! HTTP request handlers.

pub mod analysis;
pub mod health;
pub mod uploads;

pub use analysis::*;
pub use health::*;
pub use uploads::*;

use crate::error::{ApiError, ApiResult};
use axum::extract::Request;
use serde::de::DeserializeOwned;

/// Read a JSON request body.
///
/// Bodies are parsed by hand rather than with the `Json` extractor so that a
/// missing body, or one sent without a JSON content type, is treated as `{}`
/// and reaches the handler's own field validation.
pub(crate) async fn read_json_body<T>(req: Request, limit: usize) -> ApiResult<T>
where
    T: DeserializeOwned + Default,
{
    let bytes = axum::body::to_bytes(req.into_body(), limit)
        .await
        .map_err(|e| ApiError::BadRequest(format!("failed to read body: {e}")))?;

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }

    serde_json::from_slice(&bytes).map_err(|e| ApiError::BadRequest(format!("invalid JSON: {e}")))
}
