//! Health check endpoint.

use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub storage: ComponentHealth,
    pub records: ComponentHealth,
    pub inference_backend: &'static str,
    pub model: String,
    pub playbook_rules: usize,
}

/// Health of one dependency.
#[derive(Debug, Serialize)]
pub struct ComponentHealth {
    pub backend: &'static str,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// GET /health - Storage and record store connectivity.
///
/// The inference endpoint is not probed; a check would cost a model call.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let storage = match state.storage.health_check().await {
        Ok(()) => ComponentHealth {
            backend: state.storage.backend_name(),
            ok: true,
            error: None,
        },
        Err(e) => ComponentHealth {
            backend: state.storage.backend_name(),
            ok: false,
            error: Some(e.to_string()),
        },
    };

    let records = match state.records.health_check().await {
        Ok(()) => ComponentHealth {
            backend: "sqlite",
            ok: true,
            error: None,
        },
        Err(e) => ComponentHealth {
            backend: "sqlite",
            ok: false,
            error: Some(e.to_string()),
        },
    };

    let healthy = storage.ok && records.ok;
    let status = if healthy {
        StatusCode::OK
    } else {
        tracing::warn!(storage_ok = storage.ok, records_ok = records.ok, "Health check failed");
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthResponse {
            status: if healthy { "ok" } else { "degraded" },
            storage,
            records,
            inference_backend: state.inference.backend_name(),
            model: state.inference.model().to_string(),
            playbook_rules: state.playbook.len(),
        }),
    )
}
