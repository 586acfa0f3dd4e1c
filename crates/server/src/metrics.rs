//! Prometheus metrics for the ContractGuard server.
//!
//! Exposes counters for issued upload URLs and signed uploads, analysis
//! outcomes, and latency histograms for the analysis pipeline and the
//! inference call inside it.
//!
//! The `/metrics` endpoint is unauthenticated. Metrics carry no contract IDs
//! or document content, only aggregate counts; restrict the endpoint at the
//! network level in production.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{
    self, Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry,
    TextEncoder,
};
use std::sync::{LazyLock, Once};

/// Global Prometheus registry for all metrics.
pub static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

pub static UPLOAD_URLS_ISSUED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "contractguard_upload_urls_issued_total",
        "Total number of upload URLs issued",
    )
    .expect("metric creation failed")
});

pub static SIGNED_UPLOADS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "contractguard_signed_uploads_total",
            "Direct uploads through the signed object route, by result",
        ),
        &["result"],
    )
    .expect("metric creation failed")
});

pub static ANALYSES: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "contractguard_analyses_total",
            "Finished analyses by outcome",
        ),
        &["outcome"],
    )
    .expect("metric creation failed")
});

pub static STATE_WRITE_FAILURES: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "contractguard_state_write_failures_total",
        "Failed attempts to record a failed analysis on the contract record",
    )
    .expect("metric creation failed")
});

pub static DOCUMENTS_TRUNCATED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "contractguard_documents_truncated_total",
        "Documents cut down to the character budget before prompting",
    )
    .expect("metric creation failed")
});

pub static ANALYSIS_DURATION: LazyLock<Histogram> = LazyLock::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "contractguard_analysis_duration_seconds",
            "End-to-end time of one analysis request",
        )
        .buckets(vec![0.5, 1.0, 2.5, 5.0, 10.0, 20.0, 30.0, 60.0, 120.0, 300.0]),
    )
    .expect("metric creation failed")
});

pub static INFERENCE_DURATION: LazyLock<Histogram> = LazyLock::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "contractguard_inference_duration_seconds",
            "Time spent waiting on the inference endpoint",
        )
        .buckets(vec![0.5, 1.0, 2.5, 5.0, 10.0, 20.0, 30.0, 60.0, 120.0]),
    )
    .expect("metric creation failed")
});

static REGISTER_ONCE: Once = Once::new();

/// Register all metrics with the global registry.
///
/// Idempotent, so tests and embedded routers can call it freely.
pub fn register_metrics() {
    REGISTER_ONCE.call_once(|| {
        REGISTRY
            .register(Box::new(UPLOAD_URLS_ISSUED.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(SIGNED_UPLOADS.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(ANALYSES.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(STATE_WRITE_FAILURES.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(DOCUMENTS_TRUNCATED.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(ANALYSIS_DURATION.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(INFERENCE_DURATION.clone()))
            .expect("metric registration failed");
    });
}

/// GET /metrics - Prometheus metrics endpoint.
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = Vec::new();
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            format!("Failed to encode metrics: {e}").into_bytes(),
        ),
    }
}

/// Count a finished analysis under its outcome label.
pub fn record_analysis_outcome(outcome: &str) {
    ANALYSES.with_label_values(&[outcome]).inc();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_registration() {
        register_metrics();
        register_metrics();
        record_analysis_outcome("completed");
        assert!(ANALYSES.with_label_values(&["completed"]).get() >= 1);
    }
}
