//! Route configuration.

use crate::handlers;
use crate::metrics::metrics_handler;
use crate::state::AppState;
use axum::Router;
use axum::http::{HeaderValue, header};
use axum::routing::{get, post, put};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/upload-url", post(handlers::issue_upload_url))
        .route("/analyze", post(handlers::run_analysis))
        .route("/analysis/{contract_id}", get(handlers::get_analysis))
        // Health check (unauthenticated for load balancers/k8s probes)
        .route("/health", get(handlers::health_check));

    // Signed direct uploads for the filesystem backend. The handler answers
    // 404 when no signer is configured.
    let upload_routes = Router::new().route(
        "/v1/objects/{*key}",
        put(handlers::put_signed_object),
    );

    let mut router = Router::new().merge(api_routes).merge(upload_routes);

    // When enabled, restrict /metrics to the Prometheus scraper at the network level.
    if state.config.server.metrics_enabled {
        let metrics_routes = Router::new().route("/metrics", get(metrics_handler));
        router = router.merge(metrics_routes);
    }

    let origin = allow_origin_header(&state.config.server.cors_allow_origin);
    let cors = (if origin == "*" {
        CorsLayer::new().allow_origin(Any)
    } else {
        CorsLayer::new().allow_origin(AllowOrigin::exact(origin.clone()))
    })
    .allow_methods(Any)
    .allow_headers(Any);

    // Layers run outermost first: TraceLayer -> ACAO header -> CORS -> Handler
    router
        .layer(cors)
        .layer(SetResponseHeaderLayer::if_not_present(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            origin,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn allow_origin_header(configured: &str) -> HeaderValue {
    HeaderValue::from_str(configured).unwrap_or_else(|e| {
        tracing::error!(
            origin = configured,
            error = %e,
            "Invalid server.cors_allow_origin, falling back to *"
        );
        HeaderValue::from_static("*")
    })
}
