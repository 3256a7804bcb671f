//! Router assembly: workflow API, static presentation bundle, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;

/// Build the application router with:
/// - workflow API under `/api/v1/...`
/// - the presentation bundle from `static_dir` with index fallback
/// - permissive CORS so a dev server on another port can call in
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    let static_dir = state.config.static_dir.clone();
    // Uploads arrive base64-encoded: 4 bytes on the wire per 3 bytes of PDF.
    let upload_body_limit = state.config.max_upload_mb * 1024 * 1024 / 3 * 4 + 64 * 1024;
    let static_service = ServeDir::new(&static_dir)
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new(format!("{static_dir}/index.html")));

    Router::new()
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/workflow", get(http::http_get_workflow))
        .route("/api/v1/upload", post(http::http_post_upload))
        .route("/api/v1/generate", post(http::http_post_generate))
        .route("/api/v1/export", get(http::http_get_export))
        .layer(DefaultBodyLimit::max(upload_body_limit))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .fallback_service(static_service)
}
