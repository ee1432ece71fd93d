//! Router assembly: HTTP endpoints, WebSocket upgrade, static files, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
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
pub mod ws;

/// Build the application router with:
/// - WebSocket at `/ws`
/// - REST-ish API under `/api/v1/...`
/// - Static SPA from `static_dir` with index fallback
/// - CORS (allow any origin/method/headers)
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>, static_dir: &str) -> Router {
    let static_service = ServeDir::new(static_dir)
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new(format!("{static_dir}/index.html")));

    Router::new()
        // WebSocket
        .route("/ws", get(ws::ws_upgrade))
        // Catalog + authoring
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/lectures", get(http::http_list_lectures).post(http::http_author_lecture))
        .route("/api/v1/lectures/:id", get(http::http_get_lecture))
        .route("/api/v1/authored", get(http::http_list_authored))
        .route("/api/v1/authored/:category/:id/source", get(http::http_get_authored_source))
        // Learner progress
        .route(
            "/api/v1/lectures/:id/progress",
            get(http::http_get_progress).delete(http::http_reset_progress),
        )
        .route("/api/v1/lectures/:id/readiness/start", post(http::http_start_readiness))
        .route(
            "/api/v1/lectures/:id/readiness/draft",
            get(http::http_get_readiness_draft).put(http::http_put_readiness_draft),
        )
        .route("/api/v1/lectures/:id/readiness", post(http::http_submit_readiness))
        .route("/api/v1/lectures/:id/watch", post(http::http_confirm_watch))
        .route("/api/v1/lectures/:id/reflection/initial", post(http::http_submit_initial_reflection))
        .route(
            "/api/v1/lectures/:id/mastery",
            get(http::http_get_mastery).post(http::http_submit_mastery_reflection),
        )
        .route("/api/v1/lectures/:id/mastery/:attempt/feedback", post(http::http_attach_feedback))
        .route("/api/v1/lectures/:id/mastery/:attempt/status", post(http::http_set_attempt_status))
        .route("/api/v1/lectures/:id/mastery/:attempt/prompt", get(http::http_get_attempt_prompt))
        // State + CORS + HTTP tracing
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
        // Frontend fallback
        .fallback_service(static_service)
}
