//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Binds the LLM proxy endpoints, the snapshot store REST surface, and the
//! diagnostics pages under a single Axum router. CORS stays permissive: the
//! browser IDE is served from a separate origin during development.

pub mod chat;
pub mod contexts;
pub mod diagnostics;
pub mod generate;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Screenshot uploads can be large; the axum default body cap is too small.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/chat", post(chat::chat))
        .route("/api/generate-html", post(generate::generate_html))
        .route("/api/test-key", get(diagnostics::test_key))
        .route("/api/test-svg", get(diagnostics::test_svg))
        .route(
            "/api/contexts",
            get(contexts::list_contexts)
                .post(contexts::create_context)
                .delete(contexts::clear_contexts),
        )
        .route(
            "/api/contexts/{id}",
            get(contexts::get_context)
                .patch(contexts::update_context)
                .delete(contexts::delete_context),
        )
        .route("/api/live-state", get(contexts::get_live_state).put(contexts::put_live_state))
        .route("/api/export", post(contexts::export_files))
        .route("/healthz", get(healthz))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
