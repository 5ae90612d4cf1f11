//! API Router configuration
//!
//! Routes live at the root so existing compiler clients keep working.

use super::handlers;
use super::state::AppState;
use crate::config::ServerConfig;
use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the main API router
pub fn create_router(state: AppState, server: &ServerConfig) -> Router {
    let router = Router::new()
        // Service info and health
        .route("/", get(handlers::service_info))
        .route("/health", get(handlers::health_check))
        // Discovery
        .route("/boards", get(handlers::list_boards))
        .route("/platforms", get(handlers::list_platforms))
        // Compilation
        .route("/compile", post(handlers::compile_code))
        .route("/compile/upload", post(handlers::compile_upload))
        .route("/jobs", post(handlers::submit_job))
        .route("/jobs", get(handlers::list_jobs))
        // Jobs
        .route("/status/:job_id", get(handlers::job_status))
        .route("/download/:job_id", get(handlers::download_firmware))
        .route("/download/:job_id/all", get(handlers::download_all))
        .route("/cleanup/:job_id", delete(handlers::cleanup_job))
        .layer(DefaultBodyLimit::max(server.max_body_size))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if server.enable_cors {
        router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        router
    }
}
