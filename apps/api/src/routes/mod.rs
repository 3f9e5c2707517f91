pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::resume::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/resume", get(handlers::handle_get_resume))
        .route("/api/v1/resume/compose", post(handlers::handle_compose))
        .route(
            "/api/v1/resume/session",
            get(handlers::handle_get_session).post(handlers::handle_open_session),
        )
        .route(
            "/api/v1/resume/session/sections",
            put(handlers::handle_update_sections),
        )
        .route(
            "/api/v1/resume/session/markdown",
            put(handlers::handle_edit_markdown),
        )
        .route("/api/v1/resume/session/view", post(handlers::handle_set_view))
        .route("/api/v1/resume/session/mode", post(handlers::handle_toggle_mode))
        .route("/api/v1/resume/session/resync", post(handlers::handle_resync))
        .route("/api/v1/resume/session/save", post(handlers::handle_save))
        .route("/api/v1/resume/session/export", post(handlers::handle_export))
        .with_state(state)
}
