//! Axum route handlers for the Resume Builder API.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::resume::composer::compose_resume;
use crate::resume::export::HeadlessLauncher;
use crate::resume::notification::Notification;
use crate::resume::persistence::{SaveResult, SavedResume, SAVE_SUCCESS_MESSAGE};
use crate::resume::schema::validate_sections;
use crate::resume::sections::ResumeSections;
use crate::resume::session::EditorSession;
use crate::resume::sync::{ActiveView, EditorSnapshot, FormChangeOutcome};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct ComposeRequest {
    pub sections: ResumeSections,
    pub display_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ComposeResponse {
    pub markdown: String,
}

#[derive(Debug, Serialize)]
pub struct ResumeContentResponse {
    pub content: String,
    pub saved: Option<SavedResume>,
}

#[derive(Debug, Deserialize)]
pub struct SectionsUpdate {
    pub user_id: Uuid,
    pub sections: ResumeSections,
}

#[derive(Debug, Deserialize)]
pub struct MarkdownUpdate {
    pub user_id: Uuid,
    pub markdown: String,
}

#[derive(Debug, Deserialize)]
pub struct ViewUpdate {
    pub user_id: Uuid,
    pub view: ActiveView,
}

#[derive(Debug, Deserialize)]
pub struct SessionRequest {
    pub user_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    #[serde(flatten)]
    pub editor: EditorSnapshot,
    pub is_saving: bool,
    pub is_generating: bool,
    /// Outcome of the most recent completed save, if any.
    pub last_save: Option<SaveResult>,
}

#[derive(Debug, Serialize)]
pub struct FormChangeResponse {
    pub outcome: FormChangeOutcome,
    #[serde(flatten)]
    pub session: SessionResponse,
}

#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub result: SaveResult,
    pub notification: Notification,
    pub saved: SavedResume,
}

impl From<SavedResume> for SaveResponse {
    /// Built from this save's own outcome; the shared status may already
    /// belong to a later save.
    fn from(saved: SavedResume) -> Self {
        Self {
            result: SaveResult {
                success: true,
                error: None,
            },
            notification: Notification::success(SAVE_SUCCESS_MESSAGE),
            saved,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/resume/compose
///
/// Stateless composition of structured sections into markdown.
pub async fn handle_compose(Json(req): Json<ComposeRequest>) -> Json<ComposeResponse> {
    let sections = req.sections.normalized();
    Json(ComposeResponse {
        markdown: compose_resume(&sections, req.display_name.as_deref()),
    })
}

/// GET /api/v1/resume
///
/// Returns the persisted markdown, or an empty document when nothing was saved.
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<ResumeContentResponse>, AppError> {
    let saved = state.store.load(params.user_id).await?;
    Ok(Json(ResumeContentResponse {
        content: saved.as_ref().map(|s| s.content.clone()).unwrap_or_default(),
        saved,
    }))
}

/// POST /api/v1/resume/session
///
/// Opens (or reopens) the editor from the persisted content and the user's display name.
pub async fn handle_open_session(
    State(state): State<AppState>,
    Json(req): Json<SessionRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let initial_content = state
        .store
        .load(req.user_id)
        .await?
        .map(|saved| saved.content)
        .unwrap_or_default();
    let display_name = state.identity.display_name(req.user_id).await;

    let session = state.session_factory.open(req.user_id, initial_content, display_name);
    let session = state.sessions.insert(req.user_id, session).await;
    info!("Opened resume editor for user {}", req.user_id);

    Ok(Json(session_response(&session).await))
}

/// GET /api/v1/resume/session
pub async fn handle_get_session(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = require_session(&state, params.user_id).await?;
    Ok(Json(session_response(&session).await))
}

/// PUT /api/v1/resume/session/sections
///
/// Structured form change. Regenerates the preview when the form view is active.
pub async fn handle_update_sections(
    State(state): State<AppState>,
    Json(req): Json<SectionsUpdate>,
) -> Result<Json<FormChangeResponse>, AppError> {
    let session = require_session(&state, req.user_id).await?;
    let outcome = session.editor.lock().await.update_sections(req.sections);
    Ok(Json(FormChangeResponse {
        outcome,
        session: session_response(&session).await,
    }))
}

/// PUT /api/v1/resume/session/markdown
///
/// Direct edit of the markdown. Switches the editor to manual sync.
pub async fn handle_edit_markdown(
    State(state): State<AppState>,
    Json(req): Json<MarkdownUpdate>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = require_session(&state, req.user_id).await?;
    session.editor.lock().await.edit_markdown(req.markdown);
    Ok(Json(session_response(&session).await))
}

/// POST /api/v1/resume/session/view
pub async fn handle_set_view(
    State(state): State<AppState>,
    Json(req): Json<ViewUpdate>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = require_session(&state, req.user_id).await?;
    session.editor.lock().await.set_active_view(req.view);
    Ok(Json(session_response(&session).await))
}

/// POST /api/v1/resume/session/mode
///
/// Toggles preview/edit. The response carries the overwrite warning when entering edit.
pub async fn handle_toggle_mode(
    State(state): State<AppState>,
    Json(req): Json<SessionRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = require_session(&state, req.user_id).await?;
    session.editor.lock().await.toggle_preview_mode();
    Ok(Json(session_response(&session).await))
}

/// POST /api/v1/resume/session/resync
pub async fn handle_resync(
    State(state): State<AppState>,
    Json(req): Json<SessionRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = require_session(&state, req.user_id).await?;
    session.editor.lock().await.resync();
    Ok(Json(session_response(&session).await))
}

/// POST /api/v1/resume/session/save
///
/// Validates the form, then persists whatever markdown the preview currently shows.
pub async fn handle_save(
    State(state): State<AppState>,
    Json(req): Json<SessionRequest>,
) -> Result<Json<SaveResponse>, AppError> {
    let session = require_session(&state, req.user_id).await?;
    if session.saver.is_saving() {
        return Err(AppError::Conflict("A save is already in progress".to_string()));
    }

    let snapshot = {
        let editor = session.editor.lock().await;
        validate_sections(editor.sections()).map_err(AppError::InvalidFields)?;
        editor.submission_snapshot()
    };

    let saved = session.saver.submit(snapshot).await?;
    Ok(Json(SaveResponse::from(saved)))
}

/// POST /api/v1/resume/session/export
///
/// Returns the print-ready HTML document for the current preview.
pub async fn handle_export(
    State(state): State<AppState>,
    Json(req): Json<SessionRequest>,
) -> Result<Response, AppError> {
    let session = require_session(&state, req.user_id).await?;
    let markdown = session.editor.lock().await.preview().to_string();

    let report = session.exporter.export(&markdown, &HeadlessLauncher).await?;
    let notification = report.notification();

    Ok((
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8".to_string()),
            (
                header::HeaderName::from_static("x-notification"),
                notification.message,
            ),
        ],
        report.document.html,
    )
        .into_response())
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

async fn require_session(state: &AppState, user_id: Uuid) -> Result<Arc<EditorSession>, AppError> {
    state
        .sessions
        .get(user_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("No open resume editor for user {user_id}")))
}

async fn session_response(session: &EditorSession) -> SessionResponse {
    let editor = session.editor.lock().await.snapshot();
    SessionResponse {
        editor,
        is_saving: session.saver.is_saving(),
        is_generating: session.exporter.is_generating(),
        last_save: session.saver.status().result(),
    }
}
