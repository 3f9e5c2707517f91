use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::resume::export::ExportError;
use crate::resume::notification::Notification;
use crate::resume::persistence::{SaveError, StoreError, SAVE_FAILURE_MESSAGE};
use crate::resume::schema::FieldErrors;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid fields: {0}")]
    InvalidFields(FieldErrors),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Save failed: {0}")]
    Save(StoreError),

    #[error("Export failed: {0}")]
    Export(ExportError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<SaveError> for AppError {
    fn from(e: SaveError) -> Self {
        match e {
            SaveError::InFlight => AppError::Conflict("A save is already in progress".to_string()),
            SaveError::Store(e) => AppError::Save(e),
        }
    }
}

impl From<ExportError> for AppError {
    fn from(e: ExportError) -> Self {
        match e {
            ExportError::InProgress => {
                AppError::Conflict("An export is already in progress".to_string())
            }
            other => AppError::Export(other),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Database(e) => AppError::Database(e),
            other => AppError::Internal(anyhow::anyhow!(other)),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut fields = None;
        let mut notification: Option<Notification> = None;

        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::InvalidFields(errors) => {
                fields = Some(errors.clone());
                (
                    StatusCode::BAD_REQUEST,
                    "VALIDATION_ERROR",
                    "Some fields are invalid".to_string(),
                )
            }
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Save(e) => {
                tracing::error!("Save error: {e}");
                let message = match e {
                    StoreError::Rejected(msg) if !msg.trim().is_empty() => msg.clone(),
                    _ => SAVE_FAILURE_MESSAGE.to_string(),
                };
                notification = Some(Notification::error(message.clone()));
                (StatusCode::BAD_GATEWAY, "SAVE_FAILED", message)
            }
            AppError::Export(e) => {
                let toast = e.notification();
                let (status, code) = match e {
                    ExportError::ContentNotFound => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "CONTENT_NOT_FOUND")
                    }
                    ExportError::PopupBlocked => (StatusCode::SERVICE_UNAVAILABLE, "POPUP_BLOCKED"),
                    _ => {
                        tracing::error!("Export error: {e}");
                        (StatusCode::INTERNAL_SERVER_ERROR, "EXPORT_FAILED")
                    }
                };
                let message = toast.message.clone();
                notification = Some(toast);
                (status, code, message)
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let mut error = json!({
            "code": code,
            "message": message,
        });
        if let Some(fields) = fields {
            error["fields"] = json!(fields);
        }
        if let Some(notification) = notification {
            error["notification"] = json!(notification);
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}
