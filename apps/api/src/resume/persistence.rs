//! Persistence Bridge: hands the current markdown snapshot to the resume store.
//!
//! At most one save is outstanding per editor. Outcomes are published on a
//! watch channel and notifications are derived from that status, so each
//! completed save yields exactly one toast regardless of who triggered it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{error, info};
use uuid::Uuid;

use crate::models::resume::ResumeRow;
use crate::resume::notification::Notification;

pub const SAVE_SUCCESS_MESSAGE: &str = "Resume saved successfully!";
pub const SAVE_FAILURE_MESSAGE: &str = "Failed to save resume";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Rejected(String),
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("A save is already in progress")]
    InFlight,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Content as persisted for one user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedResume {
    pub user_id: Uuid,
    pub content: String,
    pub updated_at: DateTime<Utc>,
}

impl From<ResumeRow> for SavedResume {
    fn from(row: ResumeRow) -> Self {
        Self {
            user_id: row.user_id,
            content: row.content,
            updated_at: row.updated_at,
        }
    }
}

/// The external save/load collaborator. One opaque markdown blob per user.
///
/// Carried in `AppState` as `Arc<dyn ResumeStore>`.
#[async_trait]
pub trait ResumeStore: Send + Sync {
    /// Overwrites the user's resume content.
    async fn save(&self, user_id: Uuid, content: &str) -> Result<SavedResume, StoreError>;

    async fn load(&self, user_id: Uuid) -> Result<Option<SavedResume>, StoreError>;
}

/// Postgres-backed store over the `resumes` table.
pub struct PgResumeStore {
    pool: PgPool,
}

impl PgResumeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResumeStore for PgResumeStore {
    async fn save(&self, user_id: Uuid, content: &str) -> Result<SavedResume, StoreError> {
        let result = sqlx::query_as::<_, ResumeRow>(
            r#"
            INSERT INTO resumes (user_id, content, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (user_id)
            DO UPDATE SET content = EXCLUDED.content, updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => Ok(row.into()),
            Err(sqlx::Error::Database(e)) if e.is_foreign_key_violation() => Err(
                StoreError::Rejected("No account found for this resume".to_string()),
            ),
            Err(e) => Err(e.into()),
        }
    }

    async fn load(&self, user_id: Uuid) -> Result<Option<SavedResume>, StoreError> {
        let row = sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(SavedResume::from))
    }
}

/// Ephemeral outcome of one save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Lifecycle of the most recent save, as observed by watchers.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveStatus {
    Idle,
    Saving,
    Saved(SavedResume),
    Failed(String),
}

impl SaveStatus {
    /// The notification a watcher shows when it observes this status.
    pub fn notification(&self) -> Option<Notification> {
        match self {
            SaveStatus::Idle | SaveStatus::Saving => None,
            SaveStatus::Saved(_) => Some(Notification::success(SAVE_SUCCESS_MESSAGE)),
            SaveStatus::Failed(message) => Some(Notification::error(message.clone())),
        }
    }

    pub fn result(&self) -> Option<SaveResult> {
        match self {
            SaveStatus::Idle | SaveStatus::Saving => None,
            SaveStatus::Saved(_) => Some(SaveResult {
                success: true,
                error: None,
            }),
            SaveStatus::Failed(message) => Some(SaveResult {
                success: false,
                error: Some(message.clone()),
            }),
        }
    }
}

/// Per-editor save trigger with an in-flight guard.
pub struct SaveBridge {
    store: Arc<dyn ResumeStore>,
    user_id: Uuid,
    in_flight: AtomicBool,
    status: watch::Sender<SaveStatus>,
}

impl SaveBridge {
    pub fn new(store: Arc<dyn ResumeStore>, user_id: Uuid) -> Self {
        let (status, _) = watch::channel(SaveStatus::Idle);
        Self {
            store,
            user_id,
            in_flight: AtomicBool::new(false),
            status,
        }
    }

    pub fn is_saving(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn subscribe(&self) -> watch::Receiver<SaveStatus> {
        self.status.subscribe()
    }

    pub fn status(&self) -> SaveStatus {
        self.status.borrow().clone()
    }

    /// Persists `content` verbatim. Rejected without a store call while
    /// another save is pending; the editor's content is never modified here.
    pub async fn submit(&self, content: String) -> Result<SavedResume, SaveError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(SaveError::InFlight);
        }
        let _guard = InFlightGuard(&self.in_flight);

        self.status.send_replace(SaveStatus::Saving);

        match self.store.save(self.user_id, &content).await {
            Ok(saved) => {
                info!(
                    "Saved resume for user {} ({} bytes)",
                    self.user_id,
                    saved.content.len()
                );
                self.status.send_replace(SaveStatus::Saved(saved.clone()));
                Ok(saved)
            }
            Err(e) => {
                error!("Resume save failed for user {}: {e}", self.user_id);
                let message = match &e {
                    StoreError::Rejected(msg) if !msg.trim().is_empty() => msg.clone(),
                    _ => SAVE_FAILURE_MESSAGE.to_string(),
                };
                self.status.send_replace(SaveStatus::Failed(message));
                Err(e.into())
            }
        }
    }
}

/// Clears an in-flight flag on every exit path, including cancellation.
pub(crate) struct InFlightGuard<'a>(pub(crate) &'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Forwards one notification per completed save to `sink` until the bridge is dropped.
pub async fn watch_save_notifications<F>(mut status: watch::Receiver<SaveStatus>, mut sink: F)
where
    F: FnMut(Notification),
{
    while status.changed().await.is_ok() {
        let notification = status.borrow_and_update().notification();
        if let Some(notification) = notification {
            sink(notification);
        }
    }
}
