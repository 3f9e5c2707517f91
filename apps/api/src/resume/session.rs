//! Editor sessions: one live resume builder per user, held in memory.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};
use uuid::Uuid;

use crate::resume::export::{ExportPipeline, ExportTimings};
use crate::resume::notification::NotificationLevel;
use crate::resume::persistence::{watch_save_notifications, ResumeStore, SaveBridge};
use crate::resume::render::Renderer;
use crate::resume::sync::{OverwritePolicy, Synchronizer};

/// The editor state plus its save and export triggers.
///
/// The editor lock is never held across a save or export await, so edits
/// stay possible while either is pending.
pub struct EditorSession {
    pub editor: Mutex<Synchronizer>,
    pub saver: SaveBridge,
    pub exporter: ExportPipeline,
}

impl EditorSession {
    pub fn new(
        editor: Synchronizer,
        saver: SaveBridge,
        exporter: ExportPipeline,
    ) -> Self {
        Self {
            editor: Mutex::new(editor),
            saver,
            exporter,
        }
    }
}

/// Settings shared by every session the registry opens.
#[derive(Clone)]
pub struct SessionFactory {
    pub store: Arc<dyn ResumeStore>,
    pub renderer: Arc<dyn Renderer>,
    pub timings: ExportTimings,
    pub policy: OverwritePolicy,
}

impl SessionFactory {
    pub fn open(
        &self,
        user_id: Uuid,
        initial_content: String,
        display_name: Option<String>,
    ) -> EditorSession {
        let saver = SaveBridge::new(self.store.clone(), user_id);

        // Ends when the session (and with it the bridge) is dropped.
        tokio::spawn(watch_save_notifications(saver.subscribe(), move |n| {
            match n.level {
                NotificationLevel::Success => info!(%user_id, "{}", n.message),
                NotificationLevel::Error => warn!(%user_id, "{}", n.message),
            }
        }));

        EditorSession::new(
            Synchronizer::new(initial_content, display_name, self.policy),
            saver,
            ExportPipeline::new(self.renderer.clone(), self.timings),
        )
    }
}

#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<Uuid, Arc<EditorSession>>>>,
}

impl SessionRegistry {
    pub async fn get(&self, user_id: Uuid) -> Option<Arc<EditorSession>> {
        self.sessions.read().await.get(&user_id).cloned()
    }

    /// Installs a fresh session, replacing any previous one for the user.
    pub async fn insert(&self, user_id: Uuid, session: EditorSession) -> Arc<EditorSession> {
        let session = Arc::new(session);
        self.sessions
            .write()
            .await
            .insert(user_id, session.clone());
        session
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
