use std::sync::Arc;

use crate::config::Config;
use crate::resume::identity::IdentityProvider;
use crate::resume::persistence::ResumeStore;
use crate::resume::session::{SessionFactory, SessionRegistry};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Save/load collaborator. Default: PgResumeStore.
    pub store: Arc<dyn ResumeStore>,
    /// Display-name collaborator. Default: PgIdentityProvider.
    pub identity: Arc<dyn IdentityProvider>,
    pub session_factory: SessionFactory,
    /// Live editors, one per user.
    pub sessions: SessionRegistry,
}
