use async_trait::async_trait;
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use crate::models::user::User;

/// Read-only access to the current user's display name.
///
/// Lookups never fail outward: an unknown user, a missing name or a backend
/// error all come back as `None`.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn display_name(&self, user_id: Uuid) -> Option<String>;
}

/// Reads `users.full_name`.
pub struct PgIdentityProvider {
    pool: PgPool,
}

impl PgIdentityProvider {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityProvider for PgIdentityProvider {
    async fn display_name(&self, user_id: Uuid) -> Option<String> {
        let result = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await;

        match result {
            Ok(user) => user
                .and_then(|u| u.full_name)
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            Err(e) => {
                warn!("Display name lookup failed for user {user_id}: {e}");
                None
            }
        }
    }
}
