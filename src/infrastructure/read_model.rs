use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

// ============================================================================
// User Read Model - Denormalized Query View
// ============================================================================
//
// One row per user, keyed by user id. Owned entirely by the projection
// handlers: command handlers never write it, query handlers read the
// aggregate store instead. Eventually consistent with the source of truth.
//
// ============================================================================

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UserReadModel {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub email_verified: bool,
    pub registration_date: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[async_trait]
pub trait UserReadModelStore: Send + Sync {
    /// Insert or fully overwrite the row for `row.id`.
    async fn upsert(&self, row: &UserReadModel) -> anyhow::Result<()>;

    /// Flip the verified flag. A missing row is a no-op: the registration
    /// projection may not have landed yet.
    async fn mark_email_verified(
        &self,
        user_id: Uuid,
        verified_at: DateTime<Utc>,
    ) -> anyhow::Result<()>;

    async fn find(&self, user_id: Uuid) -> anyhow::Result<Option<UserReadModel>>;
}
