use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::infrastructure::read_model::{UserReadModel, UserReadModelStore};

// ============================================================================
// Postgres Read-Model Store
// ============================================================================

pub struct PostgresUserReadModelStore {
    pool: PgPool,
}

impl PostgresUserReadModelStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserReadModelStore for PostgresUserReadModelStore {
    async fn upsert(&self, row: &UserReadModel) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO user_read_models \
             (id, name, email, email_verified, registration_date, last_login, status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             ON CONFLICT (id) DO UPDATE SET \
                 name = EXCLUDED.name, \
                 email = EXCLUDED.email, \
                 email_verified = EXCLUDED.email_verified, \
                 registration_date = EXCLUDED.registration_date, \
                 status = EXCLUDED.status, \
                 updated_at = EXCLUDED.updated_at",
        )
        .bind(row.id)
        .bind(&row.name)
        .bind(&row.email)
        .bind(row.email_verified)
        .bind(row.registration_date)
        .bind(row.last_login)
        .bind(&row.status)
        .bind(row.created_at)
        .bind(row.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn mark_email_verified(
        &self,
        user_id: Uuid,
        verified_at: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        sqlx::query(
            "UPDATE user_read_models \
             SET email_verified = TRUE, updated_at = $2 \
             WHERE id = $1",
        )
        .bind(user_id)
        .bind(verified_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find(&self, user_id: Uuid) -> anyhow::Result<Option<UserReadModel>> {
        let row = sqlx::query_as::<_, UserReadModel>(
            "SELECT id, name, email, email_verified, registration_date, last_login, status, created_at, updated_at \
             FROM user_read_models WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }
}
