use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use super::violates_constraint;
use crate::domain::user::{Email, User, UserError, UserId, UserName, UserRepository, UserResult};

// ============================================================================
// Postgres User Repository
// ============================================================================
//
// Stores the aggregate's current state in the `users` table. Rows are mapped
// back through `User::reconstruct`, the single rehydration path, so loaded
// aggregates always carry an empty event buffer. The unique constraint on
// `users.email` is the authoritative uniqueness guard; the domain service's
// exists_by_email check is only the fast path.
//
// ============================================================================

const EMAIL_CONSTRAINT: &str = "users_email_key";

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_user(row: PgRow) -> UserResult<User> {
        let id: uuid::Uuid = row.try_get("id")?;
        let name = UserName::new(row.try_get::<String, _>("name")?)?;
        let email = Email::new(row.try_get::<String, _>("email")?)?;

        Ok(User::reconstruct(
            UserId::from_uuid(id),
            name,
            email,
            row.try_get("password_hash")?,
            row.try_get("email_verified_at")?,
            row.try_get("created_at")?,
            row.try_get("updated_at")?,
        ))
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn save(&self, user: &User) -> UserResult<()> {
        let result = sqlx::query(
            "INSERT INTO users \
             (id, name, email, password_hash, email_verified_at, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (id) DO UPDATE SET \
                 name = EXCLUDED.name, \
                 email = EXCLUDED.email, \
                 password_hash = EXCLUDED.password_hash, \
                 email_verified_at = EXCLUDED.email_verified_at, \
                 updated_at = EXCLUDED.updated_at",
        )
        .bind(user.id().as_uuid())
        .bind(user.name().as_str())
        .bind(user.email().as_str())
        .bind(user.password_hash())
        .bind(user.email_verified_at())
        .bind(user.created_at())
        .bind(user.updated_at())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) if violates_constraint(&err, EMAIL_CONSTRAINT) => Err(
                UserError::EmailAlreadyExists(user.email().as_str().to_string()),
            ),
            Err(err) => Err(err.into()),
        }
    }

    async fn find_by_id(&self, id: &UserId) -> UserResult<Option<User>> {
        let row = sqlx::query(
            "SELECT id, name, email, password_hash, email_verified_at, created_at, updated_at \
             FROM users WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_user).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> UserResult<Option<User>> {
        let row = sqlx::query(
            "SELECT id, name, email, password_hash, email_verified_at, created_at, updated_at \
             FROM users WHERE email = $1",
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_user).transpose()
    }

    async fn exists_by_email(&self, email: &Email) -> UserResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email.as_str())
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    async fn delete(&self, id: &UserId) -> UserResult<()> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn find_all(&self, limit: i64, offset: i64) -> UserResult<Vec<User>> {
        let rows = sqlx::query(
            "SELECT id, name, email, password_hash, email_verified_at, created_at, updated_at \
             FROM users \
             ORDER BY created_at DESC \
             LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_user).collect()
    }

    async fn count(&self) -> UserResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
