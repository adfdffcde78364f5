use async_trait::async_trait;

use super::aggregate::User;
use super::errors::UserResult;
use super::value_objects::{Email, UserId};

// ============================================================================
// User Repository Port
// ============================================================================
//
// Persistence of the aggregate's CURRENT state (the event store keeps the
// history). Implementations rehydrate rows through `User::reconstruct`, so a
// loaded aggregate carries an empty event buffer.
//
// ============================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert or update by id. The storage-level unique constraint on email
    /// is the authoritative uniqueness guard; implementations map its
    /// violation to `EmailAlreadyExists`.
    async fn save(&self, user: &User) -> UserResult<()>;

    async fn find_by_id(&self, id: &UserId) -> UserResult<Option<User>>;

    async fn find_by_email(&self, email: &Email) -> UserResult<Option<User>>;

    async fn exists_by_email(&self, email: &Email) -> UserResult<bool>;

    async fn delete(&self, id: &UserId) -> UserResult<()>;

    /// Newest first.
    async fn find_all(&self, limit: i64, offset: i64) -> UserResult<Vec<User>>;

    async fn count(&self) -> UserResult<i64>;
}
