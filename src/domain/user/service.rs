use std::sync::Arc;

use super::aggregate::User;
use super::errors::{UserError, UserResult};
use super::repository::UserRepository;
use super::value_objects::{Email, UserId, UserName};

// ============================================================================
// User Domain Service
// ============================================================================
//
// Cross-aggregate invariants that a single User instance cannot enforce,
// currently email uniqueness. The uniqueness check here is a fast path only;
// the storage-level constraint is the real guard against the race between
// check and save.
//
// ============================================================================

pub struct UserDomainService {
    repository: Arc<dyn UserRepository>,
}

impl UserDomainService {
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self { repository }
    }

    /// Build a new user after the uniqueness fast-path check.
    /// Persistence is the caller's responsibility.
    pub async fn create_user(
        &self,
        name: UserName,
        email: Email,
        password_hash: String,
    ) -> UserResult<User> {
        if self.repository.exists_by_email(&email).await? {
            return Err(UserError::EmailAlreadyExists(email.as_str().to_string()));
        }

        Ok(User::register(UserId::generate(), name, email, password_hash))
    }

    /// Load, check the new address is free, mutate. Persistence is the
    /// caller's responsibility.
    pub async fn change_user_email(&self, user_id: UserId, new_email: Email) -> UserResult<User> {
        let mut user = self
            .repository
            .find_by_id(&user_id)
            .await?
            .ok_or(UserError::UserNotFound(user_id))?;

        if self.repository.exists_by_email(&new_email).await? {
            return Err(UserError::EmailAlreadyExists(
                new_email.as_str().to_string(),
            ));
        }

        user.change_email(new_email);

        Ok(user)
    }

    pub async fn is_email_available(&self, email: &Email) -> UserResult<bool> {
        Ok(!self.repository.exists_by_email(email).await?)
    }

    /// Generate random ids until a lookup misses. With 122 random bits a
    /// collision is effectively impossible; the loop is a fallback, not a
    /// guarantee.
    pub async fn generate_unique_user_id(&self) -> UserResult<UserId> {
        loop {
            let user_id = UserId::generate();
            if self.repository.find_by_id(&user_id).await?.is_none() {
                return Ok(user_id);
            }
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
