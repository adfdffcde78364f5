use super::value_objects::UserId;
use crate::event_sourcing::EventStoreError;

// ============================================================================
// User Domain Errors
// ============================================================================

pub type UserResult<T> = Result<T, UserError>;

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("invalid user id: {0}")]
    InvalidIdentifier(String),

    #[error("invalid email: {0}")]
    InvalidEmail(String),

    #[error("invalid name: {0}")]
    InvalidName(String),

    #[error("email is already verified")]
    AlreadyVerified,

    #[error("user with email {0} already exists")]
    EmailAlreadyExists(String),

    #[error("user not found: {0}")]
    UserNotFound(UserId),

    #[error("password hashing failed: {0}")]
    PasswordHash(String),

    #[error(transparent)]
    EventStore(#[from] EventStoreError),

    #[error("event dispatch failed: {0}")]
    Dispatch(anyhow::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
