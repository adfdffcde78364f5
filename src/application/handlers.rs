use std::sync::Arc;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher};

use super::commands::{RegisterUserCommand, VerifyEmailCommand};
use super::dto::UserResponse;
use super::queries::{GetUserQuery, GetUsersQuery};
use crate::domain::user::{
    Email, UserDomainService, UserError, UserId, UserName, UserRepository, UserResult,
};
use crate::event_sourcing::EventDispatcher;
use crate::domain::user::UserDomainEvent;

// ============================================================================
// Command / Query Handlers
// ============================================================================
//
// Stateless single-purpose orchestrators. Command handlers own the publish
// boundary: save the aggregate, drain its event buffer once, hand the events
// to the dispatcher. Query handlers are pure repository reads.
//
// ============================================================================

fn hash_password(plain: &str) -> UserResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| UserError::PasswordHash(err.to_string()))
}

pub struct RegisterUserHandler {
    repository: Arc<dyn UserRepository>,
    domain_service: Arc<UserDomainService>,
    dispatcher: Arc<EventDispatcher<UserDomainEvent>>,
}

impl RegisterUserHandler {
    pub fn new(
        repository: Arc<dyn UserRepository>,
        domain_service: Arc<UserDomainService>,
        dispatcher: Arc<EventDispatcher<UserDomainEvent>>,
    ) -> Self {
        Self {
            repository,
            domain_service,
            dispatcher,
        }
    }

    pub async fn handle(&self, command: RegisterUserCommand) -> UserResult<UserResponse> {
        let data = &command.data;

        let name = UserName::new(&data.name)?;
        let email = Email::new(&data.email)?;
        let password_hash = hash_password(&data.password)?;

        let mut user = self
            .domain_service
            .create_user(name, email, password_hash)
            .await?;

        self.repository.save(&user).await?;

        let events = user.take_domain_events();
        self.dispatcher
            .dispatch_events(&events)
            .await
            .map_err(UserError::Dispatch)?;

        Ok(UserResponse::from_user(&user))
    }
}

pub struct VerifyEmailHandler {
    repository: Arc<dyn UserRepository>,
    dispatcher: Arc<EventDispatcher<UserDomainEvent>>,
}

impl VerifyEmailHandler {
    pub fn new(
        repository: Arc<dyn UserRepository>,
        dispatcher: Arc<EventDispatcher<UserDomainEvent>>,
    ) -> Self {
        Self {
            repository,
            dispatcher,
        }
    }

    pub async fn handle(&self, command: VerifyEmailCommand) -> UserResult<UserResponse> {
        let user_id = UserId::parse(&command.user_id)?;

        let mut user = self
            .repository
            .find_by_id(&user_id)
            .await?
            .ok_or(UserError::UserNotFound(user_id))?;

        user.verify_email()?;
        self.repository.save(&user).await?;

        let events = user.take_domain_events();
        self.dispatcher
            .dispatch_events(&events)
            .await
            .map_err(UserError::Dispatch)?;

        Ok(UserResponse::from_user(&user))
    }
}

pub struct GetUserHandler {
    repository: Arc<dyn UserRepository>,
}

impl GetUserHandler {
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(&self, query: GetUserQuery) -> UserResult<Option<UserResponse>> {
        let user_id = UserId::parse(&query.user_id)?;

        let user = self.repository.find_by_id(&user_id).await?;

        Ok(user.as_ref().map(UserResponse::from_user))
    }
}

pub struct GetUsersHandler {
    repository: Arc<dyn UserRepository>,
}

impl GetUsersHandler {
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(&self, query: GetUsersQuery) -> UserResult<Vec<UserResponse>> {
        if let Some(term) = &query.search_term {
            tracing::debug!(search_term = %term, "search filtering is not implemented; ignoring term");
        }

        let users = self.repository.find_all(query.limit, query.offset).await?;

        Ok(users.iter().map(UserResponse::from_user).collect())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
