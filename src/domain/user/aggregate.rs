use chrono::{DateTime, Utc};

use super::errors::{UserError, UserResult};
use super::events::{UserDomainEvent, UserEmailVerified, UserRegistered};
use super::value_objects::{Email, UserId, UserName};

// ============================================================================
// User Aggregate - Business Logic
// ============================================================================
//
// The aggregate owns its event buffer: only its own mutating methods append
// to it, and the orchestrating handler drains it exactly once per use-case
// transaction. The buffer is never cleared internally so the handler stays in
// control of the publish boundary.
//
// ============================================================================

#[derive(Debug, Clone)]
pub struct User {
    id: UserId,
    name: UserName,
    email: Email,
    password_hash: String,
    email_verified_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    domain_events: Vec<UserDomainEvent>,
}

impl User {
    /// Register a new user. Pure factory: no I/O, records one
    /// `UserRegistered` event in the buffer.
    pub fn register(id: UserId, name: UserName, email: Email, password_hash: String) -> Self {
        let now = Utc::now();
        let mut user = Self {
            id,
            name,
            email,
            password_hash,
            email_verified_at: None,
            created_at: now,
            updated_at: now,
            domain_events: Vec::new(),
        };

        user.record_event(UserDomainEvent::Registered(UserRegistered {
            user_id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            occurred_at: now,
        }));

        user
    }

    /// Rebuild a user from persisted state.
    ///
    /// The single rehydration path: takes fields exactly as stored, starts
    /// with an empty event buffer and records nothing. Crate-internal so only
    /// repositories can reach it.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn reconstruct(
        id: UserId,
        name: UserName,
        email: Email,
        password_hash: String,
        email_verified_at: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            email,
            password_hash,
            email_verified_at,
            created_at,
            updated_at,
            domain_events: Vec::new(),
        }
    }

    /// Mark the email as verified, exactly once.
    pub fn verify_email(&mut self) -> UserResult<()> {
        if self.email_verified_at.is_some() {
            return Err(UserError::AlreadyVerified);
        }

        let now = Utc::now();
        self.email_verified_at = Some(now);
        self.updated_at = now;

        self.record_event(UserDomainEvent::EmailVerified(UserEmailVerified {
            user_id: self.id,
            email: self.email.clone(),
            verified_at: now,
            occurred_at: now,
        }));

        Ok(())
    }

    /// No-op when the name is unchanged.
    pub fn change_name(&mut self, new_name: UserName) {
        if self.name == new_name {
            return;
        }

        self.name = new_name;
        self.updated_at = Utc::now();
    }

    /// Changing the email resets verification; the new address must be
    /// verified again. No-op when the email is unchanged.
    pub fn change_email(&mut self, new_email: Email) {
        if self.email == new_email {
            return;
        }

        self.email = new_email;
        self.email_verified_at = None;
        self.updated_at = Utc::now();
    }

    pub fn change_password(&mut self, new_password_hash: String) {
        self.password_hash = new_password_hash;
        self.updated_at = Utc::now();
    }

    pub fn is_email_verified(&self) -> bool {
        self.email_verified_at.is_some()
    }

    // Getters

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn name(&self) -> &UserName {
        &self.name
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Opaque hash; stays inside the aggregate and its persistence mapping.
    pub(crate) fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn email_verified_at(&self) -> Option<DateTime<Utc>> {
        self.email_verified_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // Domain Events

    /// Read-only view of the buffered events.
    pub fn domain_events(&self) -> &[UserDomainEvent] {
        &self.domain_events
    }

    /// Drain the buffer: returns the recorded events and resets it.
    ///
    /// Called exactly once per use-case transaction, by the handler that
    /// publishes the events.
    pub fn take_domain_events(&mut self) -> Vec<UserDomainEvent> {
        std::mem::take(&mut self.domain_events)
    }

    fn record_event(&mut self, event: UserDomainEvent) {
        self.domain_events.push(event);
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
