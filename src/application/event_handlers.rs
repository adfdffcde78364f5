use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use crate::domain::user::{
    UserDomainEvent, UserEmailVerified, UserRegistered, USER_EMAIL_VERIFIED, USER_REGISTERED,
};
use crate::event_sourcing::{DomainEvent, EventListener, EventStore};
use crate::infrastructure::read_model::{UserReadModel, UserReadModelStore};
use crate::metrics::Metrics;

// ============================================================================
// Read-Model Projector - Domain Event Handlers
// ============================================================================
//
// One listener per event type. Each does two things, in order:
// 1. Append the event to the event store under its aggregate id
// 2. Upsert the denormalized read-model row
// A failure of either step is logged with the aggregate id and full error
// context, then re-raised; the dispatcher does not retry.
//
// ============================================================================

pub struct UserRegisteredHandler {
    event_store: Arc<dyn EventStore<UserDomainEvent>>,
    read_models: Arc<dyn UserReadModelStore>,
    metrics: Arc<Metrics>,
}

impl UserRegisteredHandler {
    pub fn new(
        event_store: Arc<dyn EventStore<UserDomainEvent>>,
        read_models: Arc<dyn UserReadModelStore>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            event_store,
            read_models,
            metrics,
        }
    }

    async fn project(&self, payload: &UserRegistered, event: &UserDomainEvent) -> anyhow::Result<()> {
        self.event_store
            .append(payload.user_id.as_uuid(), std::slice::from_ref(event), None)
            .await?;

        let row = UserReadModel {
            id: payload.user_id.as_uuid(),
            name: payload.name.as_str().to_string(),
            email: payload.email.as_str().to_string(),
            email_verified: false,
            registration_date: payload.occurred_at,
            last_login: None,
            status: "active".to_string(),
            created_at: payload.occurred_at,
            updated_at: payload.occurred_at,
        };
        self.read_models.upsert(&row).await?;

        Ok(())
    }
}

#[async_trait]
impl EventListener<UserDomainEvent> for UserRegisteredHandler {
    fn event_type(&self) -> &'static str {
        USER_REGISTERED
    }

    async fn handle(&self, event: &UserDomainEvent) -> anyhow::Result<()> {
        let UserDomainEvent::Registered(payload) = event else {
            return Ok(());
        };

        let started = Instant::now();
        let result = self.project(payload, event).await;
        self.metrics.record_projection(
            event.event_type(),
            started.elapsed().as_secs_f64(),
            result.is_ok(),
        );

        match &result {
            Ok(()) => {
                tracing::info!(
                    user_id = %payload.user_id,
                    email = %payload.email,
                    event_type = USER_REGISTERED,
                    "user registered event processed"
                );
            }
            Err(err) => {
                tracing::error!(
                    user_id = %payload.user_id,
                    error = ?err,
                    "failed to process user registered event"
                );
            }
        }

        result
    }
}

pub struct UserEmailVerifiedHandler {
    event_store: Arc<dyn EventStore<UserDomainEvent>>,
    read_models: Arc<dyn UserReadModelStore>,
    metrics: Arc<Metrics>,
}

impl UserEmailVerifiedHandler {
    pub fn new(
        event_store: Arc<dyn EventStore<UserDomainEvent>>,
        read_models: Arc<dyn UserReadModelStore>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            event_store,
            read_models,
            metrics,
        }
    }

    async fn project(
        &self,
        payload: &UserEmailVerified,
        event: &UserDomainEvent,
    ) -> anyhow::Result<()> {
        self.event_store
            .append(payload.user_id.as_uuid(), std::slice::from_ref(event), None)
            .await?;

        self.read_models
            .mark_email_verified(payload.user_id.as_uuid(), payload.verified_at)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl EventListener<UserDomainEvent> for UserEmailVerifiedHandler {
    fn event_type(&self) -> &'static str {
        USER_EMAIL_VERIFIED
    }

    async fn handle(&self, event: &UserDomainEvent) -> anyhow::Result<()> {
        let UserDomainEvent::EmailVerified(payload) = event else {
            return Ok(());
        };

        let started = Instant::now();
        let result = self.project(payload, event).await;
        self.metrics.record_projection(
            event.event_type(),
            started.elapsed().as_secs_f64(),
            result.is_ok(),
        );

        match &result {
            Ok(()) => {
                tracing::info!(
                    user_id = %payload.user_id,
                    email = %payload.email,
                    verified_at = %payload.verified_at,
                    event_type = USER_EMAIL_VERIFIED,
                    "user email verified event processed"
                );
            }
            Err(err) => {
                tracing::error!(
                    user_id = %payload.user_id,
                    error = ?err,
                    "failed to process user email verified event"
                );
            }
        }

        result
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
