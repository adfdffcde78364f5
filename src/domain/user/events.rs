use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::value_objects::{Email, UserId, UserName};
use crate::event_sourcing::DomainEvent;

// ============================================================================
// User Domain Events
// ============================================================================
//
// Immutable facts about the aggregate, carrying everything a projection
// needs. The serialized form is an `{eventType, occurredAt, ...}` JSON object
// used both as the persisted event-store payload and the dispatched message.
//
// ============================================================================

pub const USER_REGISTERED: &str = "user.registered";
pub const USER_EMAIL_VERIFIED: &str = "user.email_verified";

/// Union type for all user events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "eventType")]
pub enum UserDomainEvent {
    #[serde(rename = "user.registered")]
    Registered(UserRegistered),
    #[serde(rename = "user.email_verified")]
    EmailVerified(UserEmailVerified),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRegistered {
    pub user_id: UserId,
    pub email: Email,
    pub name: UserName,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserEmailVerified {
    pub user_id: UserId,
    pub email: Email,
    pub verified_at: DateTime<Utc>,
    pub occurred_at: DateTime<Utc>,
}

impl DomainEvent for UserDomainEvent {
    fn event_type(&self) -> &'static str {
        match self {
            Self::Registered(_) => USER_REGISTERED,
            Self::EmailVerified(_) => USER_EMAIL_VERIFIED,
        }
    }

    fn aggregate_id(&self) -> Uuid {
        match self {
            Self::Registered(e) => e.user_id.as_uuid(),
            Self::EmailVerified(e) => e.user_id.as_uuid(),
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            Self::Registered(e) => e.occurred_at,
            Self::EmailVerified(e) => e.occurred_at,
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
