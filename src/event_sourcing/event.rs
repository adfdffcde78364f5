use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

// ============================================================================
// Domain Event Trait
// ============================================================================
//
// Generic contract between domain events and the event infrastructure.
// No domain-specific code here; works with ANY event type.
//
// ============================================================================

/// Implemented by every domain event union type.
///
/// The serialized form doubles as the persisted event-store payload and the
/// dispatched message, so events must round-trip through JSON.
pub trait DomainEvent: Serialize + DeserializeOwned + Clone + Send + Sync {
    /// Stable type tag, e.g. "user.registered"
    fn event_type(&self) -> &'static str;

    /// Id of the aggregate this event belongs to
    fn aggregate_id(&self) -> Uuid;

    /// When the fact happened (not when it was recorded)
    fn occurred_at(&self) -> DateTime<Utc>;
}

// ============================================================================
// Event Serialization Helpers
// ============================================================================

pub fn serialize_event<E: Serialize>(event: &E) -> Result<serde_json::Value, serde_json::Error> {
    serde_json::to_value(event)
}

pub fn deserialize_event<E: DeserializeOwned>(
    value: serde_json::Value,
) -> Result<E, serde_json::Error> {
    serde_json::from_value(value)
}
