use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::event::DomainEvent;

// ============================================================================
// Event Store Port - Append-Only Event Log
// ============================================================================
//
// Generic contract for the append-only event log. Versions are assigned by
// the store: contiguous positive integers per aggregate, starting at 1.
// Optimistic concurrency: callers may pass the version they believe is
// current; a mismatch fails the whole batch and leaves the store unchanged.
//
// ============================================================================

/// One persisted event, as read back from the log.
#[derive(Debug, Clone, Serialize)]
pub struct StoredEvent<E> {
    pub aggregate_id: Uuid,
    pub event_type: String,
    pub event_data: E,
    pub version: i64,
    pub occurred_at: DateTime<Utc>,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum EventStoreError {
    #[error("concurrency conflict on aggregate {aggregate_id}: expected version {expected}, current is {current}")]
    ConcurrencyConflict {
        aggregate_id: Uuid,
        expected: i64,
        current: i64,
    },

    #[error("cannot append an empty event batch")]
    EmptyAppend,

    #[error("event payload serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait EventStore<E: DomainEvent>: Send + Sync {
    /// Append a batch of events for one aggregate, atomically.
    ///
    /// Returns the aggregate's version after the append. When
    /// `expected_version` is supplied and disagrees with the current version
    /// the append fails with `ConcurrencyConflict` and nothing is written.
    async fn append(
        &self,
        aggregate_id: Uuid,
        events: &[E],
        expected_version: Option<i64>,
    ) -> Result<i64, EventStoreError>;

    /// Events with version > `from_version`, ordered by version ascending.
    async fn get_events(
        &self,
        aggregate_id: Uuid,
        from_version: i64,
    ) -> Result<Vec<StoredEvent<E>>, EventStoreError>;

    /// Global listing in insertion order, for diagnostics and audit.
    async fn get_all_events(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<StoredEvent<E>>, EventStoreError>;
}

// ============================================================================
// Contract Tests
// ============================================================================
//
// The append/read contract is exercised here against the in-memory store;
// the Postgres implementation is covered by the same semantics plus the
// integration-only concerns noted in infrastructure/postgres/event_store.rs.
//
// ============================================================================
