use std::marker::PhantomData;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::violates_constraint;
use crate::event_sourcing::{
    deserialize_event, serialize_event, DomainEvent, EventStore, EventStoreError, StoredEvent,
};

// ============================================================================
// Postgres Event Store - Append-Only Log with Optimistic Concurrency
// ============================================================================
//
// The version check and the inserts run in one transaction. Locking the
// aggregate's newest event row serializes concurrent appends for the same
// aggregate; a fresh aggregate has no row to lock, so the unique
// (aggregate_id, version) constraint is the backstop that turns a lost race
// into a detectable conflict instead of silent corruption.
//
// ============================================================================

const VERSION_CONSTRAINT: &str = "event_store_aggregate_id_version_key";

pub struct PostgresEventStore<E: DomainEvent> {
    pool: PgPool,
    _phantom: PhantomData<E>,
}

impl<E: DomainEvent> PostgresEventStore<E> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _phantom: PhantomData,
        }
    }

    fn row_to_stored_event(row: sqlx::postgres::PgRow) -> Result<StoredEvent<E>, EventStoreError> {
        let payload: serde_json::Value = row.try_get("event_data")?;

        Ok(StoredEvent {
            aggregate_id: row.try_get("aggregate_id")?,
            event_type: row.try_get("event_type")?,
            event_data: deserialize_event(payload)?,
            version: row.try_get("version")?,
            occurred_at: row.try_get("occurred_at")?,
            recorded_at: row.try_get("recorded_at")?,
        })
    }
}

#[async_trait]
impl<E: DomainEvent + 'static> EventStore<E> for PostgresEventStore<E> {
    async fn append(
        &self,
        aggregate_id: Uuid,
        events: &[E],
        expected_version: Option<i64>,
    ) -> Result<i64, EventStoreError> {
        if events.is_empty() {
            return Err(EventStoreError::EmptyAppend);
        }

        let mut tx = self.pool.begin().await?;

        // Lock the newest event row so concurrent appends for this aggregate
        // serialize on it.
        let current: i64 = sqlx::query_scalar(
            "SELECT version FROM event_store \
             WHERE aggregate_id = $1 \
             ORDER BY version DESC LIMIT 1 \
             FOR UPDATE",
        )
        .bind(aggregate_id)
        .fetch_optional(&mut *tx)
        .await?
        .unwrap_or(0);

        if let Some(expected) = expected_version {
            if expected != current {
                return Err(EventStoreError::ConcurrencyConflict {
                    aggregate_id,
                    expected,
                    current,
                });
            }
        }

        let recorded_at = Utc::now();
        let mut version = current;

        for event in events {
            version += 1;
            let payload = serialize_event(event)?;

            let inserted = sqlx::query(
                "INSERT INTO event_store \
                 (aggregate_id, event_type, event_data, version, occurred_at, recorded_at) \
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(aggregate_id)
            .bind(event.event_type())
            .bind(payload)
            .bind(version)
            .bind(event.occurred_at())
            .bind(recorded_at)
            .execute(&mut *tx)
            .await;

            if let Err(err) = inserted {
                if violates_constraint(&err, VERSION_CONSTRAINT) {
                    // Another writer claimed this version between our read
                    // and the insert.
                    return Err(EventStoreError::ConcurrencyConflict {
                        aggregate_id,
                        expected: current,
                        current: version,
                    });
                }
                return Err(err.into());
            }
        }

        tx.commit().await?;

        tracing::info!(
            aggregate_id = %aggregate_id,
            new_version = version,
            event_count = events.len(),
            "appended events to event store"
        );

        Ok(version)
    }

    async fn get_events(
        &self,
        aggregate_id: Uuid,
        from_version: i64,
    ) -> Result<Vec<StoredEvent<E>>, EventStoreError> {
        let rows = sqlx::query(
            "SELECT aggregate_id, event_type, event_data, version, occurred_at, recorded_at \
             FROM event_store \
             WHERE aggregate_id = $1 AND version > $2 \
             ORDER BY version ASC",
        )
        .bind(aggregate_id)
        .bind(from_version)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_stored_event).collect()
    }

    async fn get_all_events(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<StoredEvent<E>>, EventStoreError> {
        let rows = sqlx::query(
            "SELECT aggregate_id, event_type, event_data, version, occurred_at, recorded_at \
             FROM event_store \
             ORDER BY id ASC \
             LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_stored_event).collect()
    }
}

// ============================================================================
// Integration Test Notes
// ============================================================================
//
// The behavior here is database-bound and needs a running Postgres:
// - concurrent appends to the same aggregate (row lock + unique backstop)
// - all-or-nothing rollback when a batch partially fails
// - insertion-order paging of get_all_events across aggregates
//
// The append/read contract itself is covered by the in-memory contract tests
// in event_sourcing/store.rs.
//
// ============================================================================
