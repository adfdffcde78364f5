use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::user::{Email, User, UserDomainEvent, UserId, UserRepository, UserResult};
use crate::event_sourcing::{DomainEvent, EventStore, EventStoreError, StoredEvent};
use crate::infrastructure::read_model::{UserReadModel, UserReadModelStore};

// ============================================================================
// In-Memory Test Adapters
// ============================================================================
//
// Port implementations backed by mutex-guarded maps, honoring the same
// contracts as the Postgres adapters (rehydration through `reconstruct`,
// contiguous event versions, all-or-nothing appends). Compiled for tests
// only.
//
// ============================================================================

pub struct InMemoryUserRepository {
    users: Mutex<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn save(&self, user: &User) -> UserResult<()> {
        // Persist current state only: like a database row, the stored copy
        // carries no buffered events.
        let stored = User::reconstruct(
            user.id(),
            user.name().clone(),
            user.email().clone(),
            user.password_hash().to_string(),
            user.email_verified_at(),
            user.created_at(),
            user.updated_at(),
        );

        self.users
            .lock()
            .unwrap()
            .insert(user.id().as_uuid(), stored);
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> UserResult<Option<User>> {
        Ok(self.users.lock().unwrap().get(&id.as_uuid()).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> UserResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|user| user.email() == email)
            .cloned())
    }

    async fn exists_by_email(&self, email: &Email) -> UserResult<bool> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .any(|user| user.email() == email))
    }

    async fn delete(&self, id: &UserId) -> UserResult<()> {
        self.users.lock().unwrap().remove(&id.as_uuid());
        Ok(())
    }

    async fn find_all(&self, limit: i64, offset: i64) -> UserResult<Vec<User>> {
        let mut users: Vec<User> = self.users.lock().unwrap().values().cloned().collect();
        users.sort_by(|a, b| b.created_at().cmp(&a.created_at()));

        Ok(users
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn count(&self) -> UserResult<i64> {
        Ok(self.users.lock().unwrap().len() as i64)
    }
}

pub struct InMemoryEventStore {
    // Global insertion order, like the serial primary key
    events: Mutex<Vec<StoredEvent<UserDomainEvent>>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl EventStore<UserDomainEvent> for InMemoryEventStore {
    async fn append(
        &self,
        aggregate_id: Uuid,
        events: &[UserDomainEvent],
        expected_version: Option<i64>,
    ) -> Result<i64, EventStoreError> {
        if events.is_empty() {
            return Err(EventStoreError::EmptyAppend);
        }

        let mut log = self.events.lock().unwrap();
        let current = log
            .iter()
            .filter(|stored| stored.aggregate_id == aggregate_id)
            .map(|stored| stored.version)
            .max()
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
            log.push(StoredEvent {
                aggregate_id,
                event_type: event.event_type().to_string(),
                event_data: event.clone(),
                version,
                occurred_at: event.occurred_at(),
                recorded_at,
            });
        }

        Ok(version)
    }

    async fn get_events(
        &self,
        aggregate_id: Uuid,
        from_version: i64,
    ) -> Result<Vec<StoredEvent<UserDomainEvent>>, EventStoreError> {
        let mut events: Vec<StoredEvent<UserDomainEvent>> = self
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|stored| stored.aggregate_id == aggregate_id && stored.version > from_version)
            .cloned()
            .collect();
        events.sort_by_key(|stored| stored.version);

        Ok(events)
    }

    async fn get_all_events(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<StoredEvent<UserDomainEvent>>, EventStoreError> {
        Ok(self
            .events
            .lock()
            .unwrap()
            .iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }
}

pub struct InMemoryReadModelStore {
    rows: Mutex<HashMap<Uuid, UserReadModel>>,
}

impl InMemoryReadModelStore {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl UserReadModelStore for InMemoryReadModelStore {
    async fn upsert(&self, row: &UserReadModel) -> anyhow::Result<()> {
        self.rows.lock().unwrap().insert(row.id, row.clone());
        Ok(())
    }

    async fn mark_email_verified(
        &self,
        user_id: Uuid,
        verified_at: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        if let Some(row) = self.rows.lock().unwrap().get_mut(&user_id) {
            row.email_verified = true;
            row.updated_at = verified_at;
        }
        Ok(())
    }

    async fn find(&self, user_id: Uuid) -> anyhow::Result<Option<UserReadModel>> {
        Ok(self.rows.lock().unwrap().get(&user_id).cloned())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::UserName;

    #[tokio::test]
    async fn test_repository_round_trip_resets_event_buffer() {
        let repository = InMemoryUserRepository::new();
        let user = User::register(
            UserId::generate(),
            UserName::new("Jane Doe").unwrap(),
            Email::new("jane@example.com").unwrap(),
            "hash".to_string(),
        );
        assert_eq!(user.domain_events().len(), 1);

        repository.save(&user).await.unwrap();
        let loaded = repository.find_by_id(&user.id()).await.unwrap().unwrap();

        assert_eq!(loaded.email(), user.email());
        assert_eq!(loaded.created_at(), user.created_at());
        assert!(loaded.domain_events().is_empty());
    }

    #[tokio::test]
    async fn test_repository_find_all_is_newest_first() {
        let repository = InMemoryUserRepository::new();
        for i in 0..3 {
            let user = User::register(
                UserId::generate(),
                UserName::new("Jane Doe").unwrap(),
                Email::new(format!("jane{i}@example.com")).unwrap(),
                "hash".to_string(),
            );
            repository.save(&user).await.unwrap();
        }

        let all = repository.find_all(10, 0).await.unwrap();
        assert_eq!(all.len(), 3);
        assert!(all
            .windows(2)
            .all(|pair| pair[0].created_at() >= pair[1].created_at()));
        assert_eq!(repository.count().await.unwrap(), 3);
    }
}
