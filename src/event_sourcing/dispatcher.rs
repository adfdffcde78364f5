use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use super::event::DomainEvent;

// ============================================================================
// Event Dispatcher - Synchronous In-Process Publication
// ============================================================================
//
// Routes each dispatched event to the single listener registered for its
// event type. Dispatch is synchronous: listeners run inline, within the
// request, before the response is produced. A listener failure propagates to
// the caller; there is no retry here.
//
// ============================================================================

#[async_trait]
pub trait EventListener<E: DomainEvent>: Send + Sync {
    /// Event type this listener handles, e.g. "user.registered"
    fn event_type(&self) -> &'static str;

    async fn handle(&self, event: &E) -> anyhow::Result<()>;
}

pub struct EventDispatcher<E: DomainEvent> {
    listeners: HashMap<&'static str, Arc<dyn EventListener<E>>>,
}

impl<E: DomainEvent> EventDispatcher<E> {
    pub fn new() -> Self {
        Self {
            listeners: HashMap::new(),
        }
    }

    /// Register the listener for its event type. Each event type has exactly
    /// one listener; re-registering replaces the previous one.
    pub fn register(&mut self, listener: Arc<dyn EventListener<E>>) {
        let event_type = listener.event_type();
        if self.listeners.insert(event_type, listener).is_some() {
            tracing::warn!(event_type, "replaced previously registered event listener");
        }
    }

    pub async fn dispatch(&self, event: &E) -> anyhow::Result<()> {
        match self.listeners.get(event.event_type()) {
            Some(listener) => listener.handle(event).await,
            None => {
                tracing::debug!(
                    event_type = event.event_type(),
                    "no listener registered for event"
                );
                Ok(())
            }
        }
    }

    /// Dispatch a drained event buffer in order, stopping at the first failure.
    pub async fn dispatch_events(&self, events: &[E]) -> anyhow::Result<()> {
        for event in events {
            self.dispatch(event).await?;
        }
        Ok(())
    }
}

impl<E: DomainEvent> Default for EventDispatcher<E> {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
