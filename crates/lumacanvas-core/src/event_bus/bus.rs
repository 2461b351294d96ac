//! Notification bus implementation.
//!
//! There is no global instance: a bus is created per editor session and
//! handed to whoever needs it.

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

use super::events::{CanvasEvent, EventCategory};

/// Capacity of the broadcast channel behind [`EventBus::receiver`].
const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", self.0)
    }
}

/// Which events a subscriber wants.
#[derive(Debug, Clone, Default)]
pub enum EventFilter {
    #[default]
    All,
    /// Events in any of these categories.
    Categories(Vec<EventCategory>),
}

impl EventFilter {
    pub fn matches(&self, event: &CanvasEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Categories(categories) => categories.contains(&event.category()),
        }
    }
}

type EventHandler = Box<dyn Fn(CanvasEvent) + Send + Sync>;

#[derive(Debug, Clone, thiserror::Error)]
pub enum EventBusError {
    /// Neither a handler nor a receiver is attached.
    #[error("No subscribers for event")]
    NoSubscribers,
}

/// Outbound notification bus for one editor session
pub struct EventBus {
    sender: broadcast::Sender<CanvasEvent>,
    /// Handlers run in subscription order.
    handlers: Arc<RwLock<BTreeMap<SubscriptionId, (EventFilter, EventHandler)>>>,
    next_id: AtomicU64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a bus whose async receivers lag after `capacity` unread events.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            handlers: Arc::new(RwLock::new(BTreeMap::new())),
            next_id: AtomicU64::new(1),
        }
    }

    /// Publish an event to all subscribers
    ///
    /// Returns the number of async receivers that will receive the event,
    /// or an error if nobody at all is listening.
    pub fn publish(&self, event: CanvasEvent) -> Result<usize, EventBusError> {
        tracing::debug!("Event: {}", event.description());

        let handlers = self.handlers.read();
        for (filter, handler) in handlers.values() {
            if filter.matches(&event) {
                handler(event.clone());
            }
        }

        match self.sender.send(event) {
            Ok(count) => Ok(count),
            Err(_) if handlers.is_empty() => Err(EventBusError::NoSubscribers),
            Err(_) => Ok(0),
        }
    }

    /// Publish and ignore the "nobody listening" case.
    pub fn emit(&self, event: CanvasEvent) {
        let _ = self.publish(event);
    }

    /// Register a synchronous handler.
    ///
    /// The handler runs on the publishing task and must return quickly.
    /// It must not subscribe or unsubscribe from inside the callback.
    pub fn subscribe<F>(&self, filter: EventFilter, handler: F) -> SubscriptionId
    where
        F: Fn(CanvasEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers.write().insert(id, (filter, Box::new(handler)));
        tracing::debug!("Subscription {} added", id);
        id
    }

    /// Get a receiver for consuming events in an async task
    pub fn receiver(&self) -> broadcast::Receiver<CanvasEvent> {
        self.sender.subscribe()
    }

    /// Returns true if the subscription was found and removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = self.handlers.write().remove(&id).is_some();
        if removed {
            tracing::debug!("Subscription {} removed", id);
        }
        removed
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.read().len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .field("receivers", &self.sender.receiver_count())
            .finish()
    }
}
