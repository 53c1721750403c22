// Event Bus - Pub/Sub for Engine Events
//
// Provides in-memory event streaming using tokio broadcast channels.
// Enables the serve loop and observers to follow engine activity without
// polling the registry.
//
// In-memory only: events are lost on restart.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::domain::events::EngineEvent;
use crate::domain::execution::Exid;

/// Event bus for publishing and subscribing to engine events.
#[derive(Clone)]
pub struct EventBus {
    sender: Arc<broadcast::Sender<EngineEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given channel capacity. Capacity
    /// bounds how many events can be buffered before old ones are dropped.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Create an event bus with default capacity (1000).
    pub fn with_default_capacity() -> Self {
        Self::new(1000)
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: EngineEvent) {
        debug!(?event, "publishing event");

        // send() returns the number of receivers; zero subscribers is fine
        let _ = self.sender.send(event);
    }

    /// Subscribe to all engine events.
    pub fn subscribe(&self) -> EventReceiver {
        EventReceiver {
            receiver: self.sender.subscribe(),
        }
    }

    /// Subscribe to events of a single execution.
    pub fn subscribe_execution(&self, exid: Exid) -> ExecutionEventReceiver {
        ExecutionEventReceiver {
            receiver: self.sender.subscribe(),
            exid,
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

/// Receiver for all engine events.
pub struct EventReceiver {
    receiver: broadcast::Receiver<EngineEvent>,
}

impl EventReceiver {
    /// Receive the next event, waiting until one is available.
    pub async fn recv(&mut self) -> Result<EngineEvent, EventBusError> {
        self.receiver.recv().await.map_err(|e| match e {
            broadcast::error::RecvError::Closed => EventBusError::Closed,
            broadcast::error::RecvError::Lagged(n) => {
                warn!("event receiver lagged by {} events", n);
                EventBusError::Lagged(n)
            }
        })
    }
}

/// Receiver filtered to one execution's events.
pub struct ExecutionEventReceiver {
    receiver: broadcast::Receiver<EngineEvent>,
    exid: Exid,
}

impl ExecutionEventReceiver {
    /// Receive the next event for the subscribed execution, skipping events
    /// of other executions.
    pub async fn recv(&mut self) -> Result<EngineEvent, EventBusError> {
        loop {
            let event = self.receiver.recv().await.map_err(|e| match e {
                broadcast::error::RecvError::Closed => EventBusError::Closed,
                broadcast::error::RecvError::Lagged(n) => {
                    warn!("event receiver lagged by {} events", n);
                    EventBusError::Lagged(n)
                }
            })?;

            if event.exid() == &self.exid {
                return Ok(event);
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EventBusError {
    #[error("event bus is closed")]
    Closed,

    #[error("receiver lagged by {0} events (events were dropped)")]
    Lagged(u64),
}
