//! Fire-and-forget notification channel.
//!
//! Used after a run to announce completion to whoever is listening (UI
//! streams, audit hooks).  Correctness of the engine never depends on a
//! publish being observed.

use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::debug;

/// A published notification.
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    pub event: String,
    pub payload: Value,
}

/// Publish side of the notification channel.
pub trait Broadcast: Send + Sync {
    /// Publish an event; delivery is best-effort.
    fn publish(&self, event: &str, payload: Value);
}

/// `Broadcast` backed by a tokio broadcast channel.
#[derive(Debug, Clone)]
pub struct ChannelBroadcast {
    tx: broadcast::Sender<Event>,
}

impl ChannelBroadcast {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to future events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

impl Default for ChannelBroadcast {
    fn default() -> Self {
        Self::new(64)
    }
}

impl Broadcast for ChannelBroadcast {
    fn publish(&self, event: &str, payload: Value) {
        let message = Event {
            event: event.to_string(),
            payload,
        };
        // A send error only means nobody is subscribed right now.
        if self.tx.send(message).is_err() {
            debug!("no subscribers for event '{event}'");
        }
    }
}
