//! Fire-and-forget notification bus.
//!
//! Stages publish structured [`Notification`]s; nothing in the processing
//! path ever waits for, or inspects, delivery. Publishing with no subscriber
//! attached is not an error.

use crate::message::Envelope;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Default capacity of the broadcast buffer. Slow subscribers that fall
/// further behind than this observe `RecvError::Lagged`.
pub const DEFAULT_BUS_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum NotificationKind {
    MessageReceived,
    MessageDispatched,
    SecurityAuthenticationFailed,
}

/// A published event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    /// Name or URI of the endpoint the event relates to.
    pub endpoint: String,
    pub message_id: String,
    pub correlation_id: String,
    pub detail: Option<String>,
}

impl Notification {
    pub fn for_envelope(
        kind: NotificationKind,
        endpoint: impl Into<String>,
        envelope: &Envelope,
    ) -> Self {
        Self {
            kind,
            endpoint: endpoint.into(),
            message_id: envelope.message_id.clone(),
            correlation_id: envelope.correlation_id.clone(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Broadcast channel carrying [`Notification`]s.
#[derive(Debug, Clone)]
pub struct NotificationBus {
    sender: broadcast::Sender<Notification>,
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new(DEFAULT_BUS_CAPACITY)
    }
}

impl NotificationBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish without waiting. Returns the number of subscribers that will
    /// see the notification.
    pub fn publish(&self, notification: Notification) -> usize {
        match self.sender.send(notification) {
            Ok(receivers) => receivers,
            Err(_) => {
                tracing::trace!("notification published with no subscribers");
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
