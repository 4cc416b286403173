//! Endpoint and connector contracts.
//!
//! Endpoints and connectors are owned by the transport layer. The core only
//! reads endpoint configuration and asks the connector to publish
//! notifications or handle exceptions; it never mutates either.

use crate::message::Envelope;
use crate::notification::Notification;
use crate::security::SecurityFilter;
use crate::stage::StageError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Direction of an endpoint relative to the flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointKind {
    Inbound,
    Outbound,
}

/// Transport connector an endpoint belongs to.
pub trait Connector: Send + Sync {
    /// Protocol name, e.g. `http`, `jms`, `vm`.
    fn protocol(&self) -> &str;

    /// Publish a notification. Must not block.
    fn fire_notification(&self, notification: Notification);

    /// Report an exception that was handled inside the chain.
    fn handle_exception(&self, error: &StageError, envelope: &Envelope);
}

/// Hook consulted by inbound endpoints before a message enters the flow.
/// Returning `false` drops the message silently.
pub trait EndpointDecorator: Send + Sync {
    fn on_message(&self, envelope: &Envelope) -> bool;
}

impl<F> EndpointDecorator for F
where
    F: Fn(&Envelope) -> bool + Send + Sync,
{
    fn on_message(&self, envelope: &Envelope) -> bool {
        self(envelope)
    }
}

/// Read-only view of an endpoint's configuration.
pub trait Endpoint: Send + Sync {
    /// Logical name, if one was configured.
    fn name(&self) -> Option<&str>;

    fn uri(&self) -> &str;

    /// Content type every message through this endpoint must carry.
    fn mime_type(&self) -> Option<&str> {
        None
    }

    fn security_filter(&self) -> Option<Arc<dyn SecurityFilter>> {
        None
    }

    fn decorator(&self) -> Option<Arc<dyn EndpointDecorator>> {
        None
    }

    fn connector(&self) -> Arc<dyn Connector>;

    /// Name if present, otherwise the URI.
    fn display_name(&self) -> &str {
        self.name().unwrap_or_else(|| self.uri())
    }
}
