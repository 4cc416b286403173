//! In-process endpoint and connector implementations.
//!
//! Transports normally provide their own [`Endpoint`] and [`Connector`];
//! these are used by embedded flows and by tests.

use conduit_kernel::endpoint::{Connector, Endpoint, EndpointDecorator};
use conduit_kernel::message::Envelope;
use conduit_kernel::notification::{Notification, NotificationBus};
use conduit_kernel::security::SecurityFilter;
use conduit_kernel::stage::StageError;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// Connector that publishes notifications on a [`NotificationBus`] and
/// logs handled exceptions.
#[derive(Debug, Clone)]
pub struct BusConnector {
    protocol: String,
    bus: NotificationBus,
}

impl BusConnector {
    pub fn new(protocol: impl Into<String>, bus: NotificationBus) -> Self {
        Self {
            protocol: protocol.into(),
            bus,
        }
    }

    pub fn bus(&self) -> &NotificationBus {
        &self.bus
    }
}

impl Connector for BusConnector {
    fn protocol(&self) -> &str {
        &self.protocol
    }

    fn fire_notification(&self, notification: Notification) {
        self.bus.publish(notification);
    }

    fn handle_exception(&self, error: &StageError, envelope: &Envelope) {
        warn!(
            protocol       = %self.protocol,
            message_id     = %envelope.message_id,
            correlation_id = %envelope.correlation_id,
            kind           = error.kind(),
            "handled exception: {error}"
        );
    }
}

/// Endpoint whose configuration is fixed at construction.
#[derive(Clone)]
pub struct SimpleEndpoint {
    name: Option<String>,
    uri: String,
    mime_type: Option<String>,
    security_filter: Option<Arc<dyn SecurityFilter>>,
    decorator: Option<Arc<dyn EndpointDecorator>>,
    connector: Arc<dyn Connector>,
}

impl SimpleEndpoint {
    pub fn builder(uri: impl Into<String>, connector: Arc<dyn Connector>) -> SimpleEndpointBuilder {
        SimpleEndpointBuilder {
            endpoint: SimpleEndpoint {
                name: None,
                uri: uri.into(),
                mime_type: None,
                security_filter: None,
                decorator: None,
                connector,
            },
        }
    }
}

impl Endpoint for SimpleEndpoint {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn uri(&self) -> &str {
        &self.uri
    }

    fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    fn security_filter(&self) -> Option<Arc<dyn SecurityFilter>> {
        self.security_filter.clone()
    }

    fn decorator(&self) -> Option<Arc<dyn EndpointDecorator>> {
        self.decorator.clone()
    }

    fn connector(&self) -> Arc<dyn Connector> {
        self.connector.clone()
    }
}

impl fmt::Debug for SimpleEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleEndpoint")
            .field("name", &self.name)
            .field("uri", &self.uri)
            .field("mime_type", &self.mime_type)
            .field("protocol", &self.connector.protocol())
            .field("secured", &self.security_filter.is_some())
            .field("decorated", &self.decorator.is_some())
            .finish()
    }
}

pub struct SimpleEndpointBuilder {
    endpoint: SimpleEndpoint,
}

impl SimpleEndpointBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.endpoint.name = Some(name.into());
        self
    }

    pub fn mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.endpoint.mime_type = Some(mime_type.into());
        self
    }

    pub fn security_filter(mut self, filter: Arc<dyn SecurityFilter>) -> Self {
        self.endpoint.security_filter = Some(filter);
        self
    }

    pub fn decorator(mut self, decorator: Arc<dyn EndpointDecorator>) -> Self {
        self.endpoint.decorator = Some(decorator);
        self
    }

    pub fn build(self) -> SimpleEndpoint {
        self.endpoint
    }
}
