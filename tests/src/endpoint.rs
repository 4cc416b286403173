use async_trait::async_trait;
use conduit_foundation::endpoint::{SimpleEndpoint, SimpleEndpointBuilder};
use conduit_kernel::endpoint::Connector;
use conduit_kernel::message::Envelope;
use conduit_kernel::notification::{Notification, NotificationKind};
use conduit_kernel::security::{SecurityError, SecurityFilter};
use conduit_kernel::stage::StageError;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Connector that records everything the core hands it.
#[derive(Default)]
pub struct RecordingConnector {
    protocol: String,
    notifications: Mutex<Vec<Notification>>,
    /// (error kind, message id)
    exceptions: Mutex<Vec<(String, String)>>,
}

impl RecordingConnector {
    pub fn new(protocol: &str) -> Arc<Self> {
        Arc::new(Self {
            protocol: protocol.to_string(),
            ..Self::default()
        })
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().clone()
    }

    pub fn notification_kinds(&self) -> Vec<NotificationKind> {
        self.notifications.lock().iter().map(|n| n.kind).collect()
    }

    pub fn exceptions(&self) -> Vec<(String, String)> {
        self.exceptions.lock().clone()
    }
}

impl Connector for RecordingConnector {
    fn protocol(&self) -> &str {
        &self.protocol
    }

    fn fire_notification(&self, notification: Notification) {
        self.notifications.lock().push(notification);
    }

    fn handle_exception(&self, error: &StageError, envelope: &Envelope) {
        self.exceptions
            .lock()
            .push((error.kind().to_string(), envelope.message_id.clone()));
    }
}

/// Endpoint builder wired to a [`RecordingConnector`].
pub fn test_endpoint(uri: &str, connector: &Arc<RecordingConnector>) -> SimpleEndpointBuilder {
    SimpleEndpoint::builder(uri, connector.clone())
}

/// Security filter with a fixed verdict that counts its invocations.
pub struct StaticSecurityFilter {
    verdict: Option<SecurityError>,
    calls: AtomicUsize,
}

impl StaticSecurityFilter {
    pub fn accept() -> Arc<Self> {
        Arc::new(Self {
            verdict: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn reject(error: SecurityError) -> Arc<Self> {
        Arc::new(Self {
            verdict: Some(error),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SecurityFilter for StaticSecurityFilter {
    fn name(&self) -> &str {
        "static"
    }

    async fn authenticate(&self, _envelope: &mut Envelope) -> Result<(), SecurityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.verdict {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}
