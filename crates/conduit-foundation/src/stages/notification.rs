use async_trait::async_trait;
use conduit_kernel::endpoint::Connector;
use conduit_kernel::message::Envelope;
use conduit_kernel::notification::{Notification, NotificationKind};
use conduit_kernel::stage::{Interceptor, Stage, StageResult};
use std::sync::Arc;

/// Fires a notification through the endpoint's connector, then delegates.
pub struct NotificationInterceptor {
    endpoint: String,
    kind: NotificationKind,
    connector: Arc<dyn Connector>,
}

impl NotificationInterceptor {
    pub fn new(
        endpoint: impl Into<String>,
        kind: NotificationKind,
        connector: Arc<dyn Connector>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            kind,
            connector,
        }
    }
}

#[async_trait]
impl Interceptor for NotificationInterceptor {
    fn name(&self) -> &str {
        "notification"
    }

    async fn intercept(&self, envelope: Envelope, next: &dyn Stage) -> StageResult {
        self.connector.fire_notification(Notification::for_envelope(
            self.kind,
            self.endpoint.clone(),
            &envelope,
        ));
        next.process(envelope).await
    }
}
