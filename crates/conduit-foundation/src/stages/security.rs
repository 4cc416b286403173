//! Authentication in front of the guarded stage.
//!
//! A rejected envelope is not an error for the caller: the interceptor turns
//! it into an error-carrying envelope and returns it without calling `next`.

use async_trait::async_trait;
use conduit_kernel::endpoint::Connector;
use conduit_kernel::message::Envelope;
use conduit_kernel::notification::{Notification, NotificationKind};
use conduit_kernel::security::SecurityFilter;
use conduit_kernel::stage::{Interceptor, Outcome, Stage, StageError, StageResult};
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

pub struct SecurityFilterInterceptor {
    endpoint: String,
    filter: Arc<dyn SecurityFilter>,
    connector: Arc<dyn Connector>,
}

impl SecurityFilterInterceptor {
    pub fn new(
        endpoint: impl Into<String>,
        filter: Arc<dyn SecurityFilter>,
        connector: Arc<dyn Connector>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            filter,
            connector,
        }
    }
}

#[async_trait]
impl Interceptor for SecurityFilterInterceptor {
    fn name(&self) -> &str {
        "security-filter"
    }

    async fn intercept(&self, mut envelope: Envelope, next: &dyn Stage) -> StageResult {
        let err = match self.filter.authenticate(&mut envelope).await {
            Ok(()) => return next.process(envelope).await,
            Err(err) => err,
        };

        warn!(
            endpoint   = %self.endpoint,
            filter     = self.filter.name(),
            message_id = %envelope.message_id,
            kind       = err.kind(),
            "authentication failed"
        );

        self.connector.fire_notification(
            Notification::for_envelope(
                NotificationKind::SecurityAuthenticationFailed,
                self.endpoint.clone(),
                &envelope,
            )
            .with_detail(err.to_string()),
        );

        let error = StageError::Security(err);
        self.connector.handle_exception(&error, &envelope);

        envelope.payload = Value::String(error.to_string());
        envelope.set_exception(error);
        Ok(Outcome::Continue(envelope))
    }
}
