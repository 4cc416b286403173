use async_trait::async_trait;
use conduit_kernel::endpoint::Connector;
use conduit_kernel::error_code::ErrorCodeMapping;
use conduit_kernel::message::{Envelope, PropertyScope};
use conduit_kernel::stage::{Interceptor, Stage, StageResult};
use std::sync::Arc;
use tracing::debug;

/// Stamps a protocol error code for the envelope's exception payload into
/// OUTBOUND scope. Always delegates.
pub struct ExceptionDetailsInterceptor {
    mapping: Arc<dyn ErrorCodeMapping>,
    connector: Arc<dyn Connector>,
}

impl ExceptionDetailsInterceptor {
    pub fn new(mapping: Arc<dyn ErrorCodeMapping>, connector: Arc<dyn Connector>) -> Self {
        Self { mapping, connector }
    }

    fn stamp(&self, envelope: &mut Envelope) {
        let protocol = self.connector.protocol();
        let Some(kind) = envelope.exception_payload.as_ref().map(|p| p.kind.clone()) else {
            return;
        };
        let Some(code) = self.mapping.error_code(protocol, &kind) else {
            return;
        };

        let property = self.mapping.property_name(protocol);
        debug!(protocol, kind = %kind, code = %code, property = %property, "stamping error code");
        envelope.set_property(property, code.clone(), PropertyScope::Outbound);
        if let Some(payload) = envelope.exception_payload.as_mut() {
            payload.code = Some(code);
        }
    }
}

#[async_trait]
impl Interceptor for ExceptionDetailsInterceptor {
    fn name(&self) -> &str {
        "exception-details"
    }

    async fn intercept(&self, mut envelope: Envelope, next: &dyn Stage) -> StageResult {
        self.stamp(&mut envelope);
        next.process(envelope).await
    }
}
