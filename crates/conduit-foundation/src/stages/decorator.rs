use async_trait::async_trait;
use conduit_kernel::endpoint::EndpointDecorator;
use conduit_kernel::message::Envelope;
use conduit_kernel::stage::{Interceptor, Outcome, Stage, StageResult};
use std::sync::Arc;
use tracing::debug;

/// Consults the endpoint decorator; a `false` answer swallows the envelope.
pub struct DecoratorInterceptor {
    decorator: Arc<dyn EndpointDecorator>,
}

impl DecoratorInterceptor {
    pub fn new(decorator: Arc<dyn EndpointDecorator>) -> Self {
        Self { decorator }
    }
}

#[async_trait]
impl Interceptor for DecoratorInterceptor {
    fn name(&self) -> &str {
        "endpoint-decorator"
    }

    async fn intercept(&self, envelope: Envelope, next: &dyn Stage) -> StageResult {
        if !self.decorator.on_message(&envelope) {
            debug!(message_id = %envelope.message_id, "decorator rejected message");
            return Ok(Outcome::Swallow);
        }
        next.process(envelope).await
    }
}
