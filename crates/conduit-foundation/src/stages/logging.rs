use async_trait::async_trait;
use conduit_kernel::endpoint::EndpointKind;
use conduit_kernel::message::Envelope;
use conduit_kernel::stage::{Interceptor, Outcome, Stage, StageResult};
use std::time::Instant;
use tracing::{debug, warn};

/// Observer that logs every envelope passing an endpoint and how the rest of
/// the chain handled it. Never alters the envelope or the outcome.
#[derive(Debug, Clone)]
pub struct LoggingInterceptor {
    endpoint: String,
    kind: EndpointKind,
}

impl LoggingInterceptor {
    pub fn new(endpoint: impl Into<String>, kind: EndpointKind) -> Self {
        Self {
            endpoint: endpoint.into(),
            kind,
        }
    }
}

#[async_trait]
impl Interceptor for LoggingInterceptor {
    fn name(&self) -> &str {
        "message-log"
    }

    async fn intercept(&self, envelope: Envelope, next: &dyn Stage) -> StageResult {
        let message_id = envelope.message_id.clone();
        let correlation_id = envelope.correlation_id.clone();
        debug!(
            endpoint       = %self.endpoint,
            direction      = ?self.kind,
            message_id     = %message_id,
            correlation_id = %correlation_id,
            "→ message"
        );

        let started = Instant::now();
        let result = next.process(envelope).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(Outcome::Continue(out)) => debug!(
                endpoint       = %self.endpoint,
                message_id     = %message_id,
                correlation_id = %correlation_id,
                exception      = out.has_exception(),
                latency_ms     = elapsed_ms,
                "← message processed"
            ),
            Ok(Outcome::Swallow) => debug!(
                endpoint   = %self.endpoint,
                message_id = %message_id,
                latency_ms = elapsed_ms,
                "← message swallowed"
            ),
            Err(err) => warn!(
                endpoint   = %self.endpoint,
                message_id = %message_id,
                kind       = err.kind(),
                latency_ms = elapsed_ms,
                "← message failed: {err}"
            ),
        }
        result
    }
}
