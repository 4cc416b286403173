use async_trait::async_trait;
use conduit_kernel::message::{Envelope, PropertyScope};
use conduit_kernel::stage::{Outcome, Stage, StageError, StageResult};
use parking_lot::RwLock;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// What a [`MockStage`] does with the envelope it receives.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Continue with the envelope unchanged.
    Echo,
    /// Continue with the payload replaced.
    Payload(Value),
    Swallow,
    /// Fail with an unstructured processing error.
    Fail(String),
}

/// A mock stage with a stubbed reply and a call history.
///
/// Clones share the stubbed reply and the history, so a clone can be handed
/// to a router while the original is kept for assertions.
#[derive(Clone)]
pub struct MockStage {
    label: String,
    reply: Arc<RwLock<Reply>>,
    delay: Option<Duration>,
    mark: bool,
    history: Arc<RwLock<Vec<Envelope>>>,
}

impl MockStage {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            reply: Arc::new(RwLock::new(Reply::Echo)),
            delay: None,
            mark: false,
            history: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn replying(label: &str, payload: impl Into<Value>) -> Self {
        Self::new(label).with_reply(Reply::Payload(payload.into()))
    }

    pub fn failing(label: &str, message: &str) -> Self {
        Self::new(label).with_reply(Reply::Fail(message.to_string()))
    }

    pub fn swallowing(label: &str) -> Self {
        Self::new(label).with_reply(Reply::Swallow)
    }

    pub fn with_reply(self, reply: Reply) -> Self {
        *self.reply.write() = reply;
        self
    }

    /// Sleep before replying.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Record `mark.<label> = true` in INVOCATION scope before replying.
    pub fn marking(mut self) -> Self {
        self.mark = true;
        self
    }

    pub fn set_reply(&self, reply: Reply) {
        *self.reply.write() = reply;
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Envelopes received, in call order.
    pub fn history(&self) -> Vec<Envelope> {
        self.history.read().clone()
    }

    pub fn call_count(&self) -> usize {
        self.history.read().len()
    }

    /// Property name used by [`marking`](Self::marking).
    pub fn mark_key(&self) -> String {
        format!("mark.{}", self.label)
    }

    pub fn into_stage(self) -> Arc<dyn Stage> {
        Arc::new(self)
    }
}

#[async_trait]
impl Stage for MockStage {
    fn name(&self) -> &str {
        &self.label
    }

    async fn process(&self, mut envelope: Envelope) -> StageResult {
        self.history.write().push(envelope.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.mark {
            envelope.set_property(self.mark_key(), true, PropertyScope::Invocation);
        }

        let reply = self.reply.read().clone();
        match reply {
            Reply::Echo => Ok(Outcome::Continue(envelope)),
            Reply::Payload(payload) => {
                envelope.payload = payload;
                Ok(Outcome::Continue(envelope))
            }
            Reply::Swallow => Ok(Outcome::Swallow),
            Reply::Fail(message) => Err(StageError::processing(message)),
        }
    }
}
