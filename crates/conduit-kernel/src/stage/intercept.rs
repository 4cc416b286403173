//! Intercepting stages.
//!
//! An [`Interceptor`] sees every envelope before the stage behind it and
//! decides whether, and with what, to call it. Chains are built by
//! composition: each [`InterceptingStage`] owns its `next` handle.
//!
//! ```text
//! envelope ──► interceptor[0] ──► interceptor[1] ──► ... ──► terminal stage
//!                   │                   │
//!                   └─ may return early └─ may return early
//! ```

use super::{Stage, StageRef, StageResult};
use crate::message::Envelope;
use async_trait::async_trait;
use std::sync::Arc;

/// Kernel contract for a chain link.
#[async_trait]
pub trait Interceptor: Send + Sync {
    fn name(&self) -> &str;

    /// Handle `envelope`, calling `next` zero or one times.
    ///
    /// The default implementation always delegates and returns the result
    /// of `next` unchanged.
    async fn intercept(&self, envelope: Envelope, next: &dyn Stage) -> StageResult {
        next.process(envelope).await
    }
}

/// An interceptor bound to the stage it guards.
pub struct InterceptingStage {
    interceptor: Arc<dyn Interceptor>,
    next: StageRef,
}

impl InterceptingStage {
    pub fn new(interceptor: Arc<dyn Interceptor>, next: StageRef) -> Self {
        Self { interceptor, next }
    }

    pub fn next(&self) -> &StageRef {
        &self.next
    }
}

#[async_trait]
impl Stage for InterceptingStage {
    fn name(&self) -> &str {
        self.interceptor.name()
    }

    async fn process(&self, envelope: Envelope) -> StageResult {
        self.interceptor.intercept(envelope, self.next.as_ref()).await
    }
}

/// Builds a chain of interceptors in front of a terminal stage.
pub struct StageChain;

impl StageChain {
    pub fn builder() -> StageChainBuilder {
        StageChainBuilder::default()
    }
}

/// Ordered list of interceptors; the first one added runs first.
#[derive(Default)]
pub struct StageChainBuilder {
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl StageChainBuilder {
    pub fn interceptor(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    /// Append an interceptor only when `interceptor` is `Some`.
    pub fn maybe_interceptor(self, interceptor: Option<Arc<dyn Interceptor>>) -> Self {
        match interceptor {
            Some(i) => self.interceptor(i),
            None => self,
        }
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    /// Names of the interceptors in execution order.
    pub fn names(&self) -> Vec<String> {
        self.interceptors.iter().map(|i| i.name().to_string()).collect()
    }

    /// Terminate the chain with `terminal`. With no interceptors the
    /// terminal stage itself is returned.
    pub fn build(self, terminal: StageRef) -> StageRef {
        self.interceptors
            .into_iter()
            .rev()
            .fold(terminal, |next, interceptor| {
                Arc::new(InterceptingStage::new(interceptor, next)) as StageRef
            })
    }
}
