//! Processing stage contract.
//!
//! A [`Stage`] takes an [`Envelope`] and either continues with a (possibly
//! new) envelope, swallows it, or fails:
//!
//! ```text
//! Ok(Outcome::Continue(envelope))  -- hand the envelope on
//! Ok(Outcome::Swallow)             -- stop here, nothing to report
//! Err(StageError)                  -- stop here, something broke
//! ```
//!
//! Control-flow short-circuits (`Swallow`) and failures (`Err`) are kept
//! apart so that callers never have to inspect an error to find out whether
//! the chain was merely stopped.

mod error;
mod intercept;

pub use error::{StageError, UNSTRUCTURED_CAUSE_PREFIX};
pub use intercept::{InterceptingStage, Interceptor, StageChain, StageChainBuilder};

use crate::message::Envelope;
use async_trait::async_trait;
use std::sync::Arc;

/// Result of a single stage invocation.
#[derive(Debug, Clone)]
#[must_use]
pub enum Outcome {
    /// Processing continues with this envelope.
    Continue(Envelope),
    /// The envelope was consumed; nothing is passed further.
    Swallow,
}

impl Outcome {
    pub fn into_envelope(self) -> Option<Envelope> {
        match self {
            Outcome::Continue(envelope) => Some(envelope),
            Outcome::Swallow => None,
        }
    }

    pub fn envelope(&self) -> Option<&Envelope> {
        match self {
            Outcome::Continue(envelope) => Some(envelope),
            Outcome::Swallow => None,
        }
    }

    pub fn is_swallowed(&self) -> bool {
        matches!(self, Outcome::Swallow)
    }
}

pub type StageResult = Result<Outcome, StageError>;

/// Shared handle to a stage.
pub type StageRef = Arc<dyn Stage>;

/// The unit of work in a processing chain.
///
/// Implementations must be `Send + Sync`: routers invoke the same stage from
/// several worker tasks at once.
#[async_trait]
pub trait Stage: Send + Sync {
    /// Human-readable identifier used in logs.
    fn name(&self) -> &str {
        "stage"
    }

    async fn process(&self, envelope: Envelope) -> StageResult;
}

/// Terminal stage that returns its input unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassThrough;

#[async_trait]
impl Stage for PassThrough {
    fn name(&self) -> &str {
        "pass-through"
    }

    async fn process(&self, envelope: Envelope) -> StageResult {
        Ok(Outcome::Continue(envelope))
    }
}

/// Stage backed by a synchronous closure. See [`stage_fn`].
pub struct FnStage<F> {
    name: String,
    f: F,
}

#[async_trait]
impl<F> Stage for FnStage<F>
where
    F: Fn(Envelope) -> StageResult + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn process(&self, envelope: Envelope) -> StageResult {
        (self.f)(envelope)
    }
}

/// Wrap a closure as a shared stage.
pub fn stage_fn<F>(name: impl Into<String>, f: F) -> StageRef
where
    F: Fn(Envelope) -> StageResult + Send + Sync + 'static,
{
    Arc::new(FnStage {
        name: name.into(),
        f,
    })
}
