//! Per-invocation record of route outcomes.

use super::RouteId;
use super::error::RoutingError;
use crate::message::Envelope;
use crate::stage::StageError;
use indexmap::IndexMap;
use std::sync::Arc;

/// Outcome of a single route invocation, as collected by a router.
#[derive(Debug)]
pub enum RouteOutcome {
    Success(Envelope),
    /// The route consumed the envelope without producing a result.
    Swallowed,
    Failure(StageError),
}

impl RouteOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RouteOutcome::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, RouteOutcome::Failure(_))
    }
}

/// A failed route: the error view every consumer sees, plus the root cause
/// when one was captured.
#[derive(Debug, Clone)]
pub struct RouteFailure {
    message: String,
    kind: String,
    cause: Option<Arc<StageError>>,
}

impl RouteFailure {
    /// Failure known only by its message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: "processing".to_string(),
            cause: None,
        }
    }

    /// Failure carrying its error, normalised to the root cause.
    pub fn from_error(error: StageError) -> Self {
        let root = error.into_root_cause();
        Self {
            message: root.to_string(),
            kind: root.kind().to_string(),
            cause: Some(Arc::new(root)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn cause(&self) -> Option<&StageError> {
        self.cause.as_deref()
    }

    /// Line used in composite diagnostics: the cause's own detailed message
    /// when it is structured, the synthesized catch line otherwise.
    pub fn detailed_message(&self) -> String {
        match self.cause() {
            Some(cause) => cause.detailed_message(),
            None => format!("{}{}", crate::stage::UNSTRUCTURED_CAUSE_PREFIX, self.message),
        }
    }
}

/// Which routes succeeded, failed, or swallowed the envelope.
///
/// Both maps keep route-configuration order, independent of the order in
/// which concurrent routes completed. A result is immutable once built.
#[derive(Debug, Clone, Default)]
pub struct RoutingResult {
    successes: IndexMap<RouteId, Envelope>,
    failures: IndexMap<RouteId, RouteFailure>,
    swallowed: Vec<RouteId>,
}

impl RoutingResult {
    /// Build from success and failure lists. Fails if a route id appears
    /// twice.
    pub fn new(
        successes: impl IntoIterator<Item = (RouteId, Envelope)>,
        failures: impl IntoIterator<Item = (RouteId, RouteFailure)>,
    ) -> Result<Self, RoutingError> {
        let mut result = Self::default();
        for (id, envelope) in successes {
            result.check_unique(&id)?;
            result.successes.insert(id, envelope);
        }
        for (id, failure) in failures {
            result.check_unique(&id)?;
            result.failures.insert(id, failure);
        }
        Ok(result)
    }

    /// Build from successes and raw errors; each error is reduced to its
    /// root cause before it is stored.
    pub fn with_causes(
        successes: impl IntoIterator<Item = (RouteId, Envelope)>,
        failures: impl IntoIterator<Item = (RouteId, StageError)>,
    ) -> Result<Self, RoutingError> {
        Self::new(
            successes,
            failures
                .into_iter()
                .map(|(id, err)| (id, RouteFailure::from_error(err))),
        )
    }

    /// Build from outcomes listed in route-configuration order.
    pub fn from_outcomes(
        outcomes: impl IntoIterator<Item = (RouteId, RouteOutcome)>,
    ) -> Result<Self, RoutingError> {
        let mut result = Self::default();
        for (id, outcome) in outcomes {
            result.check_unique(&id)?;
            match outcome {
                RouteOutcome::Success(envelope) => {
                    result.successes.insert(id, envelope);
                }
                RouteOutcome::Failure(err) => {
                    result.failures.insert(id, RouteFailure::from_error(err));
                }
                RouteOutcome::Swallowed => result.swallowed.push(id),
            }
        }
        Ok(result)
    }

    fn check_unique(&self, id: &RouteId) -> Result<(), RoutingError> {
        if self.successes.contains_key(id)
            || self.failures.contains_key(id)
            || self.swallowed.contains(id)
        {
            return Err(RoutingError::Configuration(format!(
                "route {id} reported more than one outcome"
            )));
        }
        Ok(())
    }

    pub fn successes(&self) -> &IndexMap<RouteId, Envelope> {
        &self.successes
    }

    pub fn failures(&self) -> &IndexMap<RouteId, RouteFailure> {
        &self.failures
    }

    pub fn swallowed(&self) -> &[RouteId] {
        &self.swallowed
    }

    pub fn success(&self, id: &RouteId) -> Option<&Envelope> {
        self.successes.get(id)
    }

    pub fn failure(&self, id: &RouteId) -> Option<&RouteFailure> {
        self.failures.get(id)
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Every route that was attempted, whatever its outcome.
    pub fn attempted(&self) -> impl Iterator<Item = &RouteId> {
        self.successes
            .keys()
            .chain(self.failures.keys())
            .chain(self.swallowed.iter())
    }

    pub fn attempted_count(&self) -> usize {
        self.successes.len() + self.failures.len() + self.swallowed.len()
    }
}
