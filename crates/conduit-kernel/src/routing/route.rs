//! Routes and route eligibility.

use crate::message::Envelope;
use crate::stage::StageRef;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Identifier of a route inside one router.
///
/// Routes added without a name are identified by their configuration index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RouteId {
    Index(usize),
    Name(String),
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteId::Index(i) => write!(f, "#{i}"),
            RouteId::Name(name) => f.write_str(name),
        }
    }
}

impl From<usize> for RouteId {
    fn from(index: usize) -> Self {
        RouteId::Index(index)
    }
}

impl From<&str> for RouteId {
    fn from(name: &str) -> Self {
        RouteId::Name(name.to_string())
    }
}

impl From<String> for RouteId {
    fn from(name: String) -> Self {
        RouteId::Name(name)
    }
}

/// Eligibility predicate evaluated once per route before dispatch.
///
/// The predicate receives the route's own copy of the envelope and may
/// record match state on it; those edits travel with that route only. It
/// must not perform the route's work.
pub trait Matchable: Send + Sync {
    fn is_match(&self, envelope: &mut Envelope) -> bool;
}

impl<F> Matchable for F
where
    F: Fn(&mut Envelope) -> bool + Send + Sync,
{
    fn is_match(&self, envelope: &mut Envelope) -> bool {
        self(envelope)
    }
}

/// A stage registered in a router, with an optional id and predicate.
#[derive(Clone)]
pub struct Route {
    name: Option<String>,
    stage: StageRef,
    matcher: Option<Arc<dyn Matchable>>,
}

impl Route {
    /// Unnamed route; the router assigns its index as id.
    pub fn new(stage: StageRef) -> Self {
        Self {
            name: None,
            stage,
            matcher: None,
        }
    }

    pub fn named(name: impl Into<String>, stage: StageRef) -> Self {
        Self {
            name: Some(name.into()),
            stage,
            matcher: None,
        }
    }

    pub fn with_matcher(mut self, matcher: Arc<dyn Matchable>) -> Self {
        self.matcher = Some(matcher);
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn stage(&self) -> &StageRef {
        &self.stage
    }

    /// `true` when no predicate is configured.
    pub fn is_match(&self, envelope: &mut Envelope) -> bool {
        self.matcher.as_ref().is_none_or(|m| m.is_match(envelope))
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("name", &self.name)
            .field("stage", &self.stage.name())
            .field("has_matcher", &self.matcher.is_some())
            .finish()
    }
}
