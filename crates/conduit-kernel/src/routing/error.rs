//! Router failure taxonomy.

use super::{RouteFailure, RouteId, RoutingResult};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Header line of [`CompositeRoutingError::detailed_message`].
pub const COMPOSITE_HEADER: &str = "Exception(s) were found for route(s):";

/// Aggregate failure raised once every eligible route has been attempted and
/// at least one of them failed.
///
/// Can only be built from a [`RoutingResult`] with a non-empty failure map.
#[derive(Debug, Clone)]
pub struct CompositeRoutingError {
    result: RoutingResult,
}

impl CompositeRoutingError {
    /// `None` when `result` holds no failures.
    pub fn new(result: RoutingResult) -> Option<Self> {
        result.has_failures().then_some(Self { result })
    }

    pub fn routing_result(&self) -> &RoutingResult {
        &self.result
    }

    pub fn into_routing_result(self) -> RoutingResult {
        self.result
    }

    /// One entry per failed route, in route-configuration order.
    pub fn errors(&self) -> Vec<(&RouteId, &RouteFailure)> {
        self.result.failures().iter().collect()
    }

    /// Every failed route with its innermost cause, one per line, in the
    /// order the failures were recorded.
    pub fn detailed_message(&self) -> String {
        let mut out = String::from(COMPOSITE_HEADER);
        for (id, failure) in self.result.failures() {
            out.push_str(&format!("\n\tRoute {id}: {}", failure.detailed_message()));
        }
        out
    }
}

impl fmt::Display for CompositeRoutingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let failed: Vec<String> = self
            .result
            .failures()
            .iter()
            .map(|(id, failure)| format!("{id}: {}", failure.message()))
            .collect();
        write!(
            f,
            "{} of {} route(s) failed [{}]",
            failed.len(),
            self.result.attempted_count(),
            failed.join("; ")
        )
    }
}

impl std::error::Error for CompositeRoutingError {}

/// Errors raised by routers.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RoutingError {
    /// One or more routes failed.
    #[error(transparent)]
    Composite(CompositeRoutingError),

    /// No configured route accepted the envelope.
    #[error("no route in router '{router}' matched message {message_id}")]
    RoutePathNotFound { router: String, message_id: String },

    /// The router could not attempt dispatch at all.
    #[error("could not route outbound message through '{router}': {reason}")]
    CouldNotRouteOutbound { router: String, reason: String },

    /// A single route missed its response deadline.
    #[error("route {route} did not respond within {}ms", .timeout.as_millis())]
    ResponseTimeout { route: RouteId, timeout: Duration },

    /// Invalid router setup, e.g. a route added after dispatch started.
    #[error("routing configuration error: {0}")]
    Configuration(String),
}

impl RoutingError {
    /// Composite error for `result`, or `None` when nothing failed.
    pub fn composite(result: RoutingResult) -> Option<Self> {
        CompositeRoutingError::new(result).map(RoutingError::Composite)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            RoutingError::Composite(_) => "composite_routing",
            RoutingError::RoutePathNotFound { .. } => "route_path_not_found",
            RoutingError::CouldNotRouteOutbound { .. } => "could_not_route_outbound",
            RoutingError::ResponseTimeout { .. } => "response_timeout",
            RoutingError::Configuration(_) => "routing_configuration",
        }
    }

    pub fn as_composite(&self) -> Option<&CompositeRoutingError> {
        match self {
            RoutingError::Composite(c) => Some(c),
            _ => None,
        }
    }

    pub fn detailed_message(&self) -> String {
        match self {
            RoutingError::Composite(c) => c.detailed_message(),
            other => other.to_string(),
        }
    }
}
