//! Routing contracts.
//!
//! A router fans an envelope out to its eligible routes, collects every
//! outcome into a [`RoutingResult`], and then either aggregates the
//! successes through a [`ResultsHandler`] or raises a composite
//! [`RoutingError`]. Concrete routers live in `conduit-foundation`.
//!
//! ```text
//!  Idle ─► EvaluatingRoutes ─► Dispatching ─► Aggregating ─┬─► Completed
//!                │                                         └─► Failed
//!                └─ no eligible route ─► RoutePathNotFound
//! ```

mod error;
mod policy;
mod result;
mod route;

pub use error::{COMPOSITE_HEADER, CompositeRoutingError, RoutingError};
pub use policy::{DispatchMode, FailurePolicy, RouterConfig, RouterState};
pub use result::{RouteFailure, RouteOutcome, RoutingResult};
pub use route::{Matchable, Route, RouteId};

use crate::message::Envelope;

/// Fan-in strategy: turns the successes of one router invocation into a
/// single envelope.
pub trait ResultsHandler: Send + Sync {
    /// `original` is the envelope the router received. Returning `None`
    /// swallows the invocation.
    fn aggregate(&self, original: &Envelope, result: &RoutingResult) -> Option<Envelope>;
}

/// Observer injected into routers. Implementations must not block.
pub trait RouteInstrumentation: Send + Sync {
    fn on_state(&self, _router: &str, _state: RouterState) {}

    fn on_route_start(&self, _router: &str, _route: &RouteId) {}

    fn on_route_end(&self, _router: &str, _route: &RouteId, _outcome: &RouteOutcome) {}
}
