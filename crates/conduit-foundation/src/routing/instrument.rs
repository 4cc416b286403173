use conduit_kernel::routing::{RouteId, RouteInstrumentation, RouteOutcome, RouterState};
use tracing::{debug, trace, warn};

/// Emits a `tracing` event for every router state change and route outcome.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingInstrumentation;

impl RouteInstrumentation for TracingInstrumentation {
    fn on_state(&self, router: &str, state: RouterState) {
        trace!(router, state = %state, "router state");
    }

    fn on_route_start(&self, router: &str, route: &RouteId) {
        debug!(router, route = %route, "route dispatched");
    }

    fn on_route_end(&self, router: &str, route: &RouteId, outcome: &RouteOutcome) {
        match outcome {
            RouteOutcome::Success(envelope) => debug!(
                router,
                route      = %route,
                message_id = %envelope.message_id,
                "route succeeded"
            ),
            RouteOutcome::Swallowed => debug!(router, route = %route, "route swallowed message"),
            RouteOutcome::Failure(err) => warn!(
                router,
                route = %route,
                kind  = err.kind(),
                "route failed: {err}"
            ),
        }
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopInstrumentation;

impl RouteInstrumentation for NoopInstrumentation {}
