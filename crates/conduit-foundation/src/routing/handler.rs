use conduit_kernel::message::{Envelope, PropertyScope, names};
use conduit_kernel::routing::{ResultsHandler, RoutingError, RoutingResult};
use conduit_kernel::stage::StageError;
use serde_json::Value;

/// Fan-in used by routers unless another handler is injected.
///
/// | successes | result                                                  |
/// |-----------|---------------------------------------------------------|
/// | 0         | swallowed, or the original envelope if routes failed    |
/// | 1         | that route's envelope                                   |
/// | n > 1     | envelope derived from the original, payload = `[p0, …]` |
///
/// Payload order and the INVOCATION `conduit.route.ids` list follow route
/// configuration order. When failures are present (the router tolerated
/// them) the returned envelope carries an exception payload describing
/// every failed route.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultResultsHandler;

impl DefaultResultsHandler {
    pub fn new() -> Self {
        Self
    }
}

impl ResultsHandler for DefaultResultsHandler {
    fn aggregate(&self, original: &Envelope, result: &RoutingResult) -> Option<Envelope> {
        let successes = result.successes();

        let mut aggregated = match successes.len() {
            0 if result.has_failures() => original.clone(),
            0 => return None,
            1 => successes.values().next()?.clone(),
            _ => {
                let payloads: Vec<Value> = successes.values().map(|e| e.payload.clone()).collect();
                let ids: Vec<Value> = successes
                    .keys()
                    .map(|id| Value::String(id.to_string()))
                    .collect();
                let mut derived = original.derive(Value::Array(payloads));
                derived.set_property(names::ROUTE_IDS, Value::Array(ids), PropertyScope::Invocation);
                derived
            }
        };

        if let Some(composite) = RoutingError::composite(result.clone()) {
            aggregated.set_exception(StageError::from(composite));
        }
        Some(aggregated)
    }
}
