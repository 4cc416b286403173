//! Fan-out / fan-in router.
//!
//! Every invocation walks the same states:
//!
//! ```text
//! EvaluatingRoutes   each route's matcher sees its own copy of the envelope
//! Dispatching        parallel, sequential, first-successful or chaining
//! Aggregating        outcomes frozen into a RoutingResult (config order)
//! Completed | Failed
//! ```
//!
//! Route failures never abort sibling routes; they are collected and only
//! turned into a [`RoutingError::Composite`] once dispatch is over.

use super::handler::DefaultResultsHandler;
use super::instrument::TracingInstrumentation;
use async_trait::async_trait;
use conduit_kernel::message::Envelope;
use conduit_kernel::routing::{
    DispatchMode, FailurePolicy, ResultsHandler, Route, RouteId, RouteInstrumentation,
    RouteOutcome, RouterConfig, RouterState, RoutingError, RoutingResult,
};
use conduit_kernel::stage::{Outcome, Stage, StageError, StageRef, StageResult};
use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// A route that passed its matcher, with the copy it will be invoked on.
struct Eligible {
    id: RouteId,
    stage: StageRef,
    envelope: Envelope,
}

/// Router stage. Routes may only be added before the first invocation.
pub struct Router {
    name: String,
    config: RouterConfig,
    routes: RwLock<Vec<(RouteId, Route)>>,
    started: AtomicBool,
    handler: Arc<dyn ResultsHandler>,
    instrumentation: Arc<dyn RouteInstrumentation>,
}

impl Router {
    /// Router with validated settings, the default results handler and
    /// tracing instrumentation.
    pub fn new(name: impl Into<String>, config: RouterConfig) -> Result<Self, RoutingError> {
        config.validate()?;
        Ok(Self::unchecked(name.into(), config))
    }

    /// Parallel fan-out to every eligible route.
    pub fn multicast(name: impl Into<String>) -> Self {
        Self::unchecked(name.into(), RouterConfig::new(DispatchMode::Parallel))
    }

    /// Every eligible route, one after the other.
    pub fn sequence(name: impl Into<String>) -> Self {
        Self::unchecked(name.into(), RouterConfig::new(DispatchMode::Sequential))
    }

    /// Eligible routes in order until one succeeds.
    pub fn first_successful(name: impl Into<String>) -> Self {
        Self::unchecked(name.into(), RouterConfig::new(DispatchMode::FirstSuccessful))
    }

    /// Eligible routes in order, each fed the previous route's output.
    pub fn chain(name: impl Into<String>) -> Self {
        Self::unchecked(name.into(), RouterConfig::new(DispatchMode::Chaining))
    }

    fn unchecked(name: String, config: RouterConfig) -> Self {
        Self {
            name,
            config,
            routes: RwLock::new(Vec::new()),
            started: AtomicBool::new(false),
            handler: Arc::new(DefaultResultsHandler),
            instrumentation: Arc::new(TracingInstrumentation),
        }
    }

    pub fn with_results_handler(mut self, handler: Arc<dyn ResultsHandler>) -> Self {
        self.handler = handler;
        self
    }

    pub fn with_instrumentation(mut self, instrumentation: Arc<dyn RouteInstrumentation>) -> Self {
        self.instrumentation = instrumentation;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.config.failure_policy = policy;
        self
    }

    /// Per-route response deadline. A zero duration disables the deadline.
    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        if timeout.is_zero() {
            self.config.response_timeout_ms = None;
        } else {
            self.config = self.config.with_response_timeout(timeout);
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Whether the router has been invoked at least once.
    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    /// Route ids in configuration order.
    pub fn route_ids(&self) -> Vec<RouteId> {
        self.routes.read().iter().map(|(id, _)| id.clone()).collect()
    }

    /// Append a route. Unnamed routes are identified by their position.
    pub fn add_route(&self, route: Route) -> Result<RouteId, RoutingError> {
        let mut routes = self.routes.write();
        if self.is_started() {
            return Err(RoutingError::Configuration(format!(
                "router '{}' has already dispatched; routes can no longer be added",
                self.name
            )));
        }

        let id = match route.name() {
            Some(name) => {
                let taken = routes
                    .iter()
                    .any(|(existing, _)| matches!(existing, RouteId::Name(n) if n == name));
                if taken {
                    return Err(RoutingError::Configuration(format!(
                        "duplicate route id '{name}' in router '{}'",
                        self.name
                    )));
                }
                RouteId::Name(name.to_string())
            }
            None => RouteId::Index(routes.len()),
        };

        routes.push((id.clone(), route));
        Ok(id)
    }

    /// Route `envelope` and aggregate the outcomes.
    pub async fn route(&self, envelope: Envelope) -> Result<Outcome, RoutingError> {
        let result = self.collect(&envelope).await;
        let outcome = match result {
            Ok(result) => self.aggregate(&envelope, result),
            Err(err) => Err(err),
        };

        let state = if outcome.is_ok() {
            RouterState::Completed
        } else {
            RouterState::Failed
        };
        self.instrumentation.on_state(&self.name, state);
        outcome
    }

    /// Evaluate and dispatch without aggregating: the raw per-route
    /// outcomes of one invocation.
    pub async fn collect(&self, envelope: &Envelope) -> Result<RoutingResult, RoutingError> {
        self.started.store(true, Ordering::Release);
        let routes = self.routes.read().clone();

        if routes.is_empty() {
            return Err(RoutingError::CouldNotRouteOutbound {
                router: self.name.clone(),
                reason: "no routes configured".to_string(),
            });
        }

        self.instrumentation
            .on_state(&self.name, RouterState::EvaluatingRoutes);
        let eligible: Vec<Eligible> = routes
            .into_iter()
            .filter_map(|(id, route)| {
                let mut copy = envelope.clone();
                route.is_match(&mut copy).then(|| Eligible {
                    id,
                    stage: route.stage().clone(),
                    envelope: copy,
                })
            })
            .collect();

        if eligible.is_empty() {
            return Err(RoutingError::RoutePathNotFound {
                router: self.name.clone(),
                message_id: envelope.message_id.clone(),
            });
        }

        debug!(
            router         = %self.name,
            mode           = ?self.config.dispatch,
            eligible       = eligible.len(),
            correlation_id = %envelope.correlation_id,
            "dispatching"
        );
        self.instrumentation
            .on_state(&self.name, RouterState::Dispatching);
        let outcomes = match self.config.dispatch {
            DispatchMode::Parallel => self.dispatch_parallel(eligible).await,
            DispatchMode::Sequential => self.dispatch_sequential(eligible).await,
            DispatchMode::FirstSuccessful => self.dispatch_first_successful(eligible).await,
            DispatchMode::Chaining => self.dispatch_chain(envelope.clone(), eligible).await,
        };

        self.instrumentation
            .on_state(&self.name, RouterState::Aggregating);
        RoutingResult::from_outcomes(outcomes)
    }

    fn aggregate(&self, original: &Envelope, result: RoutingResult) -> Result<Outcome, RoutingError> {
        match self.config.dispatch {
            DispatchMode::FirstSuccessful => {
                if let Some(winner) = result.successes().values().next() {
                    return Ok(Outcome::Continue(winner.clone()));
                }
                if !result.swallowed().is_empty() {
                    return Ok(Outcome::Swallow);
                }
                if self.config.failure_policy == FailurePolicy::FailOnAny {
                    return Err(self.composite(result));
                }
                let mut fallback = original.clone();
                fallback.set_exception(StageError::from(self.composite(result)));
                Ok(Outcome::Continue(fallback))
            }
            DispatchMode::Chaining => {
                if result.has_failures() {
                    if self.config.failure_policy == FailurePolicy::FailOnAny {
                        return Err(self.composite(result));
                    }
                    let mut last = result
                        .successes()
                        .values()
                        .last()
                        .cloned()
                        .unwrap_or_else(|| original.clone());
                    last.set_exception(StageError::from(self.composite(result)));
                    return Ok(Outcome::Continue(last));
                }
                if !result.swallowed().is_empty() {
                    return Ok(Outcome::Swallow);
                }
                Ok(result
                    .successes()
                    .values()
                    .last()
                    .cloned()
                    .map_or(Outcome::Swallow, Outcome::Continue))
            }
            DispatchMode::Parallel | DispatchMode::Sequential => {
                if result.has_failures() && self.config.failure_policy == FailurePolicy::FailOnAny {
                    return Err(self.composite(result));
                }
                Ok(self
                    .handler
                    .aggregate(original, &result)
                    .map_or(Outcome::Swallow, Outcome::Continue))
            }
        }
    }

    fn composite(&self, result: RoutingResult) -> RoutingError {
        RoutingError::composite(result).unwrap_or_else(|| {
            RoutingError::Configuration(format!(
                "router '{}' raised a composite failure without failed routes",
                self.name
            ))
        })
    }

    async fn dispatch_parallel(&self, eligible: Vec<Eligible>) -> Vec<(RouteId, RouteOutcome)> {
        let limiter = self
            .config
            .max_concurrency
            .map(|limit| Arc::new(Semaphore::new(limit)));
        let timeout = self.config.response_timeout();

        let mut ids = Vec::with_capacity(eligible.len());
        let mut join_set = JoinSet::new();
        for (index, Eligible { id, stage, envelope }) in eligible.into_iter().enumerate() {
            self.instrumentation.on_route_start(&self.name, &id);
            ids.push(id.clone());
            let limiter = limiter.clone();

            join_set.spawn(async move {
                let _permit = match limiter {
                    Some(semaphore) => match semaphore.acquire_owned().await {
                        Ok(permit) => Some(permit),
                        Err(_) => {
                            let err = StageError::processing("route concurrency limiter closed");
                            return (index, RouteOutcome::Failure(err));
                        }
                    },
                    None => None,
                };
                (index, invoke(&id, stage.as_ref(), envelope, timeout).await)
            });
        }

        // One slot per eligible route, filled in completion order.
        let mut slots: Vec<Option<RouteOutcome>> = ids.iter().map(|_| None).collect();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, outcome)) => {
                    if let (Some(slot), Some(id)) = (slots.get_mut(index), ids.get(index)) {
                        self.instrumentation.on_route_end(&self.name, id, &outcome);
                        *slot = Some(outcome);
                    }
                }
                Err(err) => warn!(router = %self.name, "route task did not complete: {err}"),
            }
        }

        ids.into_iter()
            .zip(slots)
            .map(|(id, slot)| {
                let outcome = slot.unwrap_or_else(|| {
                    let outcome = RouteOutcome::Failure(StageError::processing(format!(
                        "route {id} terminated before reporting an outcome"
                    )));
                    self.instrumentation.on_route_end(&self.name, &id, &outcome);
                    outcome
                });
                (id, outcome)
            })
            .collect()
    }

    async fn dispatch_sequential(&self, eligible: Vec<Eligible>) -> Vec<(RouteId, RouteOutcome)> {
        let timeout = self.config.response_timeout();
        let mut outcomes = Vec::with_capacity(eligible.len());
        for Eligible { id, stage, envelope } in eligible {
            let outcome = self.invoke_tracked(&id, stage.as_ref(), envelope, timeout).await;
            outcomes.push((id, outcome));
        }
        outcomes
    }

    /// Stops after the first route that does not fail.
    async fn dispatch_first_successful(
        &self,
        eligible: Vec<Eligible>,
    ) -> Vec<(RouteId, RouteOutcome)> {
        let timeout = self.config.response_timeout();
        let mut outcomes = Vec::new();
        for Eligible { id, stage, envelope } in eligible {
            let outcome = self.invoke_tracked(&id, stage.as_ref(), envelope, timeout).await;
            let done = !outcome.is_failure();
            outcomes.push((id, outcome));
            if done {
                break;
            }
        }
        outcomes
    }

    /// Feeds each route the previous route's output; stops on the first
    /// failure or swallow.
    async fn dispatch_chain(
        &self,
        input: Envelope,
        eligible: Vec<Eligible>,
    ) -> Vec<(RouteId, RouteOutcome)> {
        let timeout = self.config.response_timeout();
        let mut outcomes = Vec::new();
        let mut current = input;
        for Eligible { id, stage, .. } in eligible {
            let outcome = self
                .invoke_tracked(&id, stage.as_ref(), current.clone(), timeout)
                .await;
            let next = match &outcome {
                RouteOutcome::Success(envelope) => Some(envelope.clone()),
                RouteOutcome::Swallowed | RouteOutcome::Failure(_) => None,
            };
            outcomes.push((id, outcome));
            match next {
                Some(envelope) => current = envelope,
                None => break,
            }
        }
        outcomes
    }

    async fn invoke_tracked(
        &self,
        id: &RouteId,
        stage: &dyn Stage,
        envelope: Envelope,
        timeout: Option<Duration>,
    ) -> RouteOutcome {
        self.instrumentation.on_route_start(&self.name, id);
        let outcome = invoke(id, stage, envelope, timeout).await;
        self.instrumentation.on_route_end(&self.name, id, &outcome);
        outcome
    }
}

async fn invoke(
    id: &RouteId,
    stage: &dyn Stage,
    envelope: Envelope,
    timeout: Option<Duration>,
) -> RouteOutcome {
    let result = match timeout {
        Some(limit) => match tokio::time::timeout(limit, stage.process(envelope)).await {
            Ok(result) => result,
            Err(_) => Err(StageError::from(RoutingError::ResponseTimeout {
                route: id.clone(),
                timeout: limit,
            })),
        },
        None => stage.process(envelope).await,
    };

    match result {
        Ok(Outcome::Continue(envelope)) => RouteOutcome::Success(envelope),
        Ok(Outcome::Swallow) => RouteOutcome::Swallowed,
        Err(err) => RouteOutcome::Failure(err),
    }
}

#[async_trait]
impl Stage for Router {
    fn name(&self) -> &str {
        &self.name
    }

    async fn process(&self, envelope: Envelope) -> StageResult {
        self.route(envelope).await.map_err(StageError::from)
    }
}
