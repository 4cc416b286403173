//! Router configuration: dispatch mode, failure tolerance, timeouts.

use super::RoutingError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// How a router invokes its eligible routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchMode {
    /// Every eligible route concurrently, each on its own copy.
    #[default]
    Parallel,
    /// Every eligible route in configuration order, each on its own copy.
    Sequential,
    /// In configuration order, stopping at the first route that succeeds.
    FirstSuccessful,
    /// In configuration order; each route's output is the next route's input.
    Chaining,
}

/// Whether failed routes abort the router invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Raise the composite error when any route failed.
    #[default]
    FailOnAny,
    /// Aggregate whatever succeeded; failures are only surfaced on the
    /// aggregated envelope.
    Tolerant,
}

/// Lifecycle of a single router invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouterState {
    Idle,
    EvaluatingRoutes,
    Dispatching,
    Aggregating,
    Completed,
    Failed,
}

impl RouterState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RouterState::Completed | RouterState::Failed)
    }
}

impl fmt::Display for RouterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RouterState::Idle => "idle",
            RouterState::EvaluatingRoutes => "evaluating_routes",
            RouterState::Dispatching => "dispatching",
            RouterState::Aggregating => "aggregating",
            RouterState::Completed => "completed",
            RouterState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Serializable router settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    pub dispatch: DispatchMode,
    pub failure_policy: FailurePolicy,
    /// Per-route response deadline in milliseconds. `None` waits forever.
    pub response_timeout_ms: Option<u64>,
    /// Upper bound on routes in flight at once for parallel dispatch.
    /// `None` means unbounded.
    pub max_concurrency: Option<usize>,
}

impl RouterConfig {
    pub fn new(dispatch: DispatchMode) -> Self {
        Self {
            dispatch,
            ..Self::default()
        }
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Sub-millisecond remainders round up, so only `Duration::ZERO` maps to 0.
    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        let millis = timeout.as_nanos().div_ceil(1_000_000);
        self.response_timeout_ms = Some(u64::try_from(millis).unwrap_or(u64::MAX));
        self
    }

    pub fn with_max_concurrency(mut self, limit: usize) -> Self {
        self.max_concurrency = Some(limit);
        self
    }

    pub fn response_timeout(&self) -> Option<Duration> {
        self.response_timeout_ms.map(Duration::from_millis)
    }

    pub fn validate(&self) -> Result<(), RoutingError> {
        if self.response_timeout_ms == Some(0) {
            return Err(RoutingError::Configuration(
                "response timeout must be greater than 0 ms".to_string(),
            ));
        }
        if self.max_concurrency == Some(0) {
            return Err(RoutingError::Configuration(
                "max concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
