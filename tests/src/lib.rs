//! Conduit Testing Framework
//!
//! Test doubles for stages, connectors, endpoints and security filters, so
//! routers and endpoint pipelines can be exercised without a transport.

pub mod endpoint;
pub mod stages;

pub use endpoint::{RecordingConnector, StaticSecurityFilter, test_endpoint};
pub use stages::{MockStage, Reply};

/// Assert how many times a [`MockStage`] was invoked.
#[macro_export]
macro_rules! assert_stage_called {
    ($stage:expr, $expected_count:expr) => {
        let count = $stage.call_count();
        assert_eq!(
            count, $expected_count,
            "stage '{}' expected {} call(s), got {}",
            $stage.label(),
            $expected_count,
            count
        );
    };
}
