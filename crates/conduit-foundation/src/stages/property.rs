use async_trait::async_trait;
use conduit_kernel::endpoint::Endpoint;
use conduit_kernel::message::{Envelope, PropertyScope, names};
use conduit_kernel::stage::{Interceptor, Stage, StageResult};

/// Stamps the originating endpoint into INBOUND scope.
#[derive(Debug, Clone)]
pub struct OriginatingEndpointInterceptor {
    endpoint: String,
}

impl OriginatingEndpointInterceptor {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    /// Uses the endpoint's logical name, or its URI when it has none.
    pub fn for_endpoint(endpoint: &dyn Endpoint) -> Self {
        Self::new(endpoint.display_name())
    }
}

#[async_trait]
impl Interceptor for OriginatingEndpointInterceptor {
    fn name(&self) -> &str {
        "originating-endpoint"
    }

    async fn intercept(&self, mut envelope: Envelope, next: &dyn Stage) -> StageResult {
        envelope.set_property(
            names::ORIGINATING_ENDPOINT,
            self.endpoint.clone(),
            PropertyScope::Inbound,
        );
        next.process(envelope).await
    }
}
