//! Endpoint pipeline assembly.
//!
//! Inbound:
//! ```text
//! originating-endpoint → mime-type-check → message-log → notification(received)
//!     → security-filter → endpoint-decorator → next
//! ```
//! Outbound:
//! ```text
//! exception-details → mime-type-check → message-log → notification(dispatched)
//!     → security-filter → next
//! ```
//! Enrichment and observation run before security and decoration, so they
//! also see envelopes that are rejected later. A stage is only added when the
//! endpoint declares the matching capability.

use crate::stages::{
    DecoratorInterceptor, ExceptionDetailsInterceptor, LoggingInterceptor, MimeTypeInterceptor,
    NotificationInterceptor, OriginatingEndpointInterceptor, SecurityFilterInterceptor,
};
use conduit_kernel::endpoint::{Endpoint, EndpointKind};
use conduit_kernel::error_code::ErrorCodeMapping;
use conduit_kernel::notification::NotificationKind;
use conduit_kernel::stage::{Interceptor, StageChain, StageChainBuilder, StageRef};
use std::sync::Arc;

pub struct EndpointPipeline;

impl EndpointPipeline {
    /// Interceptors for an inbound endpoint, in execution order.
    pub fn inbound_chain(endpoint: &dyn Endpoint) -> StageChainBuilder {
        let name = endpoint.display_name().to_string();
        let connector = endpoint.connector();

        StageChain::builder()
            .interceptor(Arc::new(OriginatingEndpointInterceptor::for_endpoint(endpoint)))
            .maybe_interceptor(mime_check(endpoint))
            .interceptor(Arc::new(LoggingInterceptor::new(
                name.clone(),
                EndpointKind::Inbound,
            )))
            .interceptor(Arc::new(NotificationInterceptor::new(
                name.clone(),
                NotificationKind::MessageReceived,
                connector.clone(),
            )))
            .maybe_interceptor(endpoint.security_filter().map(|filter| {
                Arc::new(SecurityFilterInterceptor::new(name, filter, connector)) as Arc<dyn Interceptor>
            }))
            .maybe_interceptor(
                endpoint
                    .decorator()
                    .map(|d| Arc::new(DecoratorInterceptor::new(d)) as Arc<dyn Interceptor>),
            )
    }

    /// Interceptors for an outbound endpoint, in execution order.
    pub fn outbound_chain(
        endpoint: &dyn Endpoint,
        error_codes: Arc<dyn ErrorCodeMapping>,
    ) -> StageChainBuilder {
        let name = endpoint.display_name().to_string();
        let connector = endpoint.connector();

        StageChain::builder()
            .interceptor(Arc::new(ExceptionDetailsInterceptor::new(
                error_codes,
                connector.clone(),
            )))
            .maybe_interceptor(mime_check(endpoint))
            .interceptor(Arc::new(LoggingInterceptor::new(
                name.clone(),
                EndpointKind::Outbound,
            )))
            .interceptor(Arc::new(NotificationInterceptor::new(
                name.clone(),
                NotificationKind::MessageDispatched,
                connector.clone(),
            )))
            .maybe_interceptor(endpoint.security_filter().map(|filter| {
                Arc::new(SecurityFilterInterceptor::new(name, filter, connector)) as Arc<dyn Interceptor>
            }))
    }

    /// Inbound pipeline in front of `next`.
    pub fn inbound(endpoint: &dyn Endpoint, next: StageRef) -> StageRef {
        Self::inbound_chain(endpoint).build(next)
    }

    /// Outbound pipeline in front of `next`.
    pub fn outbound(
        endpoint: &dyn Endpoint,
        error_codes: Arc<dyn ErrorCodeMapping>,
        next: StageRef,
    ) -> StageRef {
        Self::outbound_chain(endpoint, error_codes).build(next)
    }
}

fn mime_check(endpoint: &dyn Endpoint) -> Option<Arc<dyn Interceptor>> {
    endpoint
        .mime_type()
        .map(|mime| Arc::new(MimeTypeInterceptor::new(mime)) as Arc<dyn Interceptor>)
}
