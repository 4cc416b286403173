//! Interceptors that make up endpoint pipelines.
//!
//! Each one is a [`Interceptor`](conduit_kernel::stage::Interceptor); see
//! [`EndpointPipeline`](crate::pipeline::EndpointPipeline) for the order they
//! are assembled in.

mod decorator;
mod exception_details;
mod logging;
mod mime;
mod notification;
mod property;
mod security;

pub use decorator::DecoratorInterceptor;
pub use exception_details::ExceptionDetailsInterceptor;
pub use logging::LoggingInterceptor;
pub use mime::MimeTypeInterceptor;
pub use notification::NotificationInterceptor;
pub use property::OriginatingEndpointInterceptor;
pub use security::SecurityFilterInterceptor;
