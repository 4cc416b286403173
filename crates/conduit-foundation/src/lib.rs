//! Conduit foundation: concrete stages, endpoint pipelines and routers built
//! on the `conduit-kernel` contracts.

// endpoint module
pub mod endpoint;

// error codes module
pub mod error_codes;

// logging module
pub mod logging;

// pipeline module
pub mod pipeline;

// routing module
pub mod routing;
pub use routing::{DefaultResultsHandler, Router};

// security module
pub mod security;

// stages module
pub mod stages;

pub use pipeline::EndpointPipeline;
