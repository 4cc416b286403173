//! Routers and their collaborators.

mod handler;
mod instrument;
mod matcher;
mod router;

pub use handler::DefaultResultsHandler;
pub use instrument::{NoopInstrumentation, TracingInstrumentation};
pub use matcher::{AlwaysMatch, PayloadRegex, PropertyEquals};
pub use router::Router;
