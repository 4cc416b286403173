//! Conduit kernel: the contracts every other crate builds on.
//!
//! - [`message`]: the [`Envelope`](message::Envelope) and its scoped properties
//! - [`stage`]: the stage contract and interceptor chains
//! - [`routing`]: routes, routing results and the composite routing error
//! - [`security`], [`endpoint`], [`notification`], [`error_code`]: the
//!   collaborators endpoint pipelines consult
//!
//! Concrete stages and routers live in `conduit-foundation`.

// message module
pub mod message;

// stage module
pub mod stage;
pub use stage::{Outcome, Stage, StageError, StageRef, StageResult};

// routing module
pub mod routing;

// security module
pub mod security;

// endpoint module
pub mod endpoint;

// notification module
pub mod notification;

// error code module
pub mod error_code;

// error module
pub mod error;

// config module
#[cfg(feature = "config")]
pub mod config;

pub use message::{Envelope, PropertyScope};
