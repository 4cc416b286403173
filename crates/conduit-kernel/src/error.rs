//! Crate-level error types for `conduit-kernel`.
//!
//! [`KernelError`] composes the errors of every sub-module so that
//! bootstrap code (loading router settings, wiring endpoints) can use one
//! result type and attach context with [`error_stack::Report`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use conduit_kernel::error::{KernelError, KernelResult};
//! use error_stack::{Report, ResultExt};
//!
//! fn read_router_settings(path: &str) -> KernelResult<String> {
//!     std::fs::read_to_string(path)
//!         .map_err(KernelError::from)
//!         .map_err(Report::new)
//!         .attach(format!("reading {path}"))
//! }
//! ```
//!
//! The processing path itself never uses reports: stages return
//! [`StageError`](crate::stage::StageError) and routers return
//! [`RoutingError`](crate::routing::RoutingError).

use crate::routing::RoutingError;
use crate::security::SecurityError;
use crate::stage::StageError;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum KernelError {
    #[error("stage failed: {0}")]
    Stage(#[from] StageError),

    #[error("routing failed: {0}")]
    Routing(#[from] RoutingError),

    #[error("security check failed: {0}")]
    Security(#[from] SecurityError),

    /// Requires the `config` feature.
    #[cfg(feature = "config")]
    #[error("invalid configuration: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Invariant broken inside the kernel itself.
    #[error("internal kernel error: {0}")]
    Internal(String),
}

/// `Result<T, error_stack::Report<KernelError>>`
pub type KernelResult<T> = Result<T, error_stack::Report<KernelError>>;
