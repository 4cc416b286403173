//! Security filter contract.
//!
//! Concrete filters live in `conduit-foundation`; the interceptor that
//! invokes them (and turns a failure into an error-carrying envelope) lives
//! there as well.

use crate::message::Envelope;
use async_trait::async_trait;
use thiserror::Error;

/// Authentication / authorisation failure.
///
/// The `Display` output is the localised message placed into the payload of
/// a rejected envelope.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum SecurityError {
    /// Credentials were present but could not be verified.
    #[error("Authentication failed: {reason}")]
    Unauthenticated { reason: String },

    /// The principal is known but not allowed to perform the operation.
    #[error("Principal '{principal}' is not authorised: {reason}")]
    Unauthorised { principal: String, reason: String },

    /// The message carries no credentials at all.
    #[error("Authentication credentials were not set on the message")]
    CredentialsNotSet,
}

impl SecurityError {
    pub fn unauthenticated(reason: impl Into<String>) -> Self {
        SecurityError::Unauthenticated {
            reason: reason.into(),
        }
    }

    pub fn unauthorised(principal: impl Into<String>, reason: impl Into<String>) -> Self {
        SecurityError::Unauthorised {
            principal: principal.into(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SecurityError::Unauthenticated { .. } => "security_unauthenticated",
            SecurityError::Unauthorised { .. } => "security_unauthorised",
            SecurityError::CredentialsNotSet => "security_credentials_not_set",
        }
    }
}

/// Authenticates an envelope before it reaches the guarded stage.
///
/// Filters may record what they learned (e.g. the principal) on the envelope.
#[async_trait]
pub trait SecurityFilter: Send + Sync {
    fn name(&self) -> &str;

    async fn authenticate(&self, envelope: &mut Envelope) -> Result<(), SecurityError>;
}
