//! Typed errors for the stage contract.

use crate::routing::RoutingError;
use crate::security::SecurityError;
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Line emitted for route failures whose root cause is not one of the
/// structured error kinds below.
pub const UNSTRUCTURED_CAUSE_PREFIX: &str = "Caught exception in Exception Strategy: ";

/// Failure raised by a [`Stage`](super::Stage).
///
/// Every variant except [`StageError::Processing`] is *structured*: it knows
/// how to describe itself in detail. `Processing` is the catch-all for
/// failures that come from arbitrary user code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StageError {
    /// Unrecoverable failure raised by stage logic.
    #[error("{message}")]
    Processing {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Adds context around another stage error. Transparent for root-cause
    /// lookups.
    #[error("{context}: {source}")]
    Wrapped {
        context: String,
        #[source]
        source: Box<StageError>,
    },

    /// The message carries a content type other than the endpoint expects.
    #[error("mime type mismatch: endpoint expects '{expected}' but message declares '{actual}'")]
    MimeTypeMismatch { expected: String, actual: String },

    /// A content type could not be parsed.
    #[error("illegal mime type '{0}'")]
    IllegalMimeType(String),

    #[error(transparent)]
    Security(#[from] SecurityError),

    #[error(transparent)]
    Routing(Box<RoutingError>),
}

impl From<RoutingError> for StageError {
    fn from(err: RoutingError) -> Self {
        StageError::Routing(Box::new(err))
    }
}

impl StageError {
    /// Unstructured processing failure with a message.
    pub fn processing(message: impl Into<String>) -> Self {
        StageError::Processing {
            message: message.into(),
            source: None,
        }
    }

    /// Unstructured processing failure caused by an arbitrary error.
    pub fn other<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        StageError::Processing {
            message: error.to_string(),
            source: Some(Box::new(error)),
        }
    }

    /// Wrap this error with additional context.
    pub fn wrap(self, context: impl Into<String>) -> Self {
        StageError::Wrapped {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Unwrap nested [`StageError::Wrapped`] layers until a non-wrapper is
    /// found.
    pub fn root_cause(&self) -> &StageError {
        let mut current = self;
        while let StageError::Wrapped { source, .. } = current {
            current = source.as_ref();
        }
        current
    }

    /// Owned variant of [`root_cause`](Self::root_cause).
    pub fn into_root_cause(self) -> StageError {
        let mut current = self;
        loop {
            match current {
                StageError::Wrapped { source, .. } => current = *source,
                other => return other,
            }
        }
    }

    /// Whether this error (after unwrapping) describes itself in detail.
    pub fn is_structured(&self) -> bool {
        !matches!(self.root_cause(), StageError::Processing { .. })
    }

    /// Stable identifier of the root cause's concrete kind. Used as the key
    /// for protocol error-code lookups.
    pub fn kind(&self) -> &'static str {
        match self.root_cause() {
            StageError::Processing { .. } => "processing",
            StageError::MimeTypeMismatch { .. } => "mime_type_mismatch",
            StageError::IllegalMimeType(_) => "illegal_mime_type",
            StageError::Security(e) => e.kind(),
            StageError::Routing(e) => e.kind(),
            StageError::Wrapped { .. } => "wrapped",
        }
    }

    /// Routing error at the root of this error, if any.
    pub fn as_routing(&self) -> Option<&RoutingError> {
        match self.root_cause() {
            StageError::Routing(e) => Some(e.as_ref()),
            _ => None,
        }
    }

    /// Detailed, operator-facing description.
    ///
    /// Structured errors describe themselves (a nested composite routing
    /// failure expands to its own per-route listing); unstructured ones are
    /// rendered with [`UNSTRUCTURED_CAUSE_PREFIX`].
    pub fn detailed_message(&self) -> String {
        match self.root_cause() {
            StageError::Routing(e) => e.detailed_message(),
            root @ StageError::Processing { .. } => {
                format!("{UNSTRUCTURED_CAUSE_PREFIX}{root}")
            }
            root => root.to_string(),
        }
    }
}
