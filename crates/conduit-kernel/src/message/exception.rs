//! Exception payload attached to an envelope after a failure was observed.

use crate::stage::StageError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The last failure seen while processing an envelope.
///
/// `message`, `kind` and `code` are plain data so they survive
/// serialization. The original error is kept in `cause` for in-process
/// consumers that need to walk the source chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExceptionPayload {
    /// Human-readable message of the root cause.
    pub message: String,
    /// Stable kind of the root cause, see [`StageError::kind`].
    pub kind: String,
    /// Protocol-specific error code, stamped by an exception-details stage.
    pub code: Option<String>,
    #[serde(skip)]
    cause: Option<Arc<StageError>>,
}

impl ExceptionPayload {
    /// Build a payload from an error, keeping the error as the cause.
    pub fn from_error(error: StageError) -> Self {
        let root = error.root_cause();
        Self {
            message: root.to_string(),
            kind: root.kind().to_string(),
            code: None,
            cause: Some(Arc::new(error)),
        }
    }

    /// Build a payload that only carries a message and a kind.
    pub fn from_message(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: kind.into(),
            code: None,
            cause: None,
        }
    }

    /// The full error this payload was built from, if it is still attached.
    pub fn cause(&self) -> Option<&StageError> {
        self.cause.as_deref()
    }

    /// Innermost non-wrapper error of the attached cause.
    pub fn root_cause(&self) -> Option<&StageError> {
        self.cause().map(StageError::root_cause)
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}
