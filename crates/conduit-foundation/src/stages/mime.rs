//! Content-type validation against the endpoint's declared mime type.

use async_trait::async_trait;
use conduit_kernel::message::{Envelope, PropertyScope, names};
use conduit_kernel::stage::{Interceptor, Stage, StageError, StageResult};
use mime_guess::Mime;
use serde_json::Value;

/// Scopes consulted for an existing content type, in order.
const CONTENT_TYPE_SCOPES: [PropertyScope; 2] = [PropertyScope::Inbound, PropertyScope::Outbound];

/// Fails fast when the envelope declares a content type the endpoint does
/// not accept; stamps the expected type when none is declared.
///
/// Only the essence (`type/subtype`) is compared, so parameters such as
/// `charset` never cause a mismatch.
#[derive(Debug, Clone)]
pub struct MimeTypeInterceptor {
    expected: String,
}

impl MimeTypeInterceptor {
    pub fn new(expected: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
        }
    }

    pub fn expected(&self) -> &str {
        &self.expected
    }

    fn check(&self, envelope: &mut Envelope) -> Result<(), StageError> {
        let expected = parse(&self.expected)?;

        let declared = envelope
            .properties
            .find_first(names::CONTENT_TYPE, &CONTENT_TYPE_SCOPES)
            .map(|(_, value)| match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            });

        match declared {
            Some(declared) => {
                let actual = parse(&declared)?;
                if actual.essence_str() != expected.essence_str() {
                    return Err(StageError::MimeTypeMismatch {
                        expected: expected.essence_str().to_string(),
                        actual: actual.essence_str().to_string(),
                    });
                }
            }
            None => {
                envelope.set_property(
                    names::CONTENT_TYPE,
                    self.expected.clone(),
                    PropertyScope::Inbound,
                );
            }
        }
        Ok(())
    }
}

fn parse(raw: &str) -> Result<Mime, StageError> {
    raw.trim()
        .parse::<Mime>()
        .map_err(|_| StageError::IllegalMimeType(raw.to_string()))
}

#[async_trait]
impl Interceptor for MimeTypeInterceptor {
    fn name(&self) -> &str {
        "mime-type-check"
    }

    async fn intercept(&self, mut envelope: Envelope, next: &dyn Stage) -> StageResult {
        self.check(&mut envelope)?;
        next.process(envelope).await
    }
}
