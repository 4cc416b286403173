//! The in-flight message unit.
//!
//! An [`Envelope`] is passed by value from stage to stage. Stages that want
//! to change it take ownership, mutate, and hand the same value on; routers
//! clone it once per route so that routes never observe each other's edits.

mod exception;
mod properties;

pub use exception::ExceptionPayload;
pub use properties::{Properties, PropertyScope};

use crate::stage::StageError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Well-known property names.
pub mod names {
    /// Content type of the payload, e.g. `application/json`.
    pub const CONTENT_TYPE: &str = "Content-Type";
    /// Logical name (or URI) of the endpoint the message entered through.
    pub const ORIGINATING_ENDPOINT: &str = "conduit.originating.endpoint";
    /// Ids of the routes that contributed to an aggregated envelope.
    pub const ROUTE_IDS: &str = "conduit.route.ids";
    /// Principal recorded by a security filter.
    pub const SECURITY_PRINCIPAL: &str = "conduit.security.principal";
}

/// Message envelope: payload, scoped properties and an optional exception
/// payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub message_id: String,
    pub correlation_id: String,
    pub payload: Value,
    #[serde(default)]
    pub properties: Properties,
    #[serde(default)]
    pub exception_payload: Option<ExceptionPayload>,
    pub timestamp_ms: u64,
}

impl Envelope {
    pub fn new(payload: impl Into<Value>) -> Self {
        let message_id = uuid::Uuid::now_v7().to_string();
        Self {
            correlation_id: message_id.clone(),
            message_id,
            payload: payload.into(),
            properties: Properties::new(),
            exception_payload: None,
            timestamp_ms: now_epoch_ms(),
        }
    }

    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = id.into();
        self
    }

    pub fn with_property(
        mut self,
        scope: PropertyScope,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.properties.set(scope, name, value);
        self
    }

    /// Derive a new message from this one: fresh message id and payload,
    /// same correlation id and properties, no exception payload.
    pub fn derive(&self, payload: impl Into<Value>) -> Self {
        Self {
            message_id: uuid::Uuid::now_v7().to_string(),
            correlation_id: self.correlation_id.clone(),
            payload: payload.into(),
            properties: self.properties.clone(),
            exception_payload: None,
            timestamp_ms: now_epoch_ms(),
        }
    }

    pub fn property(&self, name: &str, scope: PropertyScope) -> Option<&Value> {
        self.properties.get(scope, name)
    }

    pub fn property_str(&self, name: &str, scope: PropertyScope) -> Option<&str> {
        self.properties.get_str(scope, name)
    }

    pub fn set_property(
        &mut self,
        name: impl Into<String>,
        value: impl Into<Value>,
        scope: PropertyScope,
    ) -> Option<Value> {
        self.properties.set(scope, name, value)
    }

    /// Record `error` as the envelope's exception payload.
    pub fn set_exception(&mut self, error: StageError) {
        self.exception_payload = Some(ExceptionPayload::from_error(error));
    }

    pub fn clear_exception(&mut self) -> Option<ExceptionPayload> {
        self.exception_payload.take()
    }

    pub fn has_exception(&self) -> bool {
        self.exception_payload.is_some()
    }

    /// Payload rendered as text: strings verbatim, everything else as JSON.
    pub fn payload_as_string(&self) -> String {
        match &self.payload {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

fn now_epoch_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
