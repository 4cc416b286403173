//! Ready-made route predicates.

use conduit_kernel::message::{Envelope, PropertyScope};
use conduit_kernel::routing::Matchable;
use regex::Regex;
use serde_json::Value;

/// Accepts every envelope.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysMatch;

impl Matchable for AlwaysMatch {
    fn is_match(&self, _envelope: &mut Envelope) -> bool {
        true
    }
}

/// Accepts envelopes whose property equals a fixed value in one scope.
#[derive(Debug, Clone)]
pub struct PropertyEquals {
    scope: PropertyScope,
    name: String,
    value: Value,
}

impl PropertyEquals {
    pub fn new(scope: PropertyScope, name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            scope,
            name: name.into(),
            value: value.into(),
        }
    }
}

impl Matchable for PropertyEquals {
    fn is_match(&self, envelope: &mut Envelope) -> bool {
        envelope.property(&self.name, self.scope) == Some(&self.value)
    }
}

/// Accepts envelopes whose payload, rendered as text, matches a regex.
#[derive(Debug, Clone)]
pub struct PayloadRegex {
    regex: Regex,
}

impl PayloadRegex {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
        })
    }
}

impl Matchable for PayloadRegex {
    fn is_match(&self, envelope: &mut Envelope) -> bool {
        self.regex.is_match(&envelope.payload_as_string())
    }
}
