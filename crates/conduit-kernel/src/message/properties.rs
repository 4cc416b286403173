//! Scoped message properties.
//!
//! Every [`Envelope`](super::Envelope) carries four disjoint property
//! namespaces. A name set in one scope is never visible through a lookup in
//! another scope; callers that want a fallback must spell out the scope order
//! explicitly via [`Properties::find_first`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Property namespace on an envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyScope {
    /// Set by the transport / ingress boundary. Read-mostly downstream.
    Inbound,
    /// Destined for the next hop when the message leaves the process.
    Outbound,
    /// Lives for a single flow invocation.
    Invocation,
    /// Survives across invocations that share a session.
    Session,
}

impl PropertyScope {
    /// All scopes, in lookup-priority order.
    pub const ALL: [PropertyScope; 4] = [
        PropertyScope::Inbound,
        PropertyScope::Outbound,
        PropertyScope::Invocation,
        PropertyScope::Session,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyScope::Inbound => "inbound",
            PropertyScope::Outbound => "outbound",
            PropertyScope::Invocation => "invocation",
            PropertyScope::Session => "session",
        }
    }
}

impl fmt::Display for PropertyScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four property maps of an envelope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Properties {
    #[serde(default)]
    inbound: HashMap<String, Value>,
    #[serde(default)]
    outbound: HashMap<String, Value>,
    #[serde(default)]
    invocation: HashMap<String, Value>,
    #[serde(default)]
    session: HashMap<String, Value>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    fn scope(&self, scope: PropertyScope) -> &HashMap<String, Value> {
        match scope {
            PropertyScope::Inbound => &self.inbound,
            PropertyScope::Outbound => &self.outbound,
            PropertyScope::Invocation => &self.invocation,
            PropertyScope::Session => &self.session,
        }
    }

    fn scope_mut(&mut self, scope: PropertyScope) -> &mut HashMap<String, Value> {
        match scope {
            PropertyScope::Inbound => &mut self.inbound,
            PropertyScope::Outbound => &mut self.outbound,
            PropertyScope::Invocation => &mut self.invocation,
            PropertyScope::Session => &mut self.session,
        }
    }

    /// Look up `name` in exactly one scope.
    pub fn get(&self, scope: PropertyScope, name: &str) -> Option<&Value> {
        self.scope(scope).get(name)
    }

    /// Look up `name` as a string slice. Non-string values yield `None`.
    pub fn get_str(&self, scope: PropertyScope, name: &str) -> Option<&str> {
        self.get(scope, name).and_then(Value::as_str)
    }

    /// Set `name` in `scope`, returning the previous value if any.
    pub fn set(
        &mut self,
        scope: PropertyScope,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Option<Value> {
        self.scope_mut(scope).insert(name.into(), value.into())
    }

    pub fn remove(&mut self, scope: PropertyScope, name: &str) -> Option<Value> {
        self.scope_mut(scope).remove(name)
    }

    pub fn contains(&self, scope: PropertyScope, name: &str) -> bool {
        self.scope(scope).contains_key(name)
    }

    /// Names present in `scope`, in no particular order.
    pub fn names(&self, scope: PropertyScope) -> impl Iterator<Item = &str> {
        self.scope(scope).keys().map(String::as_str)
    }

    pub fn len(&self, scope: PropertyScope) -> usize {
        self.scope(scope).len()
    }

    pub fn is_empty(&self, scope: PropertyScope) -> bool {
        self.scope(scope).is_empty()
    }

    /// Search `scopes` in the given order and return the first hit together
    /// with the scope it was found in.
    pub fn find_first(
        &self,
        name: &str,
        scopes: &[PropertyScope],
    ) -> Option<(PropertyScope, &Value)> {
        scopes
            .iter()
            .find_map(|scope| self.get(*scope, name).map(|v| (*scope, v)))
    }

    /// Drop every property in `scope`.
    pub fn clear(&mut self, scope: PropertyScope) {
        self.scope_mut(scope).clear();
    }
}
