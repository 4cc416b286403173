//! Token authentication filter.
//!
//! Accepts envelopes that carry a known token in an INBOUND property
//! (`Authorization` by default), either raw or as `Bearer <token>`.

use async_trait::async_trait;
use conduit_kernel::message::{Envelope, PropertyScope, names};
use conduit_kernel::security::{SecurityError, SecurityFilter};
use std::collections::HashMap;

/// Default INBOUND property carrying the token.
pub const DEFAULT_TOKEN_PROPERTY: &str = "Authorization";

/// Filter backed by a fixed token table.
#[derive(Debug, Clone)]
pub struct HeaderTokenFilter {
    property: String,
    /// token -> principal
    tokens: HashMap<String, String>,
}

impl HeaderTokenFilter {
    /// Each token is its own principal.
    pub fn new(tokens: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::with_principals(tokens.into_iter().map(|t| {
            let t = t.into();
            (t.clone(), t)
        }))
    }

    /// Tokens mapped to the principal they authenticate.
    pub fn with_principals(
        tokens: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>,
    ) -> Self {
        Self {
            property: DEFAULT_TOKEN_PROPERTY.to_string(),
            tokens: tokens
                .into_iter()
                .map(|(token, principal)| (token.into(), principal.into()))
                .collect(),
        }
    }

    /// Read the token from `property` instead of `Authorization`.
    pub fn with_property(mut self, property: impl Into<String>) -> Self {
        self.property = property.into();
        self
    }

    fn extract_token<'a>(&self, envelope: &'a Envelope) -> Option<&'a str> {
        let raw = envelope
            .property_str(&self.property, PropertyScope::Inbound)?
            .trim();
        // The scheme is case-insensitive and must stand alone as a word.
        let token = match raw.split_once(char::is_whitespace) {
            Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
            None if raw.eq_ignore_ascii_case("bearer") => "",
            _ => raw,
        };
        (!token.is_empty()).then_some(token)
    }
}

#[async_trait]
impl SecurityFilter for HeaderTokenFilter {
    fn name(&self) -> &str {
        "header-token"
    }

    async fn authenticate(&self, envelope: &mut Envelope) -> Result<(), SecurityError> {
        let token = self
            .extract_token(envelope)
            .ok_or(SecurityError::CredentialsNotSet)?;
        let principal = self
            .tokens
            .get(token)
            .cloned()
            .ok_or_else(|| SecurityError::unauthenticated("unknown token"))?;

        envelope.set_property(names::SECURITY_PRINCIPAL, principal, PropertyScope::Session);
        Ok(())
    }
}
