//! Table-driven protocol error codes.
//!
//! ```yaml
//! protocols:
//!   http:
//!     property: http.status
//!     codes:
//!       security_unauthenticated: "401"
//!       mime_type_mismatch: "415"
//! ```
//!
//! Keys under `codes` are [`StageError::kind`](conduit_kernel::stage::StageError::kind)
//! values. `property` defaults to `<protocol>.error.code`.

use conduit_kernel::config;
use conduit_kernel::error::{KernelError, KernelResult};
use conduit_kernel::error_code::{ErrorCodeMapping, default_property_name};
use error_stack::{Report, ResultExt};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolCodes {
    /// Outbound property the code is stamped into.
    #[serde(default)]
    pub property: Option<String>,
    #[serde(default)]
    pub codes: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorCodeMappingConfig {
    #[serde(default)]
    pub protocols: HashMap<String, ProtocolCodes>,
}

impl ErrorCodeMappingConfig {
    /// Load from a YAML, TOML or JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> KernelResult<Self> {
        let path = path.as_ref();
        config::load_config(path)
            .map_err(KernelError::from)
            .map_err(Report::new)
            .attach(format!("loading error-code mappings from {}", path.display()))
    }
}

/// In-memory [`ErrorCodeMapping`].
#[derive(Debug, Clone, Default)]
pub struct StaticErrorCodeMapping {
    config: ErrorCodeMappingConfig,
}

impl StaticErrorCodeMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: ErrorCodeMappingConfig) -> Self {
        Self { config }
    }

    pub fn from_file(path: impl AsRef<Path>) -> KernelResult<Self> {
        ErrorCodeMappingConfig::from_file(path).map(Self::from_config)
    }

    pub fn with_code(
        mut self,
        protocol: impl Into<String>,
        error_kind: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        self.config
            .protocols
            .entry(protocol.into())
            .or_default()
            .codes
            .insert(error_kind.into(), code.into());
        self
    }

    pub fn with_property(mut self, protocol: impl Into<String>, property: impl Into<String>) -> Self {
        self.config
            .protocols
            .entry(protocol.into())
            .or_default()
            .property = Some(property.into());
        self
    }
}

impl ErrorCodeMapping for StaticErrorCodeMapping {
    fn error_code(&self, protocol: &str, error_kind: &str) -> Option<String> {
        self.config
            .protocols
            .get(protocol)?
            .codes
            .get(error_kind)
            .cloned()
    }

    fn property_name(&self, protocol: &str) -> String {
        self.config
            .protocols
            .get(protocol)
            .and_then(|p| p.property.clone())
            .unwrap_or_else(|| default_property_name(protocol))
    }
}
