//! Protocol error-code lookup contract.

/// Maps an error kind to a protocol-specific code.
///
/// A missing mapping is a normal outcome, not an error.
pub trait ErrorCodeMapping: Send + Sync {
    /// Code for `error_kind` (see [`StageError::kind`](crate::stage::StageError::kind))
    /// under `protocol`.
    fn error_code(&self, protocol: &str, error_kind: &str) -> Option<String>;

    /// Name of the OUTBOUND property the code is stamped into.
    fn property_name(&self, protocol: &str) -> String {
        default_property_name(protocol)
    }
}

/// `<protocol>.error.code`
pub fn default_property_name(protocol: &str) -> String {
    format!("{protocol}.error.code")
}
