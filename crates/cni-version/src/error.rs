//! Version decoding errors.

use thiserror::Error;

/// Errors raised while decoding or comparing protocol versions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    /// The version token has more than three dot-separated parts.
    #[error("invalid version {0:?}: too many parts")]
    TooManyParts(String),

    /// A version part is not a non-negative integer.
    #[error("failed to convert {part} version part {value:?}")]
    InvalidPart {
        /// Which part failed (`major`, `minor` or `micro`).
        part: &'static str,
        /// The offending text.
        value: String,
    },

    /// The network configuration could not be parsed.
    #[error("decoding version from network config: {0}")]
    Config(String),

    /// A plugin's version report could not be parsed.
    #[error("decoding version info: {0}")]
    PluginInfo(String),
}
