//! The structured error reported by a plugin to the container runtime.

use std::fmt;
use std::io::{self, Write};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Well-known error codes shared by all CNI runtimes and plugins.
///
/// Codes `0..=99` are reserved by the protocol. The numeric value is what
/// goes over the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum ErrorCode {
    /// Unclassified failure.
    Unknown,
    /// The network config version is not supported by the plugin.
    IncompatibleCniVersion,
    /// A config field is not supported by the plugin.
    UnsupportedField,
    /// The container does not exist or is not known to the plugin.
    UnknownContainer,
    /// A required environment variable is missing or invalid.
    InvalidEnvironmentVariables,
    /// Reading stdin or writing stdout/stderr failed.
    IoFailure,
    /// The network config or a version token could not be decoded.
    DecodingFailure,
    /// The network config is structurally valid but semantically wrong.
    InvalidNetworkConfig,
    /// The target network namespace is unusable.
    InvalidNetNs,
    /// The operation may succeed if retried later.
    TryAgainLater,
    /// The plugin is not ready to serve requests.
    PluginNotAvailable,
    /// Networking is available but degraded.
    LimitedConnectivity,
    /// Networking is not available.
    NoConnectivity,
    /// Opaque failure inside the plugin.
    Internal,
}

impl ErrorCode {
    /// Returns the numeric wire value.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        match self {
            Self::Unknown => 0,
            Self::IncompatibleCniVersion => 1,
            Self::UnsupportedField => 2,
            Self::UnknownContainer => 3,
            Self::InvalidEnvironmentVariables => 4,
            Self::IoFailure => 5,
            Self::DecodingFailure => 6,
            Self::InvalidNetworkConfig => 7,
            Self::InvalidNetNs => 8,
            Self::TryAgainLater => 11,
            Self::PluginNotAvailable => 50,
            Self::LimitedConnectivity => 51,
            Self::NoConnectivity => 52,
            Self::Internal => 999,
        }
    }
}

impl TryFrom<u32> for ErrorCode {
    type Error = String;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        let code = match code {
            0 => Self::Unknown,
            1 => Self::IncompatibleCniVersion,
            2 => Self::UnsupportedField,
            3 => Self::UnknownContainer,
            4 => Self::InvalidEnvironmentVariables,
            5 => Self::IoFailure,
            6 => Self::DecodingFailure,
            7 => Self::InvalidNetworkConfig,
            8 => Self::InvalidNetNs,
            11 => Self::TryAgainLater,
            50 => Self::PluginNotAvailable,
            51 => Self::LimitedConnectivity,
            52 => Self::NoConnectivity,
            999 => Self::Internal,
            other => return Err(format!("unknown CNI error code {other}")),
        };
        Ok(code)
    }
}

impl From<ErrorCode> for u32 {
    fn from(code: ErrorCode) -> Self {
        code.as_u32()
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u32())
    }
}

/// Error returned by a plugin invocation.
///
/// Serializes as `{"code": .., "msg": .., "details": ..}` with `details`
/// omitted when empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{}", render(.msg, .details))]
pub struct CniError {
    /// Error classification.
    pub code: ErrorCode,
    /// Short human-readable message.
    pub msg: String,
    /// Optional longer explanation.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub details: String,
}

fn render(msg: &str, details: &str) -> String {
    if details.is_empty() {
        msg.to_string()
    } else {
        format!("{msg}; {details}")
    }
}

impl CniError {
    /// Create an error without details.
    #[must_use]
    pub fn new(code: ErrorCode, msg: impl Into<String>) -> Self {
        Self {
            code,
            msg: msg.into(),
            details: String::new(),
        }
    }

    /// Set the details string.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = details.into();
        self
    }

    /// Create an internal error from an opaque failure message.
    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, msg)
    }

    /// Check whether this error carries the given code.
    #[must_use]
    pub fn is(&self, code: ErrorCode) -> bool {
        self.code == code
    }

    /// Write the error as indented JSON followed by a newline.
    pub fn print_to<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut *out, self)?;
        out.write_all(b"\n")?;
        out.flush()
    }

    /// Write the error as JSON to the process's stdout.
    pub fn print(&self) -> io::Result<()> {
        self.print_to(&mut io::stdout().lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(ErrorCode::IncompatibleCniVersion, 1)]
    #[test_case(ErrorCode::InvalidEnvironmentVariables, 4)]
    #[test_case(ErrorCode::IoFailure, 5)]
    #[test_case(ErrorCode::DecodingFailure, 6)]
    #[test_case(ErrorCode::InvalidNetworkConfig, 7)]
    #[test_case(ErrorCode::InvalidNetNs, 8)]
    #[test_case(ErrorCode::TryAgainLater, 11)]
    #[test_case(ErrorCode::Internal, 999)]
    fn test_error_code_wire_value(code: ErrorCode, expected: u32) {
        assert_eq!(code.as_u32(), expected);
        assert_eq!(ErrorCode::try_from(expected), Ok(code));
    }

    #[test]
    fn test_unknown_wire_code_rejected() {
        assert!(ErrorCode::try_from(9).is_err());
        assert!(ErrorCode::try_from(1000).is_err());
    }

    #[test]
    fn test_display_without_details() {
        let err = CniError::new(ErrorCode::InvalidNetworkConfig, "missing network name");
        assert_eq!(err.to_string(), "missing network name");
    }

    #[test]
    fn test_display_with_details() {
        let err = CniError::new(ErrorCode::IncompatibleCniVersion, "incompatible CNI versions")
            .with_details("config is \"9.9.9\"");
        assert_eq!(
            err.to_string(),
            "incompatible CNI versions; config is \"9.9.9\""
        );
    }

    #[test]
    fn test_json_omits_empty_details() {
        let err = CniError::new(ErrorCode::IoFailure, "broken pipe");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json, serde_json::json!({"code": 5, "msg": "broken pipe"}));
    }

    #[test]
    fn test_json_includes_details() {
        let err = CniError::new(ErrorCode::InvalidEnvironmentVariables, "invalid characters in containerID")
            .with_details("bad id!");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], 4);
        assert_eq!(json["details"], "bad id!");
    }

    #[test]
    fn test_json_parse_rejects_unknown_code() {
        let parsed: Result<CniError, _> = serde_json::from_str(r#"{"code":12345,"msg":"x"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_print_to_writes_parseable_json() {
        let err = CniError::internal("handler exploded");
        let mut out = Vec::new();
        err.print_to(&mut out).unwrap();

        assert!(out.ends_with(b"\n"));
        let parsed: CniError = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed, err);
        assert!(parsed.is(ErrorCode::Internal));
    }
}
