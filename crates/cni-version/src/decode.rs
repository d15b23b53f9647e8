//! Extracting the declared protocol version from a network configuration.

use serde_json::Value;

use crate::IMPLICIT;
use crate::error::VersionError;
use crate::version::ProtocolVersion;

/// Decodes the protocol version a network configuration was written for.
pub trait ConfigDecoder {
    /// Decode the version from raw configuration bytes.
    ///
    /// # Errors
    ///
    /// Returns [`VersionError::Config`] if the bytes are not a valid config.
    fn decode(&self, config: &[u8]) -> Result<ProtocolVersion, VersionError>;
}

/// Reads the `cniVersion` field of a JSON network configuration.
///
/// A repeated `cniVersion` key keeps its last value; an absent, `null` or
/// empty one means [`IMPLICIT`].
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonConfigDecoder;

impl ConfigDecoder for JsonConfigDecoder {
    fn decode(&self, config: &[u8]) -> Result<ProtocolVersion, VersionError> {
        let doc: Value =
            serde_json::from_slice(config).map_err(|e| VersionError::Config(e.to_string()))?;
        let field = match &doc {
            Value::Null => None,
            Value::Object(fields) => fields.get("cniVersion"),
            other => {
                return Err(VersionError::Config(format!(
                    "expected an object, got {other}"
                )));
            }
        };
        match field {
            None | Some(Value::Null) => Ok(ProtocolVersion::from(IMPLICIT)),
            Some(Value::String(version)) if version.is_empty() => {
                Ok(ProtocolVersion::from(IMPLICIT))
            }
            Some(Value::String(version)) => Ok(ProtocolVersion::from(version.as_str())),
            Some(other) => Err(VersionError::Config(format!(
                "cniVersion must be a string, got {other}"
            ))),
        }
    }
}
