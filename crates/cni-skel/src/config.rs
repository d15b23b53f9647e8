//! Minimal validation of the stdin network configuration.

use cni_types::{CniError, ErrorCode, validate_network_name};
use serde_json::Value;

fn decoding_failure(detail: impl std::fmt::Display) -> CniError {
    CniError::new(
        ErrorCode::DecodingFailure,
        format!("error unmarshall network config: {detail}"),
    )
}

/// Check that the configuration is JSON with a valid, non-empty `name`.
///
/// Nothing else in the configuration is interpreted here; the plugin's
/// handlers parse the full document themselves. Repeated keys keep their
/// last value and a `null` document reads as having no fields.
///
/// # Errors
///
/// - [`ErrorCode::DecodingFailure`] if the bytes are not a JSON object or
///   `name` is not a string
/// - [`ErrorCode::InvalidNetworkConfig`] if `name` is absent, empty, or has
///   invalid characters
pub fn validate_config(config: &[u8]) -> Result<(), CniError> {
    let doc: Value = serde_json::from_slice(config).map_err(decoding_failure)?;
    let name = match &doc {
        Value::Null => None,
        Value::Object(fields) => fields.get("name"),
        other => return Err(decoding_failure(format!("expected an object, got {other}"))),
    };
    let name = match name {
        None | Some(Value::Null) => "",
        Some(Value::String(name)) => name.as_str(),
        Some(other) => {
            return Err(decoding_failure(format!("name must be a string, got {other}")));
        }
    };

    if name.is_empty() {
        return Err(CniError::new(
            ErrorCode::InvalidNetworkConfig,
            "missing network name",
        ));
    }
    validate_network_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(br#"{"cniVersion":"1.0.0","name":"net1","type":"bridge"}"# ; "plain")]
    #[test_case(br#"{"name":"bad name!","name":"net1"}"# ; "repeated name keeps last")]
    #[test_case(br#"{"name":"net1","extra":[1,{"a":null}]}"# ; "unknown fields ignored")]
    fn test_valid_config(config: &[u8]) {
        assert!(validate_config(config).is_ok());
    }

    #[test_case(br#"{"name":""}"# ; "empty name")]
    #[test_case(br#"{"cniVersion":"1.0.0"}"# ; "absent name")]
    #[test_case(br#"{"name":null}"# ; "null name")]
    #[test_case(b"null" ; "null document")]
    #[test_case(br#"{"name":"net1","name":""}"# ; "repeated name last empty")]
    fn test_missing_name(config: &[u8]) {
        let err = validate_config(config).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidNetworkConfig);
        assert_eq!(err.msg, "missing network name");
    }

    #[test_case(b"" ; "empty input")]
    #[test_case(b"not json" ; "garbage")]
    #[test_case(br#"{"name":42}"# ; "numeric name")]
    #[test_case(br#"["net1"]"# ; "array document")]
    #[test_case(b"\"net1\"" ; "string document")]
    fn test_decoding_failure(config: &[u8]) {
        let err = validate_config(config).unwrap_err();
        assert_eq!(err.code, ErrorCode::DecodingFailure);
    }

    #[test]
    fn test_invalid_name_syntax() {
        let err = validate_config(br#"{"name":"bad name!"}"#).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidNetworkConfig);
        assert_eq!(err.msg, "invalid characters found in network name");
    }
}
