//! Syntax validation for container ids, interface names and network names.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::MAX_INTERFACE_NAME_LENGTH;
use crate::error::{CniError, ErrorCode};

/// Container ids and network names: alphanumeric start, then alphanumeric,
/// underscore, dot or hyphen.
static NAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9_.\-]*$").unwrap_or_else(|_| unreachable!()));

/// Validate the `CNI_CONTAINERID` value.
///
/// # Errors
///
/// Returns [`ErrorCode::UnknownContainer`] when empty and
/// [`ErrorCode::InvalidEnvironmentVariables`] when it has invalid characters.
pub fn validate_container_id(container_id: &str) -> Result<(), CniError> {
    if container_id.is_empty() {
        return Err(CniError::new(ErrorCode::UnknownContainer, "missing containerID"));
    }
    if !NAME_REGEX.is_match(container_id) {
        return Err(CniError::new(
            ErrorCode::InvalidEnvironmentVariables,
            "invalid characters in containerID",
        )
        .with_details(container_id));
    }
    Ok(())
}

/// Validate the `name` field of a network configuration.
///
/// # Errors
///
/// Returns [`ErrorCode::InvalidNetworkConfig`] when the name is empty or has
/// invalid characters.
pub fn validate_network_name(network_name: &str) -> Result<(), CniError> {
    if network_name.is_empty() {
        return Err(CniError::new(
            ErrorCode::InvalidNetworkConfig,
            "missing network name:",
        ));
    }
    if !NAME_REGEX.is_match(network_name) {
        return Err(CniError::new(
            ErrorCode::InvalidNetworkConfig,
            "invalid characters found in network name",
        )
        .with_details(network_name));
    }
    Ok(())
}

/// Validate the `CNI_IFNAME` value against kernel interface naming rules.
///
/// # Errors
///
/// Returns [`ErrorCode::InvalidEnvironmentVariables`] on any violation.
pub fn validate_interface_name(if_name: &str) -> Result<(), CniError> {
    let invalid = |msg: &str| CniError::new(ErrorCode::InvalidEnvironmentVariables, msg);

    if if_name.is_empty() {
        return Err(invalid("interface name is empty"));
    }
    if if_name.len() > MAX_INTERFACE_NAME_LENGTH {
        return Err(invalid("interface name is too long").with_details(format!(
            "interface name should be less than {} characters",
            MAX_INTERFACE_NAME_LENGTH + 1
        )));
    }
    if if_name == "." || if_name == ".." {
        return Err(invalid("interface name is . or .."));
    }
    if if_name
        .chars()
        .any(|c| c == '/' || c == ':' || c.is_whitespace())
    {
        return Err(invalid(
            "interface name contains / or : or whitespace characters",
        ));
    }
    Ok(())
}
