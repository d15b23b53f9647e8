//! Shared CNI types: the structured plugin error and identifier validation.
//!
//! Every failure a plugin reports to the container runtime is a [`CniError`]
//! carrying one of the well-known [`ErrorCode`] values. The error serializes
//! to the JSON object runtimes expect on stdout:
//!
//! ```
//! use cni_types::{CniError, ErrorCode};
//!
//! let err = CniError::new(ErrorCode::InvalidNetworkConfig, "missing network name");
//! let json = serde_json::to_string(&err)?;
//! assert_eq!(json, r#"{"code":7,"msg":"missing network name"}"#);
//! # Ok::<(), serde_json::Error>(())
//! ```
//!
//! # Validation
//!
//! ```
//! use cni_types::{validate_container_id, validate_interface_name};
//!
//! assert!(validate_container_id("3f2a9c1d-pod").is_ok());
//! assert!(validate_container_id("bad id!").is_err());
//! assert!(validate_interface_name("eth0").is_ok());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod validate;

pub use error::{CniError, ErrorCode};
pub use validate::{validate_container_id, validate_interface_name, validate_network_name};

/// Maximum interface name length (`IFNAMSIZ` minus the trailing NUL).
pub const MAX_INTERFACE_NAME_LENGTH: usize = 15;
