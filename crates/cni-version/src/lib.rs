//! CNI protocol version handling.
//!
//! A network configuration declares the protocol revision it was written
//! against in its `cniVersion` field; a plugin declares the revisions it
//! understands as [`PluginCapabilities`]. This crate decodes the former,
//! orders versions, and reconciles the two.
//!
//! ```
//! use cni_version::{ConfigDecoder, JsonConfigDecoder, PluginCapabilities, Reconciler, ExactReconciler};
//!
//! let caps = PluginCapabilities::supports(["0.4.0", "1.0.0"]);
//! let version = JsonConfigDecoder.decode(br#"{"cniVersion":"1.0.0","name":"net1"}"#)?;
//! assert!(ExactReconciler.check(&version, &caps).is_ok());
//! # Ok::<(), cni_version::VersionError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod decode;
mod error;
mod plugin;
mod reconcile;
mod version;

pub use decode::{ConfigDecoder, JsonConfigDecoder};
pub use error::VersionError;
pub use plugin::PluginCapabilities;
pub use reconcile::{ExactReconciler, Incompatible, Reconciler};
pub use version::{ProtocolVersion, greater_than_or_equal_to};

/// The protocol revision this library implements.
pub const CURRENT: &str = "1.1.0";

/// Every protocol revision ever published, oldest first.
pub const ALL: &[&str] = &["0.1.0", "0.2.0", "0.3.0", "0.3.1", "0.4.0", "1.0.0", "1.1.0"];

/// Revisions that predate structured results.
pub const LEGACY: &[&str] = &["0.1.0", "0.2.0"];

/// The version assumed when a configuration declares none.
pub const IMPLICIT: &str = "0.1.0";

/// Lowest revision that defines the CHECK command.
pub const CHECK_MIN_VERSION: &str = "0.4.0";

/// Lowest revision that defines the GC command.
pub const GC_MIN_VERSION: &str = "1.1.0";
