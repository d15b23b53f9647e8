//! A plugin's declared protocol support, as reported by the VERSION command.

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::error::VersionError;
use crate::version::ProtocolVersion;
use crate::{ALL, CURRENT, LEGACY};

/// Protocol versions a plugin supports, in declaration order.
///
/// The order is significant: CHECK and GC negotiation pick the first entry
/// that satisfies the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginCapabilities {
    /// Protocol revision of the code producing this report.
    #[serde(default)]
    pub cni_version: String,
    /// Supported protocol versions.
    #[serde(default)]
    pub supported_versions: Vec<ProtocolVersion>,
}

impl PluginCapabilities {
    /// Declare support for the given versions.
    #[must_use]
    pub fn supports<I, V>(versions: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ProtocolVersion>,
    {
        Self {
            cni_version: CURRENT.to_string(),
            supported_versions: versions.into_iter().map(Into::into).collect(),
        }
    }

    /// Support every published protocol revision.
    #[must_use]
    pub fn all() -> Self {
        Self::supports(ALL.iter().copied())
    }

    /// Support only the pre-result-type revisions.
    #[must_use]
    pub fn legacy() -> Self {
        Self::supports(LEGACY.iter().copied())
    }

    /// Supported versions in declaration order.
    #[must_use]
    pub fn supported_versions(&self) -> &[ProtocolVersion] {
        &self.supported_versions
    }

    /// Write the report as a single JSON line.
    pub fn encode<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        serde_json::to_writer(&mut *out, self)?;
        out.write_all(b"\n")?;
        out.flush()
    }

    /// Parse a report previously produced by [`encode`](Self::encode).
    ///
    /// A report without `supportedVersions` is accepted only from a 0.2.0
    /// plugin, which implicitly supports 0.1.0 and 0.2.0.
    ///
    /// # Errors
    ///
    /// Returns [`VersionError::PluginInfo`] on malformed or incomplete input.
    pub fn decode(bytes: &[u8]) -> Result<Self, VersionError> {
        let info: Self =
            serde_json::from_slice(bytes).map_err(|e| VersionError::PluginInfo(e.to_string()))?;
        if info.cni_version.is_empty() {
            return Err(VersionError::PluginInfo("missing field cniVersion".to_string()));
        }
        if info.supported_versions.is_empty() {
            if info.cni_version == "0.2.0" {
                return Ok(Self {
                    cni_version: info.cni_version,
                    supported_versions: LEGACY.iter().copied().map(Into::into).collect(),
                });
            }
            return Err(VersionError::PluginInfo(
                "missing field supportedVersions".to_string(),
            ));
        }
        Ok(info)
    }
}
