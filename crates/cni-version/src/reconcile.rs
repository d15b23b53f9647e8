//! Reconciling a configuration's version with what a plugin supports.

use std::fmt;

use crate::plugin::PluginCapabilities;
use crate::version::ProtocolVersion;

/// The configuration's version is not among the plugin's supported versions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Incompatible {
    /// Version declared by the configuration.
    pub config: ProtocolVersion,
    /// Versions declared by the plugin.
    pub supported: Vec<ProtocolVersion>,
}

impl Incompatible {
    /// Human-readable explanation, e.g.
    /// `config is "1.0.0", plugin supports ["0.3.1" "0.4.0"]`.
    #[must_use]
    pub fn details(&self) -> String {
        let supported = self
            .supported
            .iter()
            .map(|v| format!("{:?}", v.as_str()))
            .collect::<Vec<_>>()
            .join(" ");
        format!("config is {:?}, plugin supports [{supported}]", self.config.as_str())
    }
}

impl fmt::Display for Incompatible {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.details())
    }
}

/// Decides whether a plugin can serve a configuration of a given version.
pub trait Reconciler {
    /// Check `config` against the plugin's capabilities.
    ///
    /// # Errors
    ///
    /// Returns [`Incompatible`] when the plugin cannot serve the version.
    fn check(
        &self,
        config: &ProtocolVersion,
        plugin: &PluginCapabilities,
    ) -> Result<(), Incompatible>;
}

/// Accepts a configuration only if its exact version token is supported.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactReconciler;

impl ExactReconciler {
    /// Check against a raw list of supported versions.
    pub fn check_raw(
        &self,
        config: &ProtocolVersion,
        supported: &[ProtocolVersion],
    ) -> Result<(), Incompatible> {
        if supported.contains(config) {
            return Ok(());
        }
        Err(Incompatible {
            config: config.clone(),
            supported: supported.to_vec(),
        })
    }
}

impl Reconciler for ExactReconciler {
    fn check(
        &self,
        config: &ProtocolVersion,
        plugin: &PluginCapabilities,
    ) -> Result<(), Incompatible> {
        self.check_raw(config, plugin.supported_versions())
    }
}
