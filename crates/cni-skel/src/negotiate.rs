//! Version negotiation between the configuration and the plugin.

use cni_types::{CniError, ErrorCode};
use cni_version::{
    CHECK_MIN_VERSION, ConfigDecoder, GC_MIN_VERSION, PluginCapabilities, ProtocolVersion,
    Reconciler, VersionError, greater_than_or_equal_to,
};
use tracing::{debug, warn};

use crate::args::CmdArgs;
use crate::dispatch::Handler;

/// A command that only exists from a given protocol revision onward.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Gate {
    verb: &'static str,
    min_version: &'static str,
}

pub(crate) const CHECK_GATE: Gate = Gate {
    verb: "CHECK",
    min_version: CHECK_MIN_VERSION,
};

pub(crate) const GC_GATE: Gate = Gate {
    verb: "GC",
    min_version: GC_MIN_VERSION,
};

fn decoding(err: &VersionError) -> CniError {
    CniError::new(ErrorCode::DecodingFailure, err.to_string())
}

fn incompatible(msg: impl Into<String>) -> CniError {
    CniError::new(ErrorCode::IncompatibleCniVersion, msg)
}

/// Decodes configuration versions and reconciles them with a plugin.
pub(crate) struct Negotiator<'d> {
    decoder: &'d dyn ConfigDecoder,
    reconciler: &'d dyn Reconciler,
}

impl<'d> Negotiator<'d> {
    pub(crate) fn new(decoder: &'d dyn ConfigDecoder, reconciler: &'d dyn Reconciler) -> Self {
        Self {
            decoder,
            reconciler,
        }
    }

    fn config_version(&self, args: &CmdArgs) -> Result<ProtocolVersion, CniError> {
        self.decoder
            .decode(&args.stdin_data)
            .map_err(|e| decoding(&e))
    }

    /// Reconcile the configuration's version with the plugin, then run the
    /// handler.
    pub(crate) fn check_version_and_call(
        &self,
        args: &CmdArgs,
        plugin: &PluginCapabilities,
        handler: Option<&Handler>,
    ) -> Result<(), CniError> {
        let config_version = self.config_version(args)?;
        if let Err(incompat) = self.reconciler.check(&config_version, plugin) {
            debug!(%config_version, "configuration version not supported by plugin");
            return Err(incompatible("incompatible CNI versions").with_details(incompat.details()));
        }

        call(handler, args)
    }

    /// Enforce the command's minimum revision and require a supported
    /// version at or above the configuration's before the general check.
    ///
    /// The first supported version in declaration order wins.
    pub(crate) fn check_gated_and_call(
        &self,
        args: &CmdArgs,
        plugin: &PluginCapabilities,
        gate: Gate,
        handler: Option<&Handler>,
    ) -> Result<(), CniError> {
        let config_version = self.config_version(args)?;
        let allowed = greater_than_or_equal_to(&config_version, gate.min_version)
            .map_err(|e| decoding(&e))?;
        if !allowed {
            return Err(incompatible(format!(
                "config version does not allow {}",
                gate.verb
            )));
        }

        for plugin_version in plugin.supported_versions() {
            let satisfies = greater_than_or_equal_to(plugin_version, &config_version)
                .map_err(|e| decoding(&e))?;
            if satisfies {
                debug!(%config_version, %plugin_version, verb = gate.verb, "selected plugin version");
                return self.check_version_and_call(args, plugin, handler);
            }
        }

        Err(incompatible(format!(
            "plugin version does not allow {}",
            gate.verb
        )))
    }
}

/// Run a handler, keeping a [`CniError`] it returns and classifying any
/// other failure as internal.
fn call(handler: Option<&Handler>, args: &CmdArgs) -> Result<(), CniError> {
    let Some(handler) = handler else {
        return Ok(());
    };
    handler(args).map_err(|err| match err.downcast::<CniError>() {
        Ok(cni_err) => cni_err,
        Err(other) => {
            let msg = format!("{other:#}");
            warn!(error = %msg, "handler failed");
            CniError::internal(msg)
        }
    })
}
