//! The command dispatcher: one invocation from environment to outcome.

use std::fmt;
use std::io::{self, Read, Write};

use cni_types::{CniError, ErrorCode};
use cni_version::{
    ConfigDecoder, ExactReconciler, JsonConfigDecoder, PluginCapabilities, ProtocolVersion,
    Reconciler,
};
use tracing::{debug, info};

use crate::args::{CNI_COMMAND, CmdArgs, Command, cmd_args_from_env};
use crate::env::{Environment, ProcessEnv};
use crate::negotiate::{CHECK_GATE, GC_GATE, Negotiator};
use crate::netns::{NamespaceIdentity, ThreadNetNs};

/// A command handler supplied by the plugin.
///
/// Returning a [`CniError`] (via `anyhow`) reports it unchanged; any other
/// error is reported as [`ErrorCode::Internal`].
pub type Handler = Box<dyn Fn(&CmdArgs) -> anyhow::Result<()>>;

/// The plugin's handlers, one per command. Absent handlers succeed without
/// doing anything.
#[derive(Default)]
pub struct PluginFuncs {
    add: Option<Handler>,
    check: Option<Handler>,
    del: Option<Handler>,
    gc: Option<Handler>,
}

impl PluginFuncs {
    /// No handlers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the ADD handler.
    #[must_use]
    pub fn add(mut self, f: impl Fn(&CmdArgs) -> anyhow::Result<()> + 'static) -> Self {
        self.add = Some(Box::new(f));
        self
    }

    /// Set the CHECK handler.
    #[must_use]
    pub fn check(mut self, f: impl Fn(&CmdArgs) -> anyhow::Result<()> + 'static) -> Self {
        self.check = Some(Box::new(f));
        self
    }

    /// Set the DEL handler.
    #[must_use]
    pub fn del(mut self, f: impl Fn(&CmdArgs) -> anyhow::Result<()> + 'static) -> Self {
        self.del = Some(Box::new(f));
        self
    }

    /// Set the GC handler.
    #[must_use]
    pub fn gc(mut self, f: impl Fn(&CmdArgs) -> anyhow::Result<()> + 'static) -> Self {
        self.gc = Some(Box::new(f));
        self
    }
}

impl fmt::Debug for PluginFuncs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginFuncs")
            .field("add", &self.add.is_some())
            .field("check", &self.check.is_some())
            .field("del", &self.del.is_some())
            .field("gc", &self.gc.is_some())
            .finish()
    }
}

/// The capabilities one invocation runs against: environment, standard
/// streams and the version/namespace collaborators.
///
/// Built once at the entry point. Tests substitute in-memory fakes through
/// [`Dispatcher::new`] and the `with_*` methods.
pub struct Dispatcher<'a> {
    env: Box<dyn Environment + 'a>,
    stdin: Box<dyn Read + 'a>,
    stdout: Box<dyn Write + 'a>,
    stderr: Box<dyn Write + 'a>,
    config_decoder: Box<dyn ConfigDecoder + 'a>,
    reconciler: Box<dyn Reconciler + 'a>,
    namespaces: Box<dyn NamespaceIdentity + 'a>,
}

impl Dispatcher<'static> {
    /// Bind the process environment and standard streams.
    #[must_use]
    pub fn from_process() -> Self {
        Self::new(ProcessEnv, io::stdin(), io::stdout(), io::stderr())
    }
}

impl<'a> Dispatcher<'a> {
    /// Bind the given environment and streams with the default collaborators.
    pub fn new(
        env: impl Environment + 'a,
        stdin: impl Read + 'a,
        stdout: impl Write + 'a,
        stderr: impl Write + 'a,
    ) -> Self {
        Self {
            env: Box::new(env),
            stdin: Box::new(stdin),
            stdout: Box::new(stdout),
            stderr: Box::new(stderr),
            config_decoder: Box::new(JsonConfigDecoder),
            reconciler: Box::new(ExactReconciler),
            namespaces: Box::new(ThreadNetNs),
        }
    }

    /// Replace the configuration version decoder.
    #[must_use]
    pub fn with_config_decoder(mut self, decoder: impl ConfigDecoder + 'a) -> Self {
        self.config_decoder = Box::new(decoder);
        self
    }

    /// Replace the version reconciler.
    #[must_use]
    pub fn with_reconciler(mut self, reconciler: impl Reconciler + 'a) -> Self {
        self.reconciler = Box::new(reconciler);
        self
    }

    /// Replace the namespace identity check.
    #[must_use]
    pub fn with_namespace_identity(mut self, namespaces: impl NamespaceIdentity + 'a) -> Self {
        self.namespaces = Box::new(namespaces);
        self
    }

    /// Run one invocation.
    ///
    /// With no `CNI_COMMAND` set and a non-empty `about`, prints the about
    /// text and supported versions to stderr and succeeds.
    ///
    /// # Errors
    ///
    /// Returns the [`CniError`] that ended the invocation.
    pub fn run(
        &mut self,
        funcs: &PluginFuncs,
        plugin: &PluginCapabilities,
        about: &str,
    ) -> Result<(), CniError> {
        let (command_name, args) = match cmd_args_from_env(&*self.env, &mut *self.stdin) {
            Ok(resolved) => resolved,
            Err(err) => {
                if err.is(ErrorCode::InvalidEnvironmentVariables)
                    && self.env.get(CNI_COMMAND).is_empty()
                    && !about.is_empty()
                {
                    self.print_about(about, plugin);
                    return Ok(());
                }
                return Err(err);
            }
        };

        let command = command_name.parse::<Command>()?;
        debug!(%command, container_id = %args.container_id, if_name = %args.if_name, "dispatching");

        let negotiator = Negotiator::new(&*self.config_decoder, &*self.reconciler);
        match command {
            Command::Add => {
                negotiator.check_version_and_call(&args, plugin, funcs.add.as_ref())?;
                self.check_netns(&args)
            }
            Command::Del => {
                negotiator.check_version_and_call(&args, plugin, funcs.del.as_ref())?;
                self.check_netns(&args)
            }
            Command::Check => {
                negotiator.check_gated_and_call(&args, plugin, CHECK_GATE, funcs.check.as_ref())
            }
            Command::Gc => {
                negotiator.check_gated_and_call(&args, plugin, GC_GATE, funcs.gc.as_ref())
            }
            Command::Version => plugin
                .encode(&mut *self.stdout)
                .map_err(|e| CniError::new(ErrorCode::IoFailure, e.to_string())),
        }
    }

    /// Refuse to have operated on the plugin's own namespace unless
    /// `CNI_NETNS_OVERRIDE` is set.
    fn check_netns(&self, args: &CmdArgs) -> Result<(), CniError> {
        if args.netns_override() {
            debug!(netns = %args.netns, "namespace check overridden");
            return Ok(());
        }
        if self.namespaces.is_current(&args.netns)? {
            return Err(CniError::new(
                ErrorCode::InvalidNetNs,
                "plugin's netns and netns from CNI_NETNS should not be the same",
            ));
        }
        Ok(())
    }

    fn print_about(&mut self, about: &str, plugin: &PluginCapabilities) {
        info!("no command given, printing plugin information");
        let versions = plugin
            .supported_versions()
            .iter()
            .map(ProtocolVersion::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        // Help text only; a closed stderr is not an invocation failure.
        let _ = writeln!(self.stderr, "{about}");
        let _ = writeln!(self.stderr, "CNI protocol versions supported: {versions}");
        let _ = self.stderr.flush();
    }
}

impl fmt::Debug for Dispatcher<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher").finish_non_exhaustive()
    }
}
