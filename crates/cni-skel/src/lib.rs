//! Skeleton for CNI plugins: turns one runtime invocation into one handler
//! call.
//!
//! The container runtime runs a plugin once per operation, passing the
//! command and its arguments in `CNI_*` environment variables and the
//! network configuration on stdin. This crate resolves and validates those
//! inputs, negotiates the protocol version, calls the matching handler and
//! reports failures the way runtimes expect.
//!
//! # Example
//!
//! ```no_run
//! use cni_skel::{CmdArgs, PluginFuncs, plugin_main_funcs};
//! use cni_version::PluginCapabilities;
//!
//! fn cmd_add(args: &CmdArgs) -> anyhow::Result<()> {
//!     eprintln!("configuring {} in {}", args.if_name, args.netns);
//!     println!(r#"{{"cniVersion":"1.0.0","dns":{{}}}}"#);
//!     Ok(())
//! }
//!
//! fn main() {
//!     cni_skel::logging::init();
//!     plugin_main_funcs(
//!         PluginFuncs::new().add(cmd_add).del(|_| Ok(())),
//!         &PluginCapabilities::all(),
//!         "CNI example plugin v0.1.0",
//!     );
//! }
//! ```
//!
//! # Calling conventions
//!
//! - [`plugin_main_funcs_with_error`] returns the [`CniError`] to the caller.
//! - [`plugin_main_funcs`] prints it as JSON on stdout and exits with
//!   status 1.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod args;
mod config;
mod dispatch;
mod env;
pub mod logging;
mod negotiate;
mod netns;

pub use args::{
    CNI_ARGS, CNI_COMMAND, CNI_CONTAINERID, CNI_IFNAME, CNI_NETNS, CNI_NETNS_OVERRIDE, CNI_PATH,
    CmdArgs, Command, cmd_args_from_env,
};
pub use cni_types::{CniError, ErrorCode};
pub use config::validate_config;
pub use dispatch::{Dispatcher, Handler, PluginFuncs};
pub use env::{Environment, ProcessEnv};
pub use netns::{FakeNamespaceIdentity, NamespaceIdentity, ThreadNetNs};

use cni_version::PluginCapabilities;
use tracing::error;

/// Run the plugin against the real process environment and streams,
/// returning any failure to the caller.
///
/// A compliant plugin must print the returned error as JSON on stdout and
/// exit non-zero; [`plugin_main_funcs`] does this for you.
pub fn plugin_main_funcs_with_error(
    funcs: PluginFuncs,
    plugin: &PluginCapabilities,
    about: &str,
) -> Result<(), CniError> {
    Dispatcher::from_process().run(&funcs, plugin, about)
}

/// Run the plugin and handle failures: print the error JSON to stdout and
/// exit with status 1.
///
/// `about` is printed to stderr when the plugin is run without
/// `CNI_COMMAND`; `"CNI plugin <name> v<version>"` is the usual form.
/// Installs the stderr logger if the plugin has not installed one.
pub fn plugin_main_funcs(funcs: PluginFuncs, plugin: &PluginCapabilities, about: &str) {
    logging::init();
    if let Err(err) = plugin_main_funcs_with_error(funcs, plugin, about) {
        exit_with(&err);
    }
}

/// Three-handler form of [`plugin_main_funcs_with_error`].
#[deprecated(note = "use plugin_main_funcs_with_error with PluginFuncs")]
pub fn plugin_main_with_error(
    cmd_add: impl Fn(&CmdArgs) -> anyhow::Result<()> + 'static,
    cmd_check: impl Fn(&CmdArgs) -> anyhow::Result<()> + 'static,
    cmd_del: impl Fn(&CmdArgs) -> anyhow::Result<()> + 'static,
    plugin: &PluginCapabilities,
    about: &str,
) -> Result<(), CniError> {
    let funcs = PluginFuncs::new().add(cmd_add).check(cmd_check).del(cmd_del);
    plugin_main_funcs_with_error(funcs, plugin, about)
}

/// Three-handler form of [`plugin_main_funcs`].
#[deprecated(note = "use plugin_main_funcs with PluginFuncs")]
#[allow(deprecated)]
pub fn plugin_main(
    cmd_add: impl Fn(&CmdArgs) -> anyhow::Result<()> + 'static,
    cmd_check: impl Fn(&CmdArgs) -> anyhow::Result<()> + 'static,
    cmd_del: impl Fn(&CmdArgs) -> anyhow::Result<()> + 'static,
    plugin: &PluginCapabilities,
    about: &str,
) {
    logging::init();
    if let Err(err) = plugin_main_with_error(cmd_add, cmd_check, cmd_del, plugin, about) {
        exit_with(&err);
    }
}

/// Write `err` as the invocation's JSON result.
///
/// Used by the auto-handling entry points; exposed for plugins that drive a
/// [`Dispatcher`] themselves.
pub fn report_error<W: std::io::Write + ?Sized>(err: &CniError, out: &mut W) {
    if let Err(write_err) = err.print_to(out) {
        error!(error = %write_err, "error writing error JSON to stdout");
    }
}

fn exit_with(err: &CniError) -> ! {
    report_error(err, &mut std::io::stdout().lock());
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "stdout closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Log sink shared between the subscriber and the test.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture_logs(f: impl FnOnce()) -> String {
        let captured = Captured::default();
        let sink = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || sink.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_report_error_writes_json() {
        let mut out = Vec::new();
        let logs = capture_logs(|| {
            report_error(&CniError::new(ErrorCode::InvalidNetNs, "bad netns"), &mut out);
        });

        let parsed: CniError = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed, CniError::new(ErrorCode::InvalidNetNs, "bad netns"));
        assert!(logs.is_empty());
    }

    #[test]
    fn test_report_error_logs_failed_write() {
        let logs = capture_logs(|| report_error(&CniError::internal("x"), &mut BrokenPipe));

        assert!(logs.contains("ERROR"));
        assert!(logs.contains("error writing error JSON to stdout"));
        assert!(logs.contains("stdout closed"));
    }
}
