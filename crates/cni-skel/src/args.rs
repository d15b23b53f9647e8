//! Invocation arguments: the `CNI_*` variables plus the stdin configuration.

use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::str::FromStr;

use cni_types::{CniError, ErrorCode, validate_container_id, validate_interface_name};
use tracing::debug;

use crate::config::validate_config;
use crate::env::Environment;

/// Name of the command variable.
pub const CNI_COMMAND: &str = "CNI_COMMAND";
/// Container identifier.
pub const CNI_CONTAINERID: &str = "CNI_CONTAINERID";
/// Path to the target network namespace.
pub const CNI_NETNS: &str = "CNI_NETNS";
/// Interface name to create inside the container.
pub const CNI_IFNAME: &str = "CNI_IFNAME";
/// Opaque runtime arguments (`K1=V1;K2=V2`).
pub const CNI_ARGS: &str = "CNI_ARGS";
/// Plugin search path.
pub const CNI_PATH: &str = "CNI_PATH";
/// Disables the "plugin runs in the target namespace" safety check.
pub const CNI_NETNS_OVERRIDE: &str = "CNI_NETNS_OVERRIDE";

/// A recognized command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Attach the container to the network.
    Add,
    /// Verify an existing attachment.
    Check,
    /// Detach the container from the network.
    Del,
    /// Release resources not referenced by any valid attachment.
    Gc,
    /// Report supported protocol versions.
    Version,
}

impl Command {
    /// The wire name of the command.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "ADD",
            Self::Check => "CHECK",
            Self::Del => "DEL",
            Self::Gc => "GC",
            Self::Version => "VERSION",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Command {
    type Err = CniError;

    /// Exact, case-sensitive match.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADD" => Ok(Self::Add),
            "CHECK" => Ok(Self::Check),
            "DEL" => Ok(Self::Del),
            "GC" => Ok(Self::Gc),
            "VERSION" => Ok(Self::Version),
            other => Err(CniError::new(
                ErrorCode::InvalidEnvironmentVariables,
                format!("unknown CNI_COMMAND: {other}"),
            )),
        }
    }
}

/// Everything a handler receives for one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CmdArgs {
    /// `CNI_CONTAINERID`.
    pub container_id: String,
    /// `CNI_NETNS`.
    pub netns: String,
    /// `CNI_IFNAME`.
    pub if_name: String,
    /// `CNI_ARGS`, unparsed.
    pub args: String,
    /// `CNI_PATH`.
    pub path: String,
    /// `CNI_NETNS_OVERRIDE`, unparsed.
    pub netns_override: String,
    /// The raw network configuration read from stdin.
    pub stdin_data: Vec<u8>,
}

impl CmdArgs {
    /// Whether the namespace safety check is disabled: `TRUE` in any case,
    /// or `1`.
    #[must_use]
    pub fn netns_override(&self) -> bool {
        self.netns_override.eq_ignore_ascii_case("TRUE") || self.netns_override == "1"
    }

    /// Split `CNI_ARGS` into ordered key/value pairs.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorCode::InvalidEnvironmentVariables`] for a pair that
    /// does not have exactly one `=`.
    pub fn cni_args(&self) -> Result<Vec<(String, String)>, CniError> {
        if self.args.is_empty() {
            return Ok(Vec::new());
        }
        self.args
            .split(';')
            .map(|pair| {
                let mut parts = pair.split('=');
                match (parts.next(), parts.next(), parts.next()) {
                    (Some(key), Some(value), None) => Ok((key.to_string(), value.to_string())),
                    _ => Err(CniError::new(
                        ErrorCode::InvalidEnvironmentVariables,
                        format!("ARGS: invalid pair {pair:?}"),
                    )),
                }
            })
            .collect()
    }
}

type Validator = fn(&str) -> Result<(), CniError>;

/// One row of the variable table.
struct VarSpec {
    name: &'static str,
    required_for: &'static [Command],
    validate: Option<Validator>,
}

impl VarSpec {
    fn is_required(&self, command: Option<Command>) -> bool {
        self.name == CNI_COMMAND || command.is_some_and(|c| self.required_for.contains(&c))
    }
}

use Command::{Add, Check, Del, Gc};

/// Variables read for every invocation, in reporting order.
const VARS: &[VarSpec] = &[
    VarSpec {
        name: CNI_COMMAND,
        required_for: &[Add, Check, Del, Gc],
        validate: None,
    },
    VarSpec {
        name: CNI_CONTAINERID,
        required_for: &[Add, Check, Del],
        validate: Some(validate_container_id),
    },
    VarSpec {
        name: CNI_NETNS,
        required_for: &[Add, Check],
        validate: None,
    },
    VarSpec {
        name: CNI_IFNAME,
        required_for: &[Add, Check, Del],
        validate: Some(validate_interface_name),
    },
    VarSpec {
        name: CNI_ARGS,
        required_for: &[],
        validate: None,
    },
    VarSpec {
        name: CNI_PATH,
        required_for: &[Add, Check, Del, Gc],
        validate: None,
    },
    VarSpec {
        name: CNI_NETNS_OVERRIDE,
        required_for: &[],
        validate: None,
    },
];

/// Resolve the command name and arguments for this invocation.
///
/// Missing required variables are collected and reported together; a
/// validator failure is reported immediately. Stdin is not read for
/// VERSION. For every other command the configuration must pass
/// [`validate_config`].
pub fn cmd_args_from_env<E, R>(env: &E, stdin: &mut R) -> Result<(String, CmdArgs), CniError>
where
    E: Environment + ?Sized,
    R: Read + ?Sized,
{
    let command_name = env.get(CNI_COMMAND);
    let command = command_name.parse::<Command>().ok();

    let mut values = HashMap::with_capacity(VARS.len());
    let mut missing = Vec::new();
    for var in VARS {
        let value = env.get(var.name);
        if value.is_empty() {
            if var.is_required(command) {
                missing.push(var.name);
            }
        } else if var.is_required(command) {
            if let Some(validate) = var.validate {
                validate(&value)?;
            }
        }
        values.insert(var.name, value);
    }

    if !missing.is_empty() {
        debug!(command = %command_name, ?missing, "required variables missing");
        return Err(CniError::new(
            ErrorCode::InvalidEnvironmentVariables,
            format!("required env variables [{}] missing", missing.join(",")),
        ));
    }

    let mut stdin_data = Vec::new();
    if command != Some(Command::Version) {
        stdin.read_to_end(&mut stdin_data).map_err(|e| {
            CniError::new(ErrorCode::IoFailure, format!("error reading from stdin: {e}"))
        })?;
        validate_config(&stdin_data)?;
    }

    let mut take = |name: &str| values.remove(name).unwrap_or_default();
    let args = CmdArgs {
        container_id: take(CNI_CONTAINERID),
        netns: take(CNI_NETNS),
        if_name: take(CNI_IFNAME),
        args: take(CNI_ARGS),
        path: take(CNI_PATH),
        netns_override: take(CNI_NETNS_OVERRIDE),
        stdin_data,
    };
    Ok((command_name, args))
}
