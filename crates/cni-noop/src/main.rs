//! cni-noop - a CNI plugin that accepts every command and changes nothing.
//!
//! Useful for checking that a runtime invokes plugins correctly. Setting
//! `"debugFail": "<message>"` in the network configuration makes every
//! command fail with that message.

use std::io::{self, Write};

use anyhow::{Context, bail};
use cni_skel::{CmdArgs, PluginFuncs, logging};
use cni_version::{ConfigDecoder, JsonConfigDecoder, PluginCapabilities};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// The parts of the network configuration this plugin looks at.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NetConf {
    #[serde(default)]
    debug_fail: Option<String>,
}

/// The smallest valid ADD result.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AddResult {
    cni_version: String,
    dns: serde_json::Map<String, serde_json::Value>,
}

fn load_conf(args: &CmdArgs) -> anyhow::Result<NetConf> {
    let conf: NetConf =
        serde_json::from_slice(&args.stdin_data).context("parsing network configuration")?;
    if let Some(msg) = conf.debug_fail.as_deref().filter(|m| !m.is_empty()) {
        bail!("{msg}");
    }
    Ok(conf)
}

fn cmd_add(args: &CmdArgs) -> anyhow::Result<()> {
    load_conf(args)?;
    let cni_version = JsonConfigDecoder
        .decode(&args.stdin_data)
        .context("reading cniVersion")?;
    info!(container_id = %args.container_id, if_name = %args.if_name, "ADD");

    let result = AddResult {
        cni_version: cni_version.to_string(),
        dns: serde_json::Map::new(),
    };
    let mut out = io::stdout().lock();
    serde_json::to_writer(&mut out, &result).context("writing result")?;
    writeln!(out).context("writing result")?;
    out.flush().context("writing result")?;
    Ok(())
}

fn cmd_check(args: &CmdArgs) -> anyhow::Result<()> {
    load_conf(args)?;
    debug!(container_id = %args.container_id, "CHECK");
    Ok(())
}

fn cmd_del(args: &CmdArgs) -> anyhow::Result<()> {
    load_conf(args)?;
    debug!(container_id = %args.container_id, "DEL");
    Ok(())
}

fn cmd_gc(args: &CmdArgs) -> anyhow::Result<()> {
    load_conf(args)?;
    debug!("GC");
    Ok(())
}

fn main() {
    logging::init();

    let funcs = PluginFuncs::new()
        .add(cmd_add)
        .check(cmd_check)
        .del(cmd_del)
        .gc(cmd_gc);
    let about = format!("CNI noop plugin v{}", env!("CARGO_PKG_VERSION"));
    cni_skel::plugin_main_funcs(funcs, &PluginCapabilities::all(), &about);
}
