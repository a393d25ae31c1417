// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! High-level device actions composed from xml-mode RPCs.
//!
//! Actions that reboot or wipe the device set `skip_logout` on the outcome;
//! the remote side tears the console session down on its own.

use tracing::info;

use crate::error::BootError;
use crate::event::Event;
use crate::facts::Facts;
use crate::netconf::{LoadAction, RpcOutcome};
use crate::outcome::Outcome;
use crate::terminal::Terminal;
use crate::xml::Element;

/// QFX chassis personality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum QfxMode {
    Node,
    Switch,
}

impl QfxMode {
    /// The device-mode word the chassis reports and accepts.
    pub fn mode_word(&self) -> &'static str {
        match self {
            Self::Node => "node-device",
            Self::Switch => "standalone",
        }
    }
}

/// What `--shutdown` should do to the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ShutdownMode {
    Poweroff,
    Reboot,
}

/// Chassis-cluster membership for SRX pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClusterArgs {
    pub cluster_id: u32,
    pub node: u32,
}

impl ClusterArgs {
    /// Parse the `<cluster_id>,<node>` CLI form.
    pub fn parse(text: &str) -> Option<Self> {
        let (id, node) = text.split_once(',')?;
        Some(Self {
            cluster_id: id.trim().parse().ok()?,
            node: node.trim().parse().ok()?,
        })
    }
}

/// Models eligible for QFX device-mode handling unless overridden.
pub const QFX_MODEL_DEFAULTS: &[&str] =
    &["QFX3500", "QFX3500S", "QFX3600", "VIRTUAL CHASSIS"];

/// Load a configuration and commit it, rolling back on either failure.
///
/// A failed load or commit is a session-recoverable condition: exactly one
/// rollback is issued, the outcome is marked failed, and the caller still
/// logs out normally.
pub fn push_config(
    term: &mut Terminal,
    outcome: &mut Outcome,
    content: &str,
    action: LoadAction,
) -> Result<(), BootError> {
    term.notify(Event::Conf, "loading into device ...");
    if let RpcOutcome::Reply(_) = term.load(content, action)? {
        term.notify(Event::ConfLdErr, "failure to load configuration, aborting.");
        term.rollback()?;
        outcome.fail("failure to load configuration, aborting.");
        return Ok(());
    }

    term.notify(Event::Conf, "commit ... please be patient");
    if let RpcOutcome::Reply(_) = term.commit()? {
        term.notify(Event::ConfSaveErr, "failure to commit configuration, aborting.");
        term.rollback()?;
        outcome.fail("failure to commit configuration, aborting.");
        return Ok(());
    }

    outcome.changed = true;
    Ok(())
}

/// Align the chassis device mode with the requested personality.
///
/// The current mode and the mode after the next reboot are independent:
/// the persistent setting is corrected first, then a reboot is triggered
/// if the running mode still differs. Leaving switch mode for node mode
/// invalidates the chassis-level identity facts, which are re-derived from
/// the FPC 0 inventory module.
pub fn qfx_mode(
    term: &mut Terminal,
    outcome: &mut Outcome,
    facts: &mut Facts,
    desired: QfxMode,
    models: &[String],
) -> Result<(), BootError> {
    let model = facts
        .text("model")
        .ok_or_else(|| BootError::FactMissing("model".to_string()))?
        .to_string();
    if !models.iter().any(|m| m.eq_ignore_ascii_case(&model)) {
        term.notify(Event::Qfx, &format!("{model} is not a QFX node device, skipping"));
        return Ok(());
    }

    let reply = term.rpc("show-chassis-device-mode")?;
    let current = reply
        .find_text("device-mode-current")
        .ok_or_else(|| BootError::FactMissing("device-mode-current".to_string()))?
        .to_string();
    let after_reboot = reply
        .find_text("device-mode-after-reboot")
        .ok_or_else(|| BootError::FactMissing("device-mode-after-reboot".to_string()))?
        .to_string();
    let want = desired.mode_word();
    info!(model, current, after_reboot, want, "chassis device mode");

    if !after_reboot.eq_ignore_ascii_case(want) {
        term.notify(Event::Qfx, &format!("setting device mode to {want}"));
        let command =
            Element::new("request-chassis-device-mode").with_child(Element::new(want));
        term.rpc(&command.to_xml()?)?;
        outcome.changed = true;
    }

    if !current.eq_ignore_ascii_case(want) {
        if desired == QfxMode::Node {
            // The chassis-level model and serial describe the switch
            // identity; the node identity lives on FPC 0.
            facts.rebase_on_fpc0()?;
        }
        term.notify(Event::Change, "device mode change requires a reboot, rebooting now ...");
        term.rpc("request-reboot")?;
        outcome.changed = true;
        outcome.skip_logout = true;
    }

    Ok(())
}

/// Enable chassis-cluster membership. The device reboots into the cluster,
/// so the session ends here.
pub fn srx_cluster_enable(
    term: &mut Terminal,
    outcome: &mut Outcome,
    args: ClusterArgs,
) -> Result<(), BootError> {
    term.notify(
        Event::SrxCluster,
        &format!("enabling cluster {} as node {}, device will reboot", args.cluster_id, args.node),
    );
    let command = Element::new("set-chassis-cluster-enable")
        .with_child(Element::new("cluster-id").with_text(args.cluster_id.to_string()))
        .with_child(Element::new("node").with_text(args.node.to_string()))
        .with_child(Element::new("reboot"));
    term.rpc(&command.to_xml()?)?;
    outcome.changed = true;
    outcome.skip_logout = true;
    Ok(())
}

/// Disable chassis-cluster membership; reboots out of the cluster.
pub fn srx_cluster_disable(
    term: &mut Terminal,
    outcome: &mut Outcome,
) -> Result<(), BootError> {
    term.notify(Event::SrxCluster, "disabling cluster mode, device will reboot");
    let command =
        Element::new("set-chassis-cluster-disable").with_child(Element::new("reboot"));
    term.rpc(&command.to_xml()?)?;
    outcome.changed = true;
    outcome.skip_logout = true;
    Ok(())
}

/// Wipe the device back to its factory state.
pub fn zeroize(term: &mut Terminal, outcome: &mut Outcome) -> Result<(), BootError> {
    term.notify(Event::Zeroize, "zeroizing device ...");
    term.rpc("request-system-zeroize")?;
    outcome.changed = true;
    outcome.skip_logout = true;
    Ok(())
}

/// Power the device down or reboot it.
pub fn shutdown(
    term: &mut Terminal,
    outcome: &mut Outcome,
    mode: ShutdownMode,
) -> Result<(), BootError> {
    let (command, message) = match mode {
        ShutdownMode::Poweroff => ("request-power-off", "powering off ..."),
        ShutdownMode::Reboot => ("request-reboot", "rebooting ..."),
    };
    term.notify(Event::Shutdown, message);
    term.rpc(command)?;
    outcome.changed = true;
    outcome.skip_logout = true;
    Ok(())
}

#[cfg(test)]
#[path = "actions_tests.rs"]
mod tests;
