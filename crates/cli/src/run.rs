// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Top-level bootstrap runner, shared by `main` and the test suite.

use std::path::Path;

use tracing::{info, warn};

use crate::actions::{self, ClusterArgs};
use crate::config::Config;
use crate::error::BootError;
use crate::event::{Event, NotifyFn};
use crate::facts::Facts;
use crate::outcome::Outcome;
use crate::terminal::Terminal;

/// Parse intent, open the console, and run the session to completion.
pub fn run(mut config: Config) -> anyhow::Result<Outcome> {
    if config.passwd_prompt {
        config.passwd = crate::config::prompt_password()?;
    }

    // Read the configuration before anything touches the console, so a
    // missing file costs nothing.
    let conf_text = match &config.junos_conf_file {
        Some(path) => Some(
            std::fs::read_to_string(path).map_err(|_| BootError::MissingFile(path.clone()))?,
        ),
        None => None,
    };

    let transport_config = config.transport()?;
    let label = transport_config.label();
    let mut term = Terminal::new(transport_config.build(), config.credentials());
    let notifier: NotifyFn = Box::new(|event, message| println!("TTY:{event}:{message}"));
    term.set_notifier(notifier);

    execute(&config, term, conf_text.as_deref(), &label)
}

/// Drive one bootstrap session over an already-built terminal.
///
/// Split out from [`run`] so tests can substitute a scripted transport and
/// a recording notifier.
pub fn execute(
    config: &Config,
    mut term: Terminal,
    conf_text: Option<&str>,
    console_label: &str,
) -> anyhow::Result<Outcome> {
    let mut outcome = Outcome::default();

    term.login()?;

    term.notify(Event::Facts, "gathering device facts ...");
    let mut facts = Facts::new();
    for soft in facts.gather(&mut term) {
        warn!(error = %soft, "fact gathering incomplete");
        outcome.fail(soft.to_string());
    }
    for ifname in &config.eth {
        if let Err(soft) = facts.eth(&mut term, ifname) {
            warn!(interface = %ifname, error = %soft, "interface facts incomplete");
            outcome.fail(soft.to_string());
        }
    }

    if let Some(content) = conf_text {
        actions::push_config(&mut term, &mut outcome, content, config.load_action())?;
    } else if let Some(mode) = config.qfx_mode {
        actions::qfx_mode(&mut term, &mut outcome, &mut facts, mode, &config.qfx_model_list())?;
    } else if config.zeroize {
        actions::zeroize(&mut term, &mut outcome)?;
    } else if let Some(mode) = config.shutdown {
        actions::shutdown(&mut term, &mut outcome, mode)?;
    } else if let Some(pair) = &config.srx_cluster {
        let args = ClusterArgs::parse(pair)
            .ok_or_else(|| anyhow::anyhow!("invalid --srx-cluster value {pair:?}"))?;
        actions::srx_cluster_enable(&mut term, &mut outcome, args)?;
    } else if config.srx_cluster_disable {
        actions::srx_cluster_disable(&mut term, &mut outcome)?;
    }

    if !config.no_save {
        let name = device_name(config, &facts, console_label);
        save_artifacts(&config.savedir, &name, &facts)?;
    }
    outcome.facts = Some(facts.table.clone());

    if outcome.skip_logout {
        term.notify(Event::Logout, "device is going down, skipping logout");
        // Terminal::drop still releases the transport.
    } else {
        term.logout()?;
    }

    Ok(outcome)
}

/// Name used for the save files: explicit name, else the gathered
/// hostname, else the console endpoint.
fn device_name(config: &Config, facts: &Facts, console_label: &str) -> String {
    config
        .name
        .clone()
        .or_else(|| facts.text("hostname").map(str::to_string))
        .unwrap_or_else(|| console_label.to_string())
}

fn save_artifacts(savedir: &Path, name: &str, facts: &Facts) -> anyhow::Result<()> {
    std::fs::create_dir_all(savedir)?;

    let facts_path = savedir.join(format!("{name}-facts.json"));
    std::fs::write(&facts_path, facts.to_json()?)?;
    info!(path = %facts_path.display(), "saved facts");

    if let Some(inventory) = &facts.inventory {
        let inventory_path = savedir.join(format!("{name}-inventory.xml"));
        std::fs::write(&inventory_path, inventory.to_pretty_xml()?)?;
        info!(path = %inventory_path.display(), "saved inventory");
    }
    Ok(())
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
