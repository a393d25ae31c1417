// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::actions::{ClusterArgs, QfxMode, ShutdownMode, QFX_MODEL_DEFAULTS};
use crate::netconf::LoadAction;
use crate::terminal::Credentials;
use crate::transport::TransportConfig;

/// Bootstrap a factory-fresh device over its console port.
#[derive(Debug, Parser)]
#[command(name = "conboot", version, about)]
pub struct Config {
    /// Symbolic name of the device; used for save-file naming.
    pub name: Option<String>,

    /// Pre-rendered configuration file to load and commit.
    #[arg(short = 'C', long = "conf", value_name = "FILE")]
    pub junos_conf_file: Option<PathBuf>,

    /// Use the "replace" load action instead of the default "override".
    #[arg(long)]
    pub merge: bool,

    /// Align the QFX chassis device mode.
    #[arg(long, value_enum, value_name = "MODE")]
    pub qfx_mode: Option<QfxMode>,

    /// Model eligible for QFX device-mode handling (repeatable; defaults
    /// to the known QFX node devices).
    #[arg(long = "qfx-model", value_name = "MODEL")]
    pub qfx_models: Vec<String>,

    /// Wipe the device back to factory state.
    #[arg(long)]
    pub zeroize: bool,

    /// Power the device off or reboot it.
    #[arg(long, value_enum, value_name = "MODE")]
    pub shutdown: Option<ShutdownMode>,

    /// Enable SRX chassis-cluster membership as "<cluster_id>,<node>".
    #[arg(long, value_name = "ID,NODE")]
    pub srx_cluster: Option<String>,

    /// Disable SRX chassis-cluster membership.
    #[arg(long)]
    pub srx_cluster_disable: bool,

    /// Gather facts only; apply no configuration.
    #[arg(long)]
    pub gather_facts: bool,

    /// Also gather link facts for this interface (repeatable).
    #[arg(long = "eth", value_name = "IFNAME")]
    pub eth: Vec<String>,

    /// Directory for the facts and inventory save files.
    #[arg(long, default_value = ".", value_name = "DIR")]
    pub savedir: PathBuf,

    /// Do not write the facts and inventory save files.
    #[arg(long)]
    pub no_save: bool,

    /// Serial console device.
    #[arg(short = 'P', long, default_value = "/dev/ttyUSB0", value_name = "DEVICE")]
    pub port: String,

    /// Serial baud rate; also paces telnet writes to the terminal server.
    #[arg(long, default_value_t = 9600)]
    pub baud: u32,

    /// Terminal server to reach the console through, as "host[:port]".
    #[arg(long, value_name = "HOST[:PORT]")]
    pub telnet: Option<String>,

    /// Console server to reach the console through, as "host[:port]".
    #[arg(long, value_name = "HOST[:PORT]")]
    pub ssh: Option<String>,

    /// Login user on the SSH console server.
    #[arg(long, value_name = "USER")]
    pub ssh_user: Option<String>,

    /// Login password on the SSH console server.
    #[arg(long, value_name = "PASSWD")]
    pub ssh_passwd: Option<String>,

    /// Console read poll timeout, in seconds.
    #[arg(long, default_value_t = 0.2, value_name = "SECS")]
    pub timeout: f64,

    /// Device login user.
    #[arg(short, long, default_value = "root")]
    pub user: String,

    /// Device login password; factory-fresh devices have none.
    #[arg(short, long, default_value = "")]
    pub passwd: String,

    /// Prompt for the device password instead of taking it from the
    /// command line.
    #[arg(short = 'k', long)]
    pub passwd_prompt: bool,

    /// Console-server connect attempts before giving up.
    #[arg(long, default_value_t = 1)]
    pub attempts: u32,
}

impl Config {
    /// Validate cross-option constraints after parsing.
    pub fn validate(&self) -> anyhow::Result<()> {
        let actions = [
            self.junos_conf_file.is_some(),
            self.qfx_mode.is_some(),
            self.zeroize,
            self.shutdown.is_some(),
            self.srx_cluster.is_some(),
            self.srx_cluster_disable,
            self.gather_facts,
        ];
        let selected = actions.iter().filter(|&&on| on).count();
        if selected == 0 {
            anyhow::bail!(
                "nothing to do: give a configuration (--conf), a device action, or --gather-facts"
            );
        }
        if selected > 1 {
            anyhow::bail!("choose exactly one action per run");
        }

        if self.telnet.is_some() && self.ssh.is_some() {
            anyhow::bail!("--telnet and --ssh are mutually exclusive");
        }
        if self.ssh.is_some() && self.ssh_user.is_none() {
            anyhow::bail!("--ssh requires --ssh-user");
        }

        if let Some(pair) = &self.srx_cluster {
            if ClusterArgs::parse(pair).is_none() {
                anyhow::bail!("--srx-cluster expects \"<cluster_id>,<node>\", got {pair:?}");
            }
        }

        if self.merge && self.junos_conf_file.is_none() {
            anyhow::bail!("--merge only makes sense together with --conf");
        }

        if !self.timeout.is_finite() || self.timeout <= 0.0 {
            anyhow::bail!("--timeout must be positive");
        }
        Ok(())
    }

    /// The console substrate this run should use.
    pub fn transport(&self) -> anyhow::Result<TransportConfig> {
        let timeout = Duration::from_secs_f64(self.timeout);
        if let Some(spec) = &self.telnet {
            let (host, port) = split_host_port(spec, 23)?;
            return Ok(TransportConfig::Telnet { host, port, timeout, baud: self.baud });
        }
        if let Some(spec) = &self.ssh {
            let (host, port) = split_host_port(spec, 22)?;
            return Ok(TransportConfig::Ssh {
                host,
                port,
                user: self.ssh_user.clone().unwrap_or_default(),
                password: self.ssh_passwd.clone().unwrap_or_default(),
                timeout,
                attempts: self.attempts,
            });
        }
        Ok(TransportConfig::Serial { device: self.port.clone(), baud: self.baud, timeout })
    }

    /// Device login identity.
    pub fn credentials(&self) -> Credentials {
        Credentials {
            user: self.user.clone(),
            password: self.passwd.clone(),
            attempts: self.attempts,
        }
    }

    /// Which load action to use for `--conf`.
    pub fn load_action(&self) -> LoadAction {
        if self.merge {
            // TODO: --merge has always been wired to the "replace" load
            // action; confirm with the config owners whether "merge" was
            // the intent before changing it.
            LoadAction::Replace
        } else {
            LoadAction::Override
        }
    }

    /// The QFX model eligibility list, defaulted when not overridden.
    pub fn qfx_model_list(&self) -> Vec<String> {
        if self.qfx_models.is_empty() {
            QFX_MODEL_DEFAULTS.iter().map(|m| m.to_string()).collect()
        } else {
            self.qfx_models.clone()
        }
    }
}

/// Split "host[:port]" with a substrate-specific default port.
pub fn split_host_port(spec: &str, default_port: u16) -> anyhow::Result<(String, u16)> {
    match spec.rsplit_once(':') {
        Some((host, port)) if !host.is_empty() => {
            let port = port
                .parse::<u16>()
                .map_err(|_| anyhow::anyhow!("invalid port in {spec:?}"))?;
            Ok((host.to_string(), port))
        }
        Some(_) => anyhow::bail!("missing host in {spec:?}"),
        None if spec.is_empty() => anyhow::bail!("empty host"),
        None => Ok((spec.to_string(), default_port)),
    }
}

/// Read a password from the controlling terminal with echo disabled.
pub fn prompt_password() -> anyhow::Result<String> {
    use rustix::termios::{self, OptionalActions};

    let stdin = std::io::stdin();
    eprint!("Password: ");
    std::io::stderr().flush()?;

    let interactive = termios::isatty(&stdin);
    let saved = if interactive {
        let saved = termios::tcgetattr(&stdin)?;
        let mut quiet = saved.clone();
        quiet.local_modes &= !termios::LocalModes::ECHO;
        termios::tcsetattr(&stdin, OptionalActions::Flush, &quiet)?;
        Some(saved)
    } else {
        None
    };

    let mut line = String::new();
    let read = stdin.lock().read_line(&mut line);

    if let Some(saved) = saved {
        termios::tcsetattr(&stdin, OptionalActions::Flush, &saved)?;
        eprintln!();
    }
    read?;

    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
