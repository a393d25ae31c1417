// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use clap::Parser;

use crate::netconf::LoadAction;
use crate::transport::TransportConfig;

use super::{split_host_port, Config};

fn parse(args: &[&str]) -> Config {
    let mut full = vec!["conboot"];
    full.extend_from_slice(args);
    match Config::try_parse_from(full) {
        Ok(config) => config,
        Err(e) => unreachable!("argument parsing failed: {e}"),
    }
}

#[test]
fn defaults_match_the_factory_case() {
    let config = parse(&["--gather-facts"]);
    assert_eq!(config.port, "/dev/ttyUSB0");
    assert_eq!(config.baud, 9600);
    assert_eq!(config.user, "root");
    assert_eq!(config.passwd, "");
    assert_eq!(config.timeout, 0.2);
    assert_eq!(config.attempts, 1);
    assert!(config.validate().is_ok());
}

#[test]
fn positional_name_is_optional() {
    let config = parse(&["spine1", "--gather-facts"]);
    assert_eq!(config.name.as_deref(), Some("spine1"));
    assert!(parse(&["--gather-facts"]).name.is_none());
}

#[yare::parameterized(
    nothing = { &[] },
    two_actions = { &["--gather-facts", "--zeroize"] },
    conf_and_qfx = { &["--conf", "a.conf", "--qfx-mode", "node"] },
    telnet_and_ssh = { &["--gather-facts", "--telnet", "a", "--ssh", "b", "--ssh-user", "op"] },
    ssh_without_user = { &["--gather-facts", "--ssh", "cs1"] },
    bad_cluster_pair = { &["--srx-cluster", "two,one"] },
    merge_without_conf = { &["--gather-facts", "--merge"] },
    zero_timeout = { &["--gather-facts", "--timeout", "0"] },
)]
fn validate_rejects(args: &[&str]) {
    assert!(parse(args).validate().is_err());
}

#[test]
fn validate_accepts_each_single_action() {
    for args in [
        vec!["--conf", "ex.conf"],
        vec!["--qfx-mode", "switch"],
        vec!["--zeroize"],
        vec!["--shutdown", "poweroff"],
        vec!["--srx-cluster", "2,1"],
        vec!["--srx-cluster-disable"],
        vec!["--gather-facts"],
    ] {
        let config = parse(&args);
        assert!(config.validate().is_ok(), "rejected {args:?}");
    }
}

#[test]
fn serial_is_the_default_transport() -> anyhow::Result<()> {
    let config = parse(&["--gather-facts", "-P", "/dev/ttyS1", "--baud", "19200"]);
    match config.transport()? {
        TransportConfig::Serial { device, baud, timeout } => {
            assert_eq!(device, "/dev/ttyS1");
            assert_eq!(baud, 19200);
            assert_eq!(timeout, Duration::from_millis(200));
        }
        other => anyhow::bail!("expected serial, got {other:?}"),
    }
    Ok(())
}

#[test]
fn telnet_transport_defaults_the_port() -> anyhow::Result<()> {
    let config = parse(&["--gather-facts", "--telnet", "ts1.lab"]);
    match config.transport()? {
        TransportConfig::Telnet { host, port, baud, .. } => {
            assert_eq!(host, "ts1.lab");
            assert_eq!(port, 23);
            assert_eq!(baud, 9600);
        }
        other => anyhow::bail!("expected telnet, got {other:?}"),
    }
    Ok(())
}

#[test]
fn ssh_transport_carries_server_credentials() -> anyhow::Result<()> {
    let config = parse(&[
        "--gather-facts",
        "--ssh",
        "cs1.lab:2022",
        "--ssh-user",
        "op",
        "--ssh-passwd",
        "hunter2",
        "--attempts",
        "3",
    ]);
    match config.transport()? {
        TransportConfig::Ssh { host, port, user, password, attempts, .. } => {
            assert_eq!(host, "cs1.lab");
            assert_eq!(port, 2022);
            assert_eq!(user, "op");
            assert_eq!(password, "hunter2");
            assert_eq!(attempts, 3);
        }
        other => anyhow::bail!("expected ssh, got {other:?}"),
    }
    Ok(())
}

#[test]
fn merge_flag_maps_to_the_replace_action() {
    let config = parse(&["--conf", "ex.conf", "--merge"]);
    assert_eq!(config.load_action(), LoadAction::Replace);
    assert_eq!(parse(&["--conf", "ex.conf"]).load_action(), LoadAction::Override);
}

#[test]
fn qfx_model_list_defaults_to_the_union() {
    let config = parse(&["--qfx-mode", "node"]);
    assert_eq!(
        config.qfx_model_list(),
        vec!["QFX3500", "QFX3500S", "QFX3600", "VIRTUAL CHASSIS"]
    );

    let overridden = parse(&["--qfx-mode", "node", "--qfx-model", "QFX9999"]);
    assert_eq!(overridden.qfx_model_list(), vec!["QFX9999"]);
}

#[test]
fn eth_is_repeatable() {
    let config = parse(&["--gather-facts", "--eth", "ge-0/0/0", "--eth", "me0"]);
    assert_eq!(config.eth, vec!["ge-0/0/0", "me0"]);
}

#[test]
fn credentials_come_from_the_login_options() {
    let config = parse(&["--gather-facts", "-u", "admin", "-p", "secret", "--attempts", "2"]);
    let creds = config.credentials();
    assert_eq!(creds.user, "admin");
    assert_eq!(creds.password, "secret");
    assert_eq!(creds.attempts, 2);
}

#[test]
fn host_port_splitting() -> anyhow::Result<()> {
    assert_eq!(split_host_port("ts1", 23)?, ("ts1".to_string(), 23));
    assert_eq!(split_host_port("ts1:7001", 23)?, ("ts1".to_string(), 7001));
    assert!(split_host_port("ts1:notaport", 23).is_err());
    assert!(split_host_port(":7001", 23).is_err());
    assert!(split_host_port("", 23).is_err());
    Ok(())
}
