// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pre-baked fact-gathering RPCs.
//!
//! Each gatherer is isolated: a reply with an unexpected shape costs only
//! the facts it would have produced, never the session.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::error::BootError;
use crate::terminal::Terminal;
use crate::xml::Element;

/// A fact value: a flat string, or a nested table for interfaces.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FactValue {
    Text(String),
    Table(BTreeMap<String, String>),
}

/// Fact name to value, ordered for stable serialization.
pub type FactTable = BTreeMap<String, FactValue>;

/// Gathered device identity plus the verbatim chassis inventory tree.
#[derive(Debug, Default)]
pub struct Facts {
    pub table: FactTable,
    pub inventory: Option<Element>,
}

impl Facts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the standard gatherers, collecting what each can. Returns the
    /// soft failures for the driver to reflect in the outcome.
    pub fn gather(&mut self, term: &mut Terminal) -> Vec<BootError> {
        let mut soft = Vec::new();
        if let Err(e) = self.software(term) {
            debug!(error = %e, "software facts incomplete");
            soft.push(e);
        }
        if let Err(e) = self.chassis(term) {
            debug!(error = %e, "chassis facts incomplete");
            soft.push(e);
        }
        soft
    }

    fn set(&mut self, name: &str, value: impl Into<String>) {
        self.table.insert(name.to_string(), FactValue::Text(value.into()));
    }

    /// `get-software-information`: release version and hostname.
    ///
    /// The version lives bracketed inside the `junos` package comment,
    /// e.g. `JUNOS Base OS boot [12.1X46-D10.2]`.
    fn software(&mut self, term: &mut Terminal) -> Result<(), BootError> {
        let reply = term.rpc("get-software-information")?;

        if let Some(hostname) = reply.find_text("host-name") {
            self.set("hostname", hostname);
        }

        let comment = reply
            .children_named("package-information")
            .find(|pkg| pkg.child_text("name") == Some("junos"))
            .and_then(|pkg| pkg.child_text("comment"))
            .ok_or_else(|| BootError::FactMissing("package-information/comment".to_string()))?;
        let version = comment
            .split_once('[')
            .and_then(|(_, rest)| rest.split_once(']'))
            .map(|(version, _)| version)
            .ok_or_else(|| BootError::FactMissing("version".to_string()))?;
        self.set("version", version);

        if !self.table.contains_key("hostname") {
            return Err(BootError::FactMissing("host-name".to_string()));
        }
        Ok(())
    }

    /// `get-chassis-inventory`: model and serial number, plus the whole
    /// reply retained verbatim for the inventory save file.
    fn chassis(&mut self, term: &mut Terminal) -> Result<(), BootError> {
        let reply = term.rpc("get-chassis-inventory")?;
        self.inventory = Some(reply);
        let chassis = self
            .inventory
            .as_ref()
            .and_then(|inv| inv.child("chassis"))
            .ok_or_else(|| BootError::FactMissing("chassis".to_string()))?;

        let model = chassis
            .child_text("description")
            .ok_or_else(|| BootError::FactMissing("chassis/description".to_string()))?
            .to_uppercase();

        // The chassis-level serial is authoritative; older chassis report
        // it only on the Backplane module.
        let serial = chassis
            .child_text("serial-number")
            .or_else(|| {
                chassis
                    .children_named("chassis-module")
                    .find(|module| module.child_text("name") == Some("Backplane"))
                    .and_then(|module| module.child_text("serial-number"))
            })
            .ok_or_else(|| BootError::FactMissing("chassis/serial-number".to_string()))?
            .to_string();

        self.set("model", model);
        self.set("serialnumber", serial);
        Ok(())
    }

    /// `get-interface-information` with the media flag: link facts for one
    /// named interface.
    pub fn eth(&mut self, term: &mut Terminal, ifname: &str) -> Result<(), BootError> {
        let command = Element::new("get-interface-information")
            .with_child(Element::new("media"))
            .with_child(Element::new("interface-name").with_text(ifname));
        let reply = term.rpc(&command.to_xml()?)?;
        let physical = reply
            .into_first_child()
            .ok_or_else(|| BootError::FactMissing(format!("physical-interface {ifname}")))?;

        let mut link = BTreeMap::new();
        let pairs = [
            ("macaddr", "current-physical-address"),
            ("ifindex", "snmp-index"),
            ("oper", "oper-status"),
            ("admin", "admin-status"),
            ("speed", "speed"),
            ("duplex", "duplex"),
        ];
        for (fact, tag) in pairs {
            if let Some(value) = physical.find_text(tag) {
                link.insert(fact.to_string(), value.to_string());
            }
        }
        self.table.insert(ifname.to_string(), FactValue::Table(link));
        Ok(())
    }

    /// Replace the chassis-level identity with the FPC 0 module's. A QFX
    /// leaving switch mode reports the wrong identity at chassis level.
    pub fn rebase_on_fpc0(&mut self) -> Result<(), BootError> {
        let module = self
            .inventory
            .as_ref()
            .and_then(|inv| inv.child("chassis"))
            .and_then(|chassis| {
                chassis
                    .children_named("chassis-module")
                    .find(|module| module.child_text("name") == Some("FPC 0"))
            })
            .ok_or_else(|| BootError::FactMissing("chassis-module FPC 0".to_string()))?;

        let model = module
            .child_text("description")
            .ok_or_else(|| BootError::FactMissing("FPC 0 description".to_string()))?
            .to_uppercase();
        let serial = module
            .child_text("serial-number")
            .ok_or_else(|| BootError::FactMissing("FPC 0 serial-number".to_string()))?
            .to_string();

        self.set("model", model);
        self.set("serialnumber", serial);
        Ok(())
    }

    /// Convenience accessor for flat facts.
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.table.get(name) {
            Some(FactValue::Text(value)) => Some(value),
            _ => None,
        }
    }

    /// Serialize the fact table for the save file.
    pub fn to_json(&self) -> Result<String, BootError> {
        serde_json::to_string_pretty(&self.table)
            .map_err(|e| BootError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
    }
}

#[cfg(test)]
#[path = "facts_tests.rs"]
mod tests;
