// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! XML-RPC framing over the console byte stream.
//!
//! The vendor's xml-mode frames every reply with the end-of-message
//! sentinel `]]>]]>` on its own line. That sentinel is the ONLY framing
//! marker: nothing is handed to the XML parser until the sentinel has been
//! observed, because configuration text inside a reply is full of ordinary
//! `>` characters that would otherwise terminate a scan early.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::BootError;
use crate::transport::Transport;
use crate::xml::{self, strip_junos_prefix, strip_xmlns, Element};

/// End-of-message sentinel terminating every xml-mode reply.
pub const NETCONF_EOM: &str = "]]>]]>";

/// How long to wait for the greeting banner after requesting xml-mode.
const HELLO_DEADLINE: Duration = Duration::from_secs(30);

/// Upper bound on one reply. Commits on slow supervisors take minutes;
/// anything past this means the console died mid-reply.
const REPLY_DEADLINE: Duration = Duration::from_secs(600);

/// Bound on draining the goodbye after `<close-session/>`.
const CLOSE_DRAIN: Duration = Duration::from_secs(10);

/// How a load/commit style request concluded: plain success, or the full
/// reply tree for the caller to inspect. Callers must match; failure can
/// not be silently treated as success.
#[derive(Debug, Clone, PartialEq)]
pub enum RpcOutcome {
    Ok,
    Reply(Element),
}

/// Load semantics understood by `load-configuration`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadAction {
    Override,
    Merge,
    Replace,
}

impl LoadAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Override => "override",
            Self::Merge => "merge",
            Self::Replace => "replace",
        }
    }
}

/// One xml-mode session multiplexed onto a console transport.
///
/// The session never owns the byte stream; every operation borrows the
/// transport for its duration, which keeps exactly one user of the console
/// at any moment.
#[derive(Debug)]
pub struct NetconfSession {
    hello: Option<Element>,
    reply_deadline: Duration,
}

impl Default for NetconfSession {
    fn default() -> Self {
        Self::new()
    }
}

impl NetconfSession {
    pub fn new() -> Self {
        Self { hello: None, reply_deadline: REPLY_DEADLINE }
    }

    /// Override the per-reply deadline (tests and unusually slow links).
    pub fn with_reply_deadline(mut self, deadline: Duration) -> Self {
        self.reply_deadline = deadline;
        self
    }

    /// True once the greeting has been consumed and until `close`.
    pub fn is_open(&self) -> bool {
        self.hello.is_some()
    }

    /// Start xml-mode and consume the greeting.
    ///
    /// The entry binary depends on where login landed: `xml-mode` is a
    /// shell command, `junoscript` the equivalent from the CLI prompt. The
    /// first reply line is a banner comment; everything before it is shell
    /// echo and terminal noise to be discarded.
    pub fn open(&mut self, tty: &mut dyn Transport, at_shell: bool) -> Result<(), BootError> {
        let entry = if at_shell { "xml-mode" } else { "junoscript" };
        tty.write(&format!("{entry} netconf need-trailer"))?;

        let deadline = Instant::now() + HELLO_DEADLINE;
        loop {
            if Instant::now() >= deadline {
                return Err(BootError::RpcTimeout);
            }
            let line = tty.readline()?;
            if line.trim_start().starts_with("<!--") {
                break;
            }
        }

        let hello = self.receive(tty)?;
        debug!(root = %hello.name, "xml-mode greeting consumed");
        self.hello = Some(hello);
        Ok(())
    }

    /// Read one framed reply and parse it.
    fn receive(&self, tty: &mut dyn Transport) -> Result<Element, BootError> {
        self.receive_within(tty, self.reply_deadline)
    }

    fn receive_within(
        &self,
        tty: &mut dyn Transport,
        budget: Duration,
    ) -> Result<Element, BootError> {
        let deadline = Instant::now() + budget;
        let mut lines: Vec<String> = Vec::new();
        loop {
            if Instant::now() >= deadline {
                return Err(BootError::RpcTimeout);
            }
            let line = tty.readline()?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if line == NETCONF_EOM {
                break;
            }
            lines.push(line.to_string());
        }

        // The envelope and its first child carry the namespace
        // declarations; the junos: prefix shows up anywhere.
        if let Some(first) = lines.first_mut() {
            *first = strip_xmlns(first);
        }
        if let Some(second) = lines.get_mut(1) {
            *second = strip_xmlns(second);
        }
        let text: String = lines.iter().map(|l| strip_junos_prefix(l)).collect();
        xml::parse(&text)
    }

    /// Write an RPC and return the first child of the `<rpc-reply>`
    /// envelope. A bare word is wrapped as `<word/>`.
    pub fn rpc(&mut self, tty: &mut dyn Transport, command: &str) -> Result<Element, BootError> {
        let command = if command.starts_with('<') {
            command.to_string()
        } else {
            format!("<{command}/>")
        };
        tty.rawwrite("<rpc>")?;
        tty.rawwrite(&command)?;
        tty.rawwrite("</rpc>")?;

        let reply = self.receive(tty)?;
        reply
            .into_first_child()
            .ok_or_else(|| BootError::Xml("rpc-reply envelope is empty".to_string()))
    }

    /// Load a text-format configuration. Success is the presence of any
    /// `<ok>` element in the reply; otherwise the reply is handed back.
    pub fn load(
        &mut self,
        tty: &mut dyn Transport,
        content: &str,
        action: LoadAction,
    ) -> Result<RpcOutcome, BootError> {
        let command = Element::new("load-configuration")
            .with_attr("format", "text")
            .with_attr("action", action.as_str())
            .with_child(Element::new("configuration-text").with_text(content));
        let reply = self.rpc(tty, &command.to_xml()?)?;
        if reply.find("ok").is_some() {
            Ok(RpcOutcome::Ok)
        } else {
            Ok(RpcOutcome::Reply(reply))
        }
    }

    /// Commit the candidate configuration. Success iff the reply root is
    /// `<ok>`.
    pub fn commit(&mut self, tty: &mut dyn Transport) -> Result<RpcOutcome, BootError> {
        let reply = self.rpc(tty, "<commit-configuration/>")?;
        if reply.name == "ok" {
            Ok(RpcOutcome::Ok)
        } else {
            Ok(RpcOutcome::Reply(reply))
        }
    }

    /// Validate the candidate configuration without activating it.
    pub fn commit_check(&mut self, tty: &mut dyn Transport) -> Result<RpcOutcome, BootError> {
        let reply = self.rpc(tty, "<commit-configuration><check/></commit-configuration>")?;
        if reply.name == "ok" {
            Ok(RpcOutcome::Ok)
        } else {
            Ok(RpcOutcome::Reply(reply))
        }
    }

    /// Discard the candidate configuration.
    pub fn rollback(&mut self, tty: &mut dyn Transport) -> Result<Element, BootError> {
        let command = Element::new("load-configuration")
            .with_attr("compare", "rollback")
            .with_attr("rollback", "0");
        self.rpc(tty, &command.to_xml()?)
    }

    /// End the xml-mode session. A forced close fires the request without
    /// waiting for a reply, used from the hung-session recovery path where
    /// no orderly reply is coming.
    pub fn close(&mut self, tty: &mut dyn Transport, force: bool) -> Result<(), BootError> {
        tty.rawwrite("<rpc><close-session/></rpc>")?;
        if !force {
            // Best effort: drain the goodbye so it does not pollute the
            // prompt scan that follows, but a silent peer is not an error.
            let budget = self.reply_deadline.min(CLOSE_DRAIN);
            match self.receive_within(tty, budget) {
                Ok(_) | Err(BootError::RpcTimeout) => {}
                Err(e) => return Err(e),
            }
        }
        self.hello = None;
        Ok(())
    }
}

#[cfg(test)]
#[path = "netconf_tests.rs"]
mod tests;
