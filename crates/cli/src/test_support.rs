// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test infrastructure: a scripted console transport and reply
//! builders for driving the engine without hardware.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::error::{BootError, OpenFail};
use crate::transport::Transport;

/// One scripted exchange: when a write containing `trigger` reaches the
/// front of the script, the lines are queued for subsequent reads.
#[derive(Debug, Clone)]
struct ReplyRule {
    trigger: String,
    lines: Vec<String>,
}

/// Inspectable state shared between a [`MockTransport`] and the test that
/// built it.
#[derive(Debug, Default)]
pub struct MockState {
    reads: VecDeque<String>,
    rules: VecDeque<ReplyRule>,
    /// Every payload written, newline included for line writes.
    pub writes: Vec<String>,
    pub opened: bool,
    pub closed: bool,
    pub fail_open: Option<OpenFail>,
}

impl MockState {
    /// Count writes whose payload contains `needle`.
    pub fn writes_containing(&self, needle: &str) -> usize {
        self.writes.iter().filter(|w| w.contains(needle)).count()
    }
}

/// Scripted console: reads come from a queue, writes are recorded, and
/// write triggers release further reads in strict script order.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    state: Rc<RefCell<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue lines available to `readline` immediately after open.
    pub fn with_reads(self, lines: &[&str]) -> Self {
        self.state.borrow_mut().reads.extend(lines.iter().map(|l| l.to_string()));
        self
    }

    /// Append a scripted exchange. Rules fire in order, each at most once.
    pub fn on_write(self, trigger: &str, lines: &[&str]) -> Self {
        self.state.borrow_mut().rules.push_back(ReplyRule {
            trigger: trigger.to_string(),
            lines: lines.iter().map(|l| l.to_string()).collect(),
        });
        self
    }

    /// Make `open` fail with the given reason.
    pub fn failing_open(self, reason: OpenFail) -> Self {
        self.state.borrow_mut().fail_open = Some(reason);
        self
    }

    /// Handle for post-run assertions; survives the transport being boxed
    /// and moved into a terminal.
    pub fn state(&self) -> Rc<RefCell<MockState>> {
        Rc::clone(&self.state)
    }

    fn record(&mut self, payload: String) {
        let mut state = self.state.borrow_mut();
        let fired =
            state.rules.front().is_some_and(|rule| payload.contains(&rule.trigger));
        if fired {
            if let Some(rule) = state.rules.pop_front() {
                state.reads.extend(rule.lines);
            }
        }
        state.writes.push(payload);
    }
}

impl Transport for MockTransport {
    fn open(&mut self) -> Result<(), BootError> {
        let mut state = self.state.borrow_mut();
        if let Some(reason) = state.fail_open {
            return Err(BootError::OpenFailed(reason));
        }
        state.opened = true;
        Ok(())
    }

    fn close(&mut self) -> Result<(), BootError> {
        self.state.borrow_mut().closed = true;
        Ok(())
    }

    fn write(&mut self, content: &str) -> Result<(), BootError> {
        self.record(format!("{content}\n"));
        Ok(())
    }

    fn rawwrite(&mut self, content: &str) -> Result<(), BootError> {
        self.record(content.to_string());
        Ok(())
    }

    fn readline(&mut self) -> Result<String, BootError> {
        Ok(self.state.borrow_mut().reads.pop_front().unwrap_or_default())
    }
}

/// Deadline used by scripted tests: everything a script provides is
/// available immediately, so a short window only bounds the failure case.
pub const SHORT_TIMEOUT: std::time::Duration = std::time::Duration::from_millis(25);

/// A console already sitting at the shell prompt, scripted through the
/// xml-mode greeting. The usual starting point for session-level tests.
pub fn shell_session() -> MockTransport {
    MockTransport::new().with_reads(&["root@% "]).on_write("xml-mode", &hello_frame())
}

/// The banner-plus-greeting a device emits when xml-mode starts.
pub fn hello_frame() -> Vec<&'static str> {
    vec![
        "<!-- user interface starting -->",
        "<hello xmlns=\"urn:ietf:params:xml:ns:netconf:base:1.0\">",
        "<capabilities>",
        "<capability>urn:ietf:params:netconf:base:1.0</capability>",
        "</capabilities>",
        "</hello>",
        "]]>]]>",
    ]
}

/// Wrap reply body lines in the `<rpc-reply>` envelope and sentinel.
pub fn rpc_reply(body: &[&str]) -> Vec<String> {
    let mut lines =
        vec!["<rpc-reply xmlns=\"urn:ietf:params:xml:ns:netconf:base:1.0\">".to_string()];
    lines.extend(body.iter().map(|l| l.to_string()));
    lines.push("</rpc-reply>".to_string());
    lines.push("]]>]]>".to_string());
    lines
}

/// `on_write` wants `&[&str]`; this adapts an owned reply.
pub fn as_strs(lines: &[String]) -> Vec<&str> {
    lines.iter().map(String::as_str).collect()
}
