// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal driver: takes an unknown console to a known state.
//!
//! The console may sit anywhere in the prompt space when a session starts:
//! a login banner, a half-typed password, an abandoned shell, or wedged
//! inside a previous XML session. `login` drives it to a shell or CLI
//! prompt from any starting point, then starts the xml-mode session used by
//! facts gathering and the configuration actions.

pub mod login;
pub mod prompt;

use std::time::Duration;

use tracing::debug;

use crate::error::{BootError, OpenFail};
use crate::event::{Event, NotifyFn};
use crate::netconf::{LoadAction, NetconfSession, RpcOutcome};
use crate::terminal::login::{transition, LoginState, Step, LOGIN_ATTEMPT_CAP};
use crate::terminal::prompt::recognizer;
use crate::transport::{Transport, EXPECT_TIMEOUT};
use crate::xml::Element;

/// Device login identity. Factory-fresh devices ship with `root` and an
/// empty password.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub user: String,
    pub password: String,
    /// Connect retry budget for console servers.
    pub attempts: u32,
}

impl Default for Credentials {
    fn default() -> Self {
        Self { user: "root".to_string(), password: String::new(), attempts: 1 }
    }
}

/// One console session: owns the transport and the xml-mode session state.
pub struct Terminal {
    transport: Box<dyn Transport>,
    creds: Credentials,
    nc: NetconfSession,
    at_shell: bool,
    badpasswd_seen: u32,
    expect_timeout: Duration,
    notifier: Option<NotifyFn>,
}

impl Terminal {
    pub fn new(transport: Box<dyn Transport>, creds: Credentials) -> Self {
        Self {
            transport,
            creds,
            nc: NetconfSession::new(),
            at_shell: false,
            badpasswd_seen: 0,
            expect_timeout: EXPECT_TIMEOUT,
            notifier: None,
        }
    }

    /// Override the prompt-scan budget (tests drive this down hard).
    pub fn with_expect_timeout(mut self, timeout: Duration) -> Self {
        self.expect_timeout = timeout;
        self
    }

    /// Override the xml-mode reply deadline.
    pub fn with_reply_deadline(mut self, deadline: Duration) -> Self {
        self.nc = NetconfSession::new().with_reply_deadline(deadline);
        self
    }

    pub fn set_notifier(&mut self, notifier: NotifyFn) {
        self.notifier = Some(notifier);
    }

    /// Emit a progress notification, if anyone is listening.
    pub fn notify(&self, event: Event, message: &str) {
        if let Some(notifier) = &self.notifier {
            notifier(event, message);
        }
    }

    /// Whether login landed at the unix shell (vs. the CLI prompt).
    pub fn at_shell(&self) -> bool {
        self.at_shell
    }

    /// Open the console, drive the login state machine to a prompt, and
    /// start the xml-mode session.
    pub fn login(&mut self) -> Result<(), BootError> {
        self.notify(Event::Login, "connecting to terminal port ...");
        self.transport.open()?;
        // Wake the console so it shows whatever prompt it is sitting at.
        self.transport.write("")?;

        self.notify(Event::Login, "logging in ...");
        self.run_login_machine()?;

        self.notify(Event::Login, "starting the XML management session");
        self.nc.open(self.transport.as_mut(), self.at_shell)?;
        Ok(())
    }

    fn run_login_machine(&mut self) -> Result<(), BootError> {
        let mut state = LoginState::Init;
        let mut hung_recovery = false;

        for attempt in 0..LOGIN_ATTEMPT_CAP {
            let (buffer, observed) =
                self.transport.expect(recognizer(), self.expect_timeout)?;
            if buffer.contains("in use") {
                return Err(BootError::OpenFailed(OpenFail::PortInUse));
            }

            let (next, step) = transition(state, observed);
            debug!(?state, ?observed, ?next, attempt, "login transition");
            state = next;

            match step {
                Step::SendUser => self.transport.write(&self.creds.user)?,
                Step::SendPassword => self.transport.write(&self.creds.password)?,
                Step::FailBadPassword => {
                    self.badpasswd_seen += 1;
                    debug!(rejections = self.badpasswd_seen, "login rejected");
                    self.transport.write("")?;
                    return Err(BootError::AuthFailed);
                }
                Step::ForceCloseXml => {
                    hung_recovery = true;
                    self.nc.close(self.transport.as_mut(), true)?;
                }
                Step::AtShell { warn } => {
                    if warn {
                        self.notify(Event::Login, "shell login was open!");
                    }
                    self.at_shell = true;
                }
                Step::AtCli => self.at_shell = false,
                Step::Wait => {}
            }

            if state == LoginState::Done {
                return Ok(());
            }
        }

        Err(if hung_recovery { BootError::XmlHung } else { BootError::LoginTimeout })
    }

    /// Close the xml-mode session, resync to a prompt, and exit cleanly.
    pub fn logout(&mut self) -> Result<(), BootError> {
        self.notify(Event::Logout, "logging out ...");
        if self.nc.is_open() {
            self.nc.close(self.transport.as_mut(), false)?;
        }

        // A blank line makes the console repaint its prompt; wait for it
        // before issuing exit so the command is not swallowed mid-banner.
        self.transport.write("")?;
        let _ = self.transport.expect(recognizer(), self.expect_timeout)?;
        self.transport.write("exit")?;
        self.transport.close()
    }

    // xml-mode operations, delegated so callers never juggle the borrow of
    // the transport alongside the session state.

    pub fn rpc(&mut self, command: &str) -> Result<Element, BootError> {
        self.nc.rpc(self.transport.as_mut(), command)
    }

    pub fn load(&mut self, content: &str, action: LoadAction) -> Result<RpcOutcome, BootError> {
        self.nc.load(self.transport.as_mut(), content, action)
    }

    pub fn commit(&mut self) -> Result<RpcOutcome, BootError> {
        self.nc.commit(self.transport.as_mut())
    }

    pub fn commit_check(&mut self) -> Result<RpcOutcome, BootError> {
        self.nc.commit_check(self.transport.as_mut())
    }

    pub fn rollback(&mut self) -> Result<Element, BootError> {
        self.nc.rollback(self.transport.as_mut())
    }
}

impl Drop for Terminal {
    /// Pair every transport open with a close, whatever path unwinds.
    fn drop(&mut self) {
        let _ = self.transport.close();
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
