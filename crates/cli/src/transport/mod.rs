// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Byte-oriented console transports.
//!
//! Three substrates carry the same full-duplex, line-readable pipe: a local
//! serial port, a telnet connection to a terminal server, and an SSH shell
//! on a console server. Everything above this module is substrate-agnostic.

pub mod serial;
pub mod ssh;
pub mod telnet;

pub use serial::SerialConsole;
pub use ssh::SshConsole;
pub use telnet::TelnetConsole;

use std::time::{Duration, Instant};

use crate::error::BootError;
use crate::terminal::prompt::{PromptClass, Recognizer};

/// Per-read poll timeout: how long a single `readline` waits for bytes.
pub const POLL_TIMEOUT: Duration = Duration::from_millis(200);

/// Overall `expect` budget: how long the prompt scan may accumulate input.
pub const EXPECT_TIMEOUT: Duration = Duration::from_secs(10);

/// A console byte pipe.
///
/// `readline` returns one newline-terminated line, or whatever partial
/// input arrived before the poll timeout (possibly the empty string on a
/// silent poll). Prompts never end in a newline, so partial reads are the
/// normal way prompt text reaches the caller.
pub trait Transport {
    fn open(&mut self) -> Result<(), BootError>;

    /// Best-effort flush and release. Idempotent.
    fn close(&mut self) -> Result<(), BootError>;

    /// Send `content` followed by a newline.
    fn write(&mut self, content: &str) -> Result<(), BootError>;

    /// Send `content` exactly as given.
    fn rawwrite(&mut self, content: &str) -> Result<(), BootError>;

    fn readline(&mut self) -> Result<String, BootError>;

    /// Accumulate console output until the recognizer names a prompt or the
    /// overall deadline passes. The deadline is computed once, up front,
    /// from the monotonic clock.
    fn expect(
        &mut self,
        recognizer: &Recognizer,
        overall: Duration,
    ) -> Result<(String, Option<PromptClass>), BootError> {
        let deadline = Instant::now() + overall;
        let mut buffer = String::new();
        while Instant::now() < deadline {
            let chunk = self.readline()?;
            if chunk.is_empty() {
                continue;
            }
            buffer.push_str(&chunk);
            if let Some(class) = recognizer.classify(&buffer) {
                return Ok((buffer, Some(class)));
            }
        }
        Ok((buffer, None))
    }
}

/// Which console substrate to use and how to reach it.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportConfig {
    Serial {
        device: String,
        baud: u32,
        timeout: Duration,
    },
    Telnet {
        host: String,
        port: u16,
        timeout: Duration,
        /// Pace writes as if the far side ran at this rate; 0 disables.
        baud: u32,
    },
    Ssh {
        host: String,
        port: u16,
        user: String,
        password: String,
        timeout: Duration,
        attempts: u32,
    },
}

impl TransportConfig {
    /// Short human-readable identity of the console endpoint, used as the
    /// fallback device name for save files.
    pub fn label(&self) -> String {
        match self {
            Self::Serial { device, .. } => {
                device.rsplit('/').next().unwrap_or(device).to_string()
            }
            Self::Telnet { host, port, .. } | Self::Ssh { host, port, .. } => {
                format!("{host}-{port}")
            }
        }
    }

    pub fn build(&self) -> Box<dyn Transport> {
        match self {
            Self::Serial { device, baud, timeout } => {
                Box::new(SerialConsole::new(device.clone(), *baud, *timeout))
            }
            Self::Telnet { host, port, timeout, baud } => {
                Box::new(TelnetConsole::new(host.clone(), *port, *timeout, *baud))
            }
            Self::Ssh { host, port, user, password, timeout, attempts } => {
                Box::new(SshConsole::new(
                    host.clone(),
                    *port,
                    user.clone(),
                    password.clone(),
                    *timeout,
                    *attempts,
                ))
            }
        }
    }
}

/// Split one full line (through its newline) off the front of a pending
/// byte buffer, if one is present.
pub(crate) fn drain_line(pending: &mut Vec<u8>) -> Option<String> {
    let pos = pending.iter().position(|&b| b == b'\n')?;
    let line: Vec<u8> = pending.drain(..=pos).collect();
    Some(String::from_utf8_lossy(&line).into_owned())
}

/// Take everything currently pending, newline or not. Used when a poll
/// window closes so prompt text is not held back.
pub(crate) fn drain_all(pending: &mut Vec<u8>) -> String {
    String::from_utf8_lossy(&std::mem::take(pending)).into_owned()
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
