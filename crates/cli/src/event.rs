// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt;

/// Notification events emitted while a bootstrap session progresses.
///
/// Consumers receive `(event, message)` pairs through the terminal's
/// optional notifier callback; no callback means silence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Login,
    Logout,
    Facts,
    Conf,
    ConfLdErr,
    ConfSaveErr,
    Qfx,
    Change,
    SrxCluster,
    Zeroize,
    Shutdown,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Logout => "logout",
            Self::Facts => "facts",
            Self::Conf => "conf",
            Self::ConfLdErr => "conf_ld_err",
            Self::ConfSaveErr => "conf_save_err",
            Self::Qfx => "qfx",
            Self::Change => "change",
            Self::SrxCluster => "srx_cluster",
            Self::Zeroize => "zeroize",
            Self::Shutdown => "shutdown",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-supplied notification sink.
pub type NotifyFn = Box<dyn Fn(Event, &str)>;

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
