// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Why a console transport could not be opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenFail {
    /// The physical port does not exist or refused the connection.
    PortNotReady,
    /// A terminal server reported the port as occupied by another session.
    PortInUse,
    /// The console server rejected the supplied credentials.
    AuthFailed,
}

impl OpenFail {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PortNotReady => "port not ready",
            Self::PortInUse => "port already in use",
            Self::AuthFailed => "auth failed",
        }
    }
}

/// Errors raised by the bootstrap engine.
///
/// Recoverable conditions (a failed load or commit) never show up here;
/// they are handled locally with a rollback and reflected in the
/// [`Outcome`](crate::outcome::Outcome). These variants are the
/// unrecoverable kinds that tear the session down.
#[derive(Debug)]
pub enum BootError {
    /// The console transport could not be opened.
    OpenFailed(OpenFail),
    /// The device rejected the login credentials.
    AuthFailed,
    /// The login state machine exhausted its attempt budget.
    LoginTimeout,
    /// The console was stuck in a stale XML session and could not be
    /// recovered by force-closing it.
    XmlHung,
    /// The configuration file was not found; raised before any transport
    /// is opened.
    MissingFile(PathBuf),
    /// An RPC reply was missing an expected element.
    FactMissing(String),
    /// No reply sentinel arrived within the reply deadline.
    RpcTimeout,
    /// A reply could not be parsed as XML.
    Xml(String),
    /// Transport-level read/write failure.
    Io(io::Error),
}

impl BootError {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenFailed(_) => "OPEN_FAILED",
            Self::AuthFailed => "AUTH_FAILED",
            Self::LoginTimeout => "LOGIN_TIMEOUT",
            Self::XmlHung => "XML_HUNG",
            Self::MissingFile(_) => "MISSING_FILE",
            Self::FactMissing(_) => "FACT_MISSING",
            Self::RpcTimeout => "RPC_TIMEOUT",
            Self::Xml(_) => "XML",
            Self::Io(_) => "IO",
        }
    }
}

impl fmt::Display for BootError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenFailed(reason) => write!(f, "open failed: {}", reason.as_str()),
            Self::AuthFailed => f.write_str("login failed: bad password"),
            Self::LoginTimeout => f.write_str("login state machine exceeded its attempt budget"),
            Self::XmlHung => {
                f.write_str("console is stuck in a stale XML session and did not recover")
            }
            Self::MissingFile(path) => write!(f, "no such file: {}", path.display()),
            Self::FactMissing(name) => write!(f, "reply is missing expected element: {name}"),
            Self::RpcTimeout => f.write_str("timed out waiting for an RPC reply"),
            Self::Xml(detail) => write!(f, "malformed XML reply: {detail}"),
            Self::Io(err) => write!(f, "console I/O error: {err}"),
        }
    }
}

impl std::error::Error for BootError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for BootError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
