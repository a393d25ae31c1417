// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Login state machine transition table.
//!
//! Pure `(state, observed prompt) -> (next state, step)` function; the
//! terminal drives it in a capped loop and performs the side effects. Keeping
//! the table pure makes the attempt cap a plain loop counter and lets the
//! monotonicity property be checked exhaustively in tests.

use crate::terminal::prompt::PromptClass;

/// Maximum recognizer rounds before the login attempt is abandoned.
pub const LOGIN_ATTEMPT_CAP: usize = 10;

/// Where the login sequence currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginState {
    Init,
    /// A stale XML session was detected and force-closed; waiting for the
    /// shell to come back.
    NcHung,
    LoginSent,
    PasswordSent,
    Done,
    BadPassword,
}

impl LoginState {
    /// Progress rank. Transitions never decrease it; `Done` and
    /// `BadPassword` are terminal.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Init => 0,
            Self::NcHung => 1,
            Self::LoginSent => 2,
            Self::PasswordSent => 3,
            Self::Done | Self::BadPassword => 4,
        }
    }
}

/// Side effect the terminal must perform after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Send the login user name.
    SendUser,
    /// Send the login password.
    SendPassword,
    /// Send a bare newline, then fail the login as rejected.
    FailBadPassword,
    /// Assume a stale XML session holds the console; force-close it.
    ForceCloseXml,
    /// Landed at the unix shell. `warn` marks the anomaly of a shell that
    /// was already open before we logged in.
    AtShell { warn: bool },
    /// Landed at the CLI prompt.
    AtCli,
    /// Nothing observed worth acting on; read again.
    Wait,
}

/// The transition table. Total over all `(state, prompt)` pairs.
pub fn transition(state: LoginState, prompt: Option<PromptClass>) -> (LoginState, Step) {
    use LoginState as S;
    use PromptClass as P;

    match (state, prompt) {
        // Terminal states absorb whatever arrives.
        (S::Done, _) => (S::Done, Step::Wait),
        (S::BadPassword, _) => (S::BadPassword, Step::Wait),

        // A rejected login is fatal from anywhere else.
        (_, Some(P::BadPassword)) => (S::BadPassword, Step::FailBadPassword),

        (_, Some(P::Shell)) => (S::Done, Step::AtShell { warn: state == S::Init }),
        (_, Some(P::Cli)) => (S::Done, Step::AtCli),

        (S::Init | S::NcHung | S::LoginSent, Some(P::Login)) => (S::LoginSent, Step::SendUser),
        // A login prompt after the password went out means the device is
        // offering another attempt; answer it without regressing the state.
        (S::PasswordSent, Some(P::Login)) => (S::PasswordSent, Step::SendUser),

        (S::Init | S::NcHung | S::LoginSent | S::PasswordSent, Some(P::Password)) => {
            (S::PasswordSent, Step::SendPassword)
        }

        // Nothing recognizable in INIT: assume the console is wedged inside
        // a previous XML session.
        (S::Init, None) => (S::NcHung, Step::ForceCloseXml),
        (S::NcHung | S::LoginSent | S::PasswordSent, None) => (state, Step::Wait),
    }
}

#[cfg(test)]
#[path = "login_tests.rs"]
mod tests;
