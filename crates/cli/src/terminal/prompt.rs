// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Console prompt recognizer.
//!
//! A single alternation of named groups is tried against the accumulated
//! read buffer. The patterns are anchored at end-of-buffer and drop the
//! first letter of each keyword because some consoles capitalize it.
//! The CLI pattern excludes `-` before `>` so banner arrows like
//! `---(more)--->` are not mistaken for a prompt.

use std::sync::LazyLock;

use regex::Regex;

/// Prompt classes the recognizer can name. An unrecognized buffer has no
/// class; callers see `None` when the read window closes without a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptClass {
    Login,
    Password,
    BadPassword,
    Shell,
    Cli,
}

impl PromptClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Password => "passwd",
            Self::BadPassword => "badpasswd",
            Self::Shell => "shell",
            Self::Cli => "cli",
        }
    }
}

const PROMPT_PATTERN: &str = concat!(
    r"(?P<login>ogin:\s*$)",
    r"|(?P<passwd>assword:\s*$)",
    r"|(?P<badpasswd>ogin incorrect)",
    r"|(?P<shell>%\s*$)",
    r"|(?P<cli>[^-]>\s*$)",
);

#[allow(clippy::expect_used)]
static PROMPT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PROMPT_PATTERN).expect("static pattern compiles"));

/// Compiled prompt recognizer. One process-wide instance is shared through
/// [`recognizer`]; the type exists so tests and the transport `expect` loop
/// can hold a reference without touching the static directly.
#[derive(Debug)]
pub struct Recognizer {
    re: &'static Regex,
}

impl Recognizer {
    /// Classify the accumulated read buffer, if any named group matches.
    pub fn classify(&self, buffer: &str) -> Option<PromptClass> {
        let caps = self.re.captures(buffer)?;
        if caps.name("login").is_some() {
            Some(PromptClass::Login)
        } else if caps.name("passwd").is_some() {
            Some(PromptClass::Password)
        } else if caps.name("badpasswd").is_some() {
            Some(PromptClass::BadPassword)
        } else if caps.name("shell").is_some() {
            Some(PromptClass::Shell)
        } else if caps.name("cli").is_some() {
            Some(PromptClass::Cli)
        } else {
            None
        }
    }
}

/// The process-wide recognizer, compiled on first use.
pub fn recognizer() -> &'static Recognizer {
    static RECOGNIZER: LazyLock<Recognizer> =
        LazyLock::new(|| Recognizer { re: &PROMPT_RE });
    &RECOGNIZER
}

#[cfg(test)]
#[path = "prompt_tests.rs"]
mod tests;
