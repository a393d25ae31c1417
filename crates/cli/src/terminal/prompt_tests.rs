// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{recognizer, PromptClass};

#[yare::parameterized(
    login = { "Amnesiac (ttyd0)\n\nlogin: ", PromptClass::Login },
    login_lowercase = { "login:", PromptClass::Login },
    password = { "Password: ", PromptClass::Password },
    password_lowercase = { "password:", PromptClass::Password },
    bad_password = { "Login incorrect\nlogin: ", PromptClass::BadPassword },
    shell = { "root@% ", PromptClass::Shell },
    shell_bare = { "%", PromptClass::Shell },
    shell_trailing_newline = { "root@device% \n", PromptClass::Shell },
    cli = { "root@device> ", PromptClass::Cli },
)]
fn classifies(buffer: &str, expected: PromptClass) {
    assert_eq!(recognizer().classify(buffer), Some(expected));
}

#[yare::parameterized(
    empty = { "" },
    banner = { "Amnesiac (ttyd0)" },
    xml_junk = { "<rpc-reply stale session data" },
    pager_arrow = { "---(more)--->" },
    mid_line_login = { "login: root session opened" },
)]
fn leaves_unrecognized_buffers_alone(buffer: &str) {
    assert_eq!(recognizer().classify(buffer), None);
}

#[test]
fn bad_password_wins_over_trailing_login_prompt() {
    // Both patterns are present; the failure notice must be seen first or
    // the machine would happily retry forever.
    let buffer = "Login incorrect\nlogin: ";
    assert_eq!(recognizer().classify(buffer), Some(PromptClass::BadPassword));
}

#[test]
fn prompt_names_match_capture_groups() {
    assert_eq!(PromptClass::Login.as_str(), "login");
    assert_eq!(PromptClass::Password.as_str(), "passwd");
    assert_eq!(PromptClass::BadPassword.as_str(), "badpasswd");
    assert_eq!(PromptClass::Shell.as_str(), "shell");
    assert_eq!(PromptClass::Cli.as_str(), "cli");
}
