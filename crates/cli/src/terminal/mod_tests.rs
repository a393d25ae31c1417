// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{BootError, OpenFail};
use crate::event::Event;
use crate::test_support::{as_strs, hello_frame, rpc_reply, shell_session, MockTransport, SHORT_TIMEOUT};

use super::{Credentials, Terminal};

fn terminal(mock: MockTransport) -> Terminal {
    Terminal::new(Box::new(mock), Credentials::default())
        .with_expect_timeout(SHORT_TIMEOUT)
        .with_reply_deadline(SHORT_TIMEOUT)
}

type Notes = Rc<RefCell<Vec<(Event, String)>>>;

fn recording_notifier(term: &mut Terminal) -> Notes {
    let notes: Notes = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&notes);
    term.set_notifier(Box::new(move |event, message| {
        sink.borrow_mut().push((event, message.to_string()));
    }));
    notes
}

#[test]
fn open_shell_is_accepted_with_a_warning() -> anyhow::Result<()> {
    // The console was left logged in at the shell.
    let mock = shell_session();
    let state = mock.state();
    let mut term = terminal(mock);
    let notes = recording_notifier(&mut term);

    term.login()?;

    assert!(term.at_shell());
    assert!(state.borrow().opened);
    assert!(notes
        .borrow()
        .iter()
        .any(|(event, message)| *event == Event::Login && message == "shell login was open!"));
    Ok(())
}

#[test]
fn standard_login_reaches_the_shell() -> anyhow::Result<()> {
    let mock = MockTransport::new()
        .with_reads(&["Amnesiac (ttyd0)\n", "login: "])
        .on_write("root", &["Password: "])
        .on_write("\n", &["root@% "])
        .on_write("xml-mode", &hello_frame());
    let state = mock.state();
    let mut term = terminal(mock);

    term.login()?;

    assert!(term.at_shell());
    let state = state.borrow();
    assert_eq!(state.writes_containing("root\n"), 1);
    assert_eq!(state.writes_containing("xml-mode netconf need-trailer"), 1);
    Ok(())
}

#[test]
fn cli_landing_uses_the_cli_entry_command() -> anyhow::Result<()> {
    let mock = MockTransport::new()
        .with_reads(&["root@device> "])
        .on_write("junoscript", &hello_frame());
    let state = mock.state();
    let mut term = terminal(mock);

    term.login()?;

    assert!(!term.at_shell());
    assert_eq!(state.borrow().writes_containing("junoscript netconf need-trailer"), 1);
    Ok(())
}

#[test]
fn stuck_xml_session_is_force_closed_and_recovered() -> anyhow::Result<()> {
    let mock = MockTransport::new()
        .with_reads(&["<rpc-reply stale session data", "  more stale output"])
        .on_write("close-session", &["root@% "])
        .on_write("xml-mode", &hello_frame());
    let state = mock.state();
    let mut term = terminal(mock);

    term.login()?;

    assert!(term.at_shell());
    assert_eq!(state.borrow().writes_containing("<rpc><close-session/></rpc>"), 1);
    Ok(())
}

#[test]
fn bad_password_is_fatal_before_any_rpc() {
    let mock = MockTransport::new()
        .with_reads(&["login: "])
        .on_write("root", &["Password: "])
        .on_write("\n", &["Login incorrect\n", "login: "]);
    let state = mock.state();
    let mut term = terminal(mock);

    let err = term.login();
    assert!(matches!(err, Err(BootError::AuthFailed)));
    drop(term);

    let state = state.borrow();
    assert_eq!(state.writes_containing("<rpc>"), 0);
    assert!(state.closed);
}

#[test]
fn port_in_use_is_fatal() {
    let mock =
        MockTransport::new().with_reads(&["Port 7016 is in use by another session\r\n"]);
    let mut term = terminal(mock);

    let err = term.login();
    assert!(matches!(err, Err(BootError::OpenFailed(OpenFail::PortInUse))));
}

#[test]
fn silent_console_after_login_prompt_times_out() {
    let mock = MockTransport::new().with_reads(&["login: "]);
    let mut term = terminal(mock);

    let err = term.login();
    assert!(matches!(err, Err(BootError::LoginTimeout)));
}

#[test]
fn unrecoverable_hung_session_reports_xml_hung() {
    let mock = MockTransport::new();
    let mut term = terminal(mock);

    let err = term.login();
    assert!(matches!(err, Err(BootError::XmlHung)));
}

#[test]
fn logout_closes_the_session_and_the_transport() -> anyhow::Result<()> {
    let goodbye = rpc_reply(&["<ok/>"]);
    let mock = shell_session()
        .on_write("close-session", &as_strs(&goodbye))
        .on_write("\n", &["root@% "]);
    let state = mock.state();
    let mut term = terminal(mock);

    term.login()?;
    term.logout()?;

    let state = state.borrow();
    assert_eq!(state.writes_containing("<rpc><close-session/></rpc>"), 1);
    assert_eq!(state.writes_containing("exit\n"), 1);
    assert!(state.closed);
    Ok(())
}

#[test]
fn drop_always_releases_the_transport() {
    let mock = MockTransport::new();
    let state = mock.state();
    {
        let mut term = terminal(mock);
        let _ = term.login();
    }
    assert!(state.borrow().closed);
}
