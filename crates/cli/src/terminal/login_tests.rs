// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{transition, LoginState, Step, LOGIN_ATTEMPT_CAP};
use crate::terminal::prompt::PromptClass;

const ALL_STATES: [LoginState; 6] = [
    LoginState::Init,
    LoginState::NcHung,
    LoginState::LoginSent,
    LoginState::PasswordSent,
    LoginState::Done,
    LoginState::BadPassword,
];

const ALL_PROMPTS: [Option<PromptClass>; 6] = [
    Some(PromptClass::Login),
    Some(PromptClass::Password),
    Some(PromptClass::BadPassword),
    Some(PromptClass::Shell),
    Some(PromptClass::Cli),
    None,
];

#[yare::parameterized(
    init_login = { LoginState::Init, Some(PromptClass::Login), LoginState::LoginSent, Step::SendUser },
    init_password = { LoginState::Init, Some(PromptClass::Password), LoginState::PasswordSent, Step::SendPassword },
    init_shell = { LoginState::Init, Some(PromptClass::Shell), LoginState::Done, Step::AtShell { warn: true } },
    init_cli = { LoginState::Init, Some(PromptClass::Cli), LoginState::Done, Step::AtCli },
    init_unknown = { LoginState::Init, None, LoginState::NcHung, Step::ForceCloseXml },
    sent_password_prompt = { LoginState::LoginSent, Some(PromptClass::Password), LoginState::PasswordSent, Step::SendPassword },
    sent_shell = { LoginState::LoginSent, Some(PromptClass::Shell), LoginState::Done, Step::AtShell { warn: false } },
    sent_cli = { LoginState::LoginSent, Some(PromptClass::Cli), LoginState::Done, Step::AtCli },
    password_shell = { LoginState::PasswordSent, Some(PromptClass::Shell), LoginState::Done, Step::AtShell { warn: false } },
    password_cli = { LoginState::PasswordSent, Some(PromptClass::Cli), LoginState::Done, Step::AtCli },
    password_second_login = { LoginState::PasswordSent, Some(PromptClass::Login), LoginState::PasswordSent, Step::SendUser },
    hung_shell = { LoginState::NcHung, Some(PromptClass::Shell), LoginState::Done, Step::AtShell { warn: false } },
    hung_cli = { LoginState::NcHung, Some(PromptClass::Cli), LoginState::Done, Step::AtCli },
    hung_still_quiet = { LoginState::NcHung, None, LoginState::NcHung, Step::Wait },
    bad_password_from_init = { LoginState::Init, Some(PromptClass::BadPassword), LoginState::BadPassword, Step::FailBadPassword },
    bad_password_after_password = { LoginState::PasswordSent, Some(PromptClass::BadPassword), LoginState::BadPassword, Step::FailBadPassword },
)]
fn table(
    state: LoginState,
    prompt: Option<PromptClass>,
    expect_state: LoginState,
    expect_step: Step,
) {
    assert_eq!(transition(state, prompt), (expect_state, expect_step));
}

/// The state only ever moves forward; the single sideways move is the
/// INIT -> NC_HUNG recovery, which still increases the progress rank.
#[test]
fn state_rank_never_decreases() {
    for state in ALL_STATES {
        for prompt in ALL_PROMPTS {
            let (next, _) = transition(state, prompt);
            assert!(
                next.rank() >= state.rank(),
                "{state:?} + {prompt:?} regressed to {next:?}"
            );
        }
    }
}

#[test]
fn done_is_absorbing() {
    for prompt in ALL_PROMPTS {
        let (next, step) = transition(LoginState::Done, prompt);
        assert_eq!(next, LoginState::Done);
        assert_eq!(step, Step::Wait);
    }
}

#[test]
fn force_close_only_fires_from_init() {
    for state in ALL_STATES {
        for prompt in ALL_PROMPTS {
            let (_, step) = transition(state, prompt);
            if step == Step::ForceCloseXml {
                assert_eq!(state, LoginState::Init);
                assert_eq!(prompt, None);
            }
        }
    }
}

#[test]
fn attempt_cap_is_ten() {
    assert_eq!(LOGIN_ATTEMPT_CAP, 10);
}
