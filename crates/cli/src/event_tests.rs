// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::Event;

#[yare::parameterized(
    login = { Event::Login, "login" },
    logout = { Event::Logout, "logout" },
    facts = { Event::Facts, "facts" },
    conf = { Event::Conf, "conf" },
    conf_ld_err = { Event::ConfLdErr, "conf_ld_err" },
    conf_save_err = { Event::ConfSaveErr, "conf_save_err" },
    qfx = { Event::Qfx, "qfx" },
    change = { Event::Change, "change" },
    srx_cluster = { Event::SrxCluster, "srx_cluster" },
    zeroize = { Event::Zeroize, "zeroize" },
    shutdown = { Event::Shutdown, "shutdown" },
)]
fn wire_names(event: Event, expected: &str) {
    assert_eq!(event.as_str(), expected);
    assert_eq!(event.to_string(), expected);
}
