// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::Serialize;

use crate::facts::FactTable;

/// Structured result of one bootstrap run.
///
/// Recoverable failures (load or commit rejected) land here instead of in
/// an error: `failed` is set, `errmsg` explains, and the session still
/// logs out cleanly. `skip_logout` is set by the actions that reboot or
/// wipe the device; the far side tears the session down, so a logout
/// exchange would only hang.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Outcome {
    pub changed: bool,
    pub failed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errmsg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facts: Option<FactTable>,
    #[serde(skip)]
    pub skip_logout: bool,
}

impl Outcome {
    pub fn fail(&mut self, message: impl Into<String>) {
        self.failed = true;
        self.errmsg = Some(message.into());
    }
}
