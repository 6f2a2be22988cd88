/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use crate::registries::atomic::view::View;
use crate::shell::session::SessionId;

/// Blank canvas area.
#[derive(Debug, Default)]
pub struct BlackView;

impl View for BlackView {
    fn title(&self) -> &str {
        super::VIEW_BLACK
    }
}

/// Per-session debug console.
#[derive(Debug)]
pub struct DebugView {
    session: SessionId,
    lines: Vec<String>,
}

impl DebugView {
    pub fn new(session: SessionId) -> Self {
        Self {
            session,
            lines: Vec::new(),
        }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn push_line(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl View for DebugView {
    fn title(&self) -> &str {
        super::VIEW_DEBUG
    }
}
