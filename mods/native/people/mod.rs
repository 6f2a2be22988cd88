/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! People workbench mod.
//!
//! A small domain (people with a name and an age) used to exercise every
//! part of the shell: a gated `File > New Person` command, an ungated exit
//! on the toolbar, a form handler with a generic editor fallback, two views
//! and the `Foo` and `Bar` layouts over them.

mod handlers;
mod views;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::registries::atomic::capability::CapabilitySet;
use crate::registries::atomic::command::{Command, CommandProxy, ShellIntent};
use crate::registries::atomic::handler::{ContentObject, HandlerKind};
use crate::registries::atomic::menu::{GroupTarget, StaticContributor};
use crate::registries::atomic::view::ViewDescriptor;
use crate::registries::domain::layout::Placement;
use crate::registries::domain::layout::anchor::Anchor;
use crate::shell::ShellBuilder;

pub use handlers::{PersonForm, ToolkitEditor};
pub use views::{BlackView, DebugView};

pub const NEW_PERSON_PERM: &str = "NewPersonPerm";

pub const CMD_NEW_PERSON: &str = "file.new_person";
pub const CMD_EXIT: &str = "file.exit";

pub const HANDLER_PERSON_FORM: &str = "people.person_form";
pub const HANDLER_TOOLKIT_EDITOR: &str = "people.toolkit_editor";

pub const VIEW_BLACK: &str = "Black";
pub const VIEW_DEBUG: &str = "Debug";

pub const LAYOUT_FOO: &str = "Foo";
pub const LAYOUT_BAR: &str = "Bar";

const CONTRIBUTOR_ID: &str = "people";
const FILE_MENU: &str = "File";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    pub age: u32,
}

impl Person {
    pub fn new(name: impl Into<String>, age: u32) -> Self {
        Self {
            name: name.into(),
            age,
        }
    }

    /// Wraps the person for the handler resolver, keyed by name.
    pub fn into_object(self) -> ContentObject {
        ContentObject::new(format!("person:{}", self.name), self)
    }
}

pub fn new_person_command() -> CommandProxy {
    CommandProxy::new(
        Command::new(CMD_NEW_PERSON, "New Person", || {
            vec![ShellIntent::Edit {
                object: Person::new("New", 100).into_object(),
                kind: HandlerKind::editor(),
            }]
        })
        .requiring(CapabilitySet::of([NEW_PERSON_PERM])),
    )
}

pub fn exit_command() -> CommandProxy {
    CommandProxy::new(Command::new(CMD_EXIT, "Exit", || vec![ShellIntent::Exit]))
}

/// Adds the people contributor, handlers, views and layouts to `builder`.
pub fn install(builder: ShellBuilder) -> ShellBuilder {
    let exit = exit_command();
    let contributor = StaticContributor::new(CONTRIBUTOR_ID)
        .command(GroupTarget::new(FILE_MENU, "new"), new_person_command())
        .command(GroupTarget::new(FILE_MENU, "exit"), exit.clone())
        .toolbar(exit);

    log::debug!("people: installing commands, handlers, views and layouts");

    builder
        .contributor(Arc::new(contributor))
        .handler(handlers::person_form_descriptor())
        .fallback_handler(HANDLER_TOOLKIT_EDITOR, handlers::toolkit_editor)
        .view(ViewDescriptor::new(VIEW_BLACK, |_| Box::new(BlackView::default())))
        .view(ViewDescriptor::new(VIEW_DEBUG, |session| {
            Box::new(DebugView::new(session))
        }))
        .layout(
            LAYOUT_FOO,
            vec![
                Placement::new(VIEW_BLACK, Anchor::Bottom),
                Placement::new(VIEW_DEBUG, Anchor::Left),
            ],
        )
        .layout(LAYOUT_BAR, vec![Placement::new(VIEW_DEBUG, Anchor::Left)])
}
