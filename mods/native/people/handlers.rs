/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use crate::registries::atomic::handler::{
    ContentObject, Handler, HandlerContext, HandlerDescriptor, HandlerKind,
};
use crate::shell::session::SessionId;

use super::{HANDLER_PERSON_FORM, HANDLER_TOOLKIT_EDITOR, Person};

/// Form editing one [`Person`].
#[derive(Debug)]
pub struct PersonForm {
    object: ContentObject,
    session: SessionId,
}

impl PersonForm {
    pub fn person(&self) -> Option<&Person> {
        self.object.downcast_ref::<Person>()
    }

    pub fn session(&self) -> SessionId {
        self.session
    }
}

impl Handler for PersonForm {
    fn handler_id(&self) -> &str {
        HANDLER_PERSON_FORM
    }

    fn object(&self) -> &ContentObject {
        &self.object
    }

    fn title(&self) -> String {
        match self.person() {
            Some(person) => format!("{} ({})", person.name, person.age),
            None => self.object.key().to_string(),
        }
    }
}

/// Generic property editor for any object the form does not cover.
#[derive(Debug)]
pub struct ToolkitEditor {
    object: ContentObject,
    kind: HandlerKind,
}

impl ToolkitEditor {
    pub fn kind(&self) -> &HandlerKind {
        &self.kind
    }
}

impl Handler for ToolkitEditor {
    fn handler_id(&self) -> &str {
        HANDLER_TOOLKIT_EDITOR
    }

    fn object(&self) -> &ContentObject {
        &self.object
    }

    fn title(&self) -> String {
        format!("{} [{}]", self.object.key(), self.object.type_name())
    }
}

pub(super) fn person_form_descriptor() -> HandlerDescriptor {
    HandlerDescriptor::for_type::<Person, _>(HANDLER_PERSON_FORM, |context, object| {
        Box::new(PersonForm {
            object: object.clone(),
            session: context.session,
        })
    })
    .for_kind(HandlerKind::editor())
}

pub(super) fn toolkit_editor(context: &HandlerContext, object: &ContentObject) -> Box<dyn Handler> {
    Box::new(ToolkitEditor {
        object: object.clone(),
        kind: context.kind.clone(),
    })
}
