/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! One live shell instance.
//!
//! A session owns its actor binding, its private view instances, its active
//! layout and the editors it has opened. Menu structure is built once when
//! the session opens; enablement is computed from the actor on every query.

use std::fmt;
use std::sync::Arc;

use crossbeam_channel::Receiver;

use crate::error::{Result, ShellError};
use crate::registries::atomic::command::{CommandExecution, CommandProxy, ShellIntent};
use crate::registries::atomic::handler::{
    ContentObject, Handler, HandlerChain, HandlerContext, HandlerKind, MatchTier, ObjectKey,
};
use crate::registries::atomic::menu::{MenuRow, MenuTree, ToolBar};
use crate::registries::atomic::view::ViewInstancePool;
use crate::registries::domain::layout::anchor::Anchor;
use crate::shell::ShellCore;
use crate::shell::identity::{Actor, IdentityEvent};

pub(crate) const CHANNEL_SESSION: &str = "shell.session";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(uuid::Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session:{}", self.0)
    }
}

/// Whether the session follows the identity source's current actor or
/// stays bound to one actor for its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorBinding {
    FollowCurrent,
    Fixed,
}

/// A handler opened by this session for one object.
#[derive(Debug)]
pub struct OpenEditor {
    pub object_key: ObjectKey,
    pub kind: HandlerKind,
    pub handler_id: String,
    pub matched_by: MatchTier,
    pub handler: Box<dyn Handler>,
}

pub struct Session {
    id: SessionId,
    core: Arc<ShellCore>,
    actor: Actor,
    binding: ActorBinding,
    identity_events: Receiver<IdentityEvent>,
    menu: MenuTree,
    toolbar: ToolBar,
    views: ViewInstancePool,
    active_layout: Option<String>,
    editors: Vec<OpenEditor>,
    closed: bool,
}

impl Session {
    /// Structural setup: menu, toolbar, views, then the default layout.
    /// Any configuration failure aborts construction.
    pub(crate) fn open(core: Arc<ShellCore>, actor: Actor, binding: ActorBinding) -> Result<Self> {
        let id = SessionId::new();
        let identity_events = core.identity.subscribe();
        let menu = core.menu_builder.build(&core.contributors)?;
        let toolbar = core.menu_builder.build_toolbar(&core.contributors);
        let views = ViewInstancePool::instantiate(id, core.views.descriptors())?;

        let mut session = Self {
            id,
            core,
            actor,
            binding,
            identity_events,
            menu,
            toolbar,
            views,
            active_layout: None,
            editors: Vec::new(),
            closed: false,
        };

        if let Some(name) = session.core.default_layout.clone() {
            session.activate_layout(&name)?;
        }

        log::info!(
            target: CHANNEL_SESSION,
            "opened {} for actor '{}'",
            session.id,
            session.actor.id()
        );
        Ok(session)
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn actor_binding(&self) -> ActorBinding {
        self.binding
    }

    pub fn menu(&self) -> &MenuTree {
        &self.menu
    }

    pub fn toolbar(&self) -> &ToolBar {
        &self.toolbar
    }

    pub fn views(&self) -> &ViewInstancePool {
        &self.views
    }

    pub fn views_mut(&mut self) -> &mut ViewInstancePool {
        &mut self.views
    }

    pub fn active_layout(&self) -> Option<&str> {
        self.active_layout.as_deref()
    }

    pub fn editors(&self) -> &[OpenEditor] {
        &self.editors
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn placements(&self) -> Vec<(&str, &Anchor)> {
        self.views.placements()
    }

    pub fn unplaced_views(&self) -> Vec<&str> {
        self.views.unplaced()
    }

    /// Menu rows with enablement evaluated for the bound actor right now.
    pub fn menu_snapshot(&self) -> Vec<MenuRow> {
        self.menu.snapshot(&self.actor)
    }

    fn find_command(&self, command_id: &str) -> Result<&CommandProxy> {
        self.menu
            .find(command_id)
            .or_else(|| self.toolbar.find(command_id))
            .ok_or_else(|| ShellError::UnknownCommand(command_id.to_string()))
    }

    pub fn is_enabled(&self, command_id: &str) -> Result<bool> {
        Ok(self.find_command(command_id)?.is_enabled(&self.actor))
    }

    /// Runs a command through its gate and applies the intents it returns,
    /// in order. An intent that fails stops the remaining ones; the command
    /// itself has already run at that point.
    pub fn invoke(&mut self, command_id: &str) -> Result<CommandExecution> {
        self.ensure_open()?;
        let execution = self.find_command(command_id)?.invoke(&self.actor)?;
        for intent in &execution.intents {
            self.apply_intent(intent)?;
        }
        Ok(execution)
    }

    fn apply_intent(&mut self, intent: &ShellIntent) -> Result<()> {
        match intent {
            ShellIntent::Edit { object, kind } => self.edit(object.clone(), kind.clone()).map(|_| ()),
            ShellIntent::ActivateLayout(name) => self.activate_layout(name),
            ShellIntent::Exit => {
                self.close();
                Ok(())
            }
        }
    }

    pub fn activate_layout(&mut self, name: &str) -> Result<()> {
        self.ensure_open()?;
        self.core.layouts.activate(name, &mut self.views)?;
        self.active_layout = Some(name.to_string());
        Ok(())
    }

    pub fn edit(&mut self, object: ContentObject, kind: HandlerKind) -> Result<&OpenEditor> {
        self.edit_with(object, kind, None)
    }

    /// Opens `object` in a handler of `kind`, consulting `overrides` ahead of
    /// the shell's standard chain. An object already open in a handler of
    /// the same kind returns that editor unchanged.
    pub fn edit_with(
        &mut self,
        object: ContentObject,
        kind: HandlerKind,
        overrides: Option<&HandlerChain>,
    ) -> Result<&OpenEditor> {
        self.ensure_open()?;

        if let Some(index) = self
            .editors
            .iter()
            .position(|editor| editor.object_key == *object.key() && editor.kind == kind)
        {
            log::debug!(target: CHANNEL_SESSION, "{} already open", object.key());
            return Ok(&self.editors[index]);
        }

        let context = HandlerContext {
            session: self.id,
            kind: kind.clone(),
        };
        let resolution = self.core.handlers.resolve(&object, &context, overrides)?;
        self.editors.push(OpenEditor {
            object_key: object.key().clone(),
            kind,
            handler_id: resolution.handler_id,
            matched_by: resolution.matched_by,
            handler: resolution.handler,
        });
        Ok(&self.editors[self.editors.len() - 1])
    }

    pub fn close_editor(&mut self, object_key: &ObjectKey) -> Option<OpenEditor> {
        let index = self
            .editors
            .iter()
            .position(|editor| editor.object_key == *object_key)?;
        Some(self.editors.remove(index))
    }

    /// Drains pending identity notifications. Gating never waits on this:
    /// the session's actor resolves identity and capabilities on each query.
    pub fn pump_identity_events(&mut self) -> Vec<IdentityEvent> {
        let events: Vec<IdentityEvent> = self.identity_events.try_iter().collect();
        for event in &events {
            if let IdentityEvent::ActorChanged(actor) = event
                && self.binding == ActorBinding::FollowCurrent
            {
                log::debug!(
                    target: CHANNEL_SESSION,
                    "{} now acting as '{}'",
                    self.id,
                    actor
                );
            }
        }
        events
    }

    fn close(&mut self) {
        if !self.closed {
            log::info!(target: CHANNEL_SESSION, "{} exited", self.id);
            self.closed = true;
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(ShellError::SessionClosed);
        }
        Ok(())
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("actor", &self.actor)
            .field("active_layout", &self.active_layout)
            .field("editors", &self.editors.len())
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}
