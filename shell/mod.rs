/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Shell orchestration.
//!
//! [`ShellBuilder`] takes every collaborator explicitly: the identity source,
//! command contributors, handler descriptors, view descriptors and layouts.
//! Once built, these registries are shared read-only by every session the
//! shell opens, so sessions need no cross-session locking.

pub mod identity;
pub mod session;
pub mod view_menu;

use std::sync::Arc;

use crate::error::{Result, ShellError};
use crate::prefs::ShellConfig;
use crate::registries::atomic::handler::{
    ContentHandlerResolver, ContentObject, Handler, HandlerContext, HandlerDescriptor,
};
use crate::registries::atomic::handler_store::RememberedHandlerStore;
use crate::registries::atomic::menu::{CommandContributor, DuplicatePolicy, MenuModelBuilder};
use crate::registries::atomic::view::{ViewDescriptor, ViewRegistry};
use crate::registries::domain::layout::anchor::Anchor;
use crate::registries::domain::layout::{LayoutRegistry, Placement};
use identity::{Actor, ActorId, IdentitySource};
use session::{ActorBinding, Session};
use view_menu::ViewMenuContributor;

/// Registries shared by all sessions of one shell.
pub(crate) struct ShellCore {
    pub(crate) identity: Arc<dyn IdentitySource>,
    pub(crate) contributors: Vec<Arc<dyn CommandContributor>>,
    pub(crate) menu_builder: MenuModelBuilder,
    pub(crate) handlers: ContentHandlerResolver,
    pub(crate) views: ViewRegistry,
    pub(crate) layouts: LayoutRegistry,
    pub(crate) default_layout: Option<String>,
}

#[derive(Clone)]
pub struct Shell {
    core: Arc<ShellCore>,
}

impl Shell {
    pub fn builder(identity: Arc<dyn IdentitySource>) -> ShellBuilder {
        ShellBuilder::new(identity)
    }

    /// Opens a session that follows the identity source's current actor
    /// across logins and logouts.
    pub fn open_session(&self) -> Result<Session> {
        let actor = Actor::current(Arc::clone(&self.core.identity));
        Session::open(Arc::clone(&self.core), actor, ActorBinding::FollowCurrent)
    }

    /// Opens a session bound to `actor` for its whole lifetime.
    pub fn open_session_as(&self, actor: ActorId) -> Result<Session> {
        let actor = Actor::new(actor, Arc::clone(&self.core.identity));
        Session::open(Arc::clone(&self.core), actor, ActorBinding::Fixed)
    }

    pub fn layouts(&self) -> &LayoutRegistry {
        &self.core.layouts
    }

    pub fn views(&self) -> &ViewRegistry {
        &self.core.views
    }

    pub fn handlers(&self) -> &ContentHandlerResolver {
        &self.core.handlers
    }

    pub fn identity(&self) -> &Arc<dyn IdentitySource> {
        &self.core.identity
    }
}

impl std::fmt::Debug for Shell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shell")
            .field("contributors", &self.core.contributors.len())
            .field("views", &self.core.views)
            .field("layouts", &self.core.layouts)
            .field("default_layout", &self.core.default_layout)
            .finish_non_exhaustive()
    }
}

pub struct ShellBuilder {
    identity: Arc<dyn IdentitySource>,
    contributors: Vec<Arc<dyn CommandContributor>>,
    handlers: ContentHandlerResolver,
    views: Vec<ViewDescriptor>,
    layouts: Vec<(String, Vec<Placement>)>,
    anchors: Vec<Anchor>,
    default_layout: Option<String>,
    menu_order: Vec<String>,
    duplicate_policy: DuplicatePolicy,
    show_tool_names: bool,
    view_menu: bool,
}

impl ShellBuilder {
    pub fn new(identity: Arc<dyn IdentitySource>) -> Self {
        Self {
            identity,
            contributors: Vec::new(),
            handlers: ContentHandlerResolver::new(),
            views: Vec::new(),
            layouts: Vec::new(),
            anchors: Vec::new(),
            default_layout: None,
            menu_order: Vec::new(),
            duplicate_policy: DuplicatePolicy::default(),
            show_tool_names: false,
            view_menu: true,
        }
    }

    /// Contributors are consulted in the order they are added here.
    pub fn contributor(mut self, contributor: Arc<dyn CommandContributor>) -> Self {
        self.contributors.push(contributor);
        self
    }

    pub fn handler(mut self, descriptor: HandlerDescriptor) -> Self {
        self.handlers.register(descriptor);
        self
    }

    pub fn fallback_handler<F>(mut self, id: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&HandlerContext, &ContentObject) -> Box<dyn Handler> + Send + Sync + 'static,
    {
        self.handlers.set_fallback(id, factory);
        self
    }

    pub fn remembered_handlers(mut self, store: Arc<dyn RememberedHandlerStore>) -> Self {
        self.handlers.set_remembered_store(store);
        self
    }

    pub fn view(mut self, descriptor: ViewDescriptor) -> Self {
        self.views.push(descriptor);
        self
    }

    pub fn layout(mut self, name: impl Into<String>, placements: Vec<Placement>) -> Self {
        self.layouts.push((name.into(), placements));
        self
    }

    pub fn anchor(mut self, anchor: Anchor) -> Self {
        self.anchors.push(anchor);
        self
    }

    pub fn default_layout(mut self, name: impl Into<String>) -> Self {
        self.default_layout = Some(name.into());
        self
    }

    pub fn menu_order<I, S>(mut self, order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.menu_order = order.into_iter().map(Into::into).collect();
        self
    }

    pub fn duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    pub fn show_tool_names(mut self, show: bool) -> Self {
        self.show_tool_names = show;
        self
    }

    /// Whether to add the built-in `View > Layouts` sub-menu.
    pub fn view_menu(mut self, enabled: bool) -> Self {
        self.view_menu = enabled;
        self
    }

    /// Applies a loaded config over what was registered in code. Config
    /// layouts replace code layouts of the same name; settings the config
    /// leaves unset keep their builder values.
    pub fn with_config(mut self, config: &ShellConfig) -> Self {
        self.anchors.extend(config.anchors.iter().cloned());
        self.layouts.extend(
            config
                .layouts
                .iter()
                .map(|layout| (layout.name.clone(), layout.placements.clone())),
        );
        if let Some(name) = &config.default_layout {
            self.default_layout = Some(name.clone());
        }
        if !config.menu.order.is_empty() {
            self.menu_order = config.menu.order.clone();
        }
        if let Some(policy) = config.menu.duplicate_commands {
            self.duplicate_policy = policy;
        }
        if let Some(show) = config.toolbar.show_tool_names {
            self.show_tool_names = show;
        }
        self
    }

    /// Validates and freezes the configuration. Duplicate view ids, bad
    /// layouts, an unknown default layout or a rejected duplicate command
    /// all fail here.
    pub fn build(self) -> Result<Shell> {
        let mut views = ViewRegistry::default();
        for descriptor in self.views {
            views.register(descriptor)?;
        }

        let mut layouts = LayoutRegistry::default();
        for anchor in self.anchors {
            layouts.register_anchor(anchor);
        }
        for (name, placements) in self.layouts {
            layouts.register(name, placements)?;
        }
        if let Some(name) = &self.default_layout
            && layouts.get(name).is_none()
        {
            return Err(ShellError::UnknownLayout(name.clone()));
        }

        let mut contributors = self.contributors;
        if self.view_menu {
            contributors.push(Arc::new(ViewMenuContributor::new(layouts.names())));
        }

        let menu_builder = MenuModelBuilder::new()
            .with_order(self.menu_order)
            .with_duplicate_policy(self.duplicate_policy)
            .with_tool_names(self.show_tool_names);
        if self.duplicate_policy == DuplicatePolicy::Reject {
            menu_builder.build(&contributors)?;
        }

        log::debug!(
            target: session::CHANNEL_SESSION,
            "shell built with {} contributor(s), {} view(s), {} handler(s)",
            contributors.len(),
            views.descriptors().len(),
            self.handlers.standard_chain().len()
        );

        Ok(Shell {
            core: Arc::new(ShellCore {
                identity: self.identity,
                contributors,
                menu_builder,
                handlers: self.handlers,
                views,
                layouts,
                default_layout: self.default_layout,
            }),
        })
    }
}
