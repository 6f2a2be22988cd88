/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

pub mod capability;
pub mod command;
pub mod handler;
pub mod handler_store;
pub mod menu;
pub mod view;

pub use capability::{Capability, CapabilitySet, CapabilitySource, PermissionGate};
pub use command::{Command, CommandExecution, CommandProxy, ShellIntent};
pub use handler::{
    ContentHandlerResolver, ContentObject, Handler, HandlerChain, HandlerContext,
    HandlerDescriptor, HandlerKind, MatchTier, ObjectKey,
};
pub use handler_store::{InMemoryHandlerStore, RememberedHandlerStore};
pub use menu::{
    CommandContributor, DuplicatePolicy, GroupTarget, MenuModelBuilder, MenuTree,
    StaticContributor, ToolBar,
};
pub use view::{View, ViewDescriptor, ViewInstancePool};
