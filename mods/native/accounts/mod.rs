/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Accounts mod: the `User` menu.
//!
//! Four contributors share the `User/session` group and are registered in a
//! fixed order: session (login/logout), the user manager's user actions,
//! the user manager's management actions, then the policy manager's.

use std::sync::Arc;

use crate::registries::atomic::capability::CapabilitySet;
use crate::registries::atomic::command::{Command, CommandProxy};
use crate::registries::atomic::menu::{GroupTarget, StaticContributor};
use crate::shell::ShellBuilder;
use crate::shell::identity::{ActorId, InMemoryIdentitySource};

pub const MANAGE_USERS_PERM: &str = "ManageUsersPerm";
pub const MANAGE_POLICY_PERM: &str = "ManagePolicyPerm";

pub const USER_MENU: &str = "User";
pub const SESSION_GROUP: &str = "session";

pub const CMD_LOGIN: &str = "user.login";
pub const CMD_LOGOUT: &str = "user.logout";
pub const CMD_CHANGE_PASSWORD: &str = "user.change_password";
pub const CMD_MANAGE_USERS: &str = "user.manage_users";
pub const CMD_MANAGE_GROUPS: &str = "user.manage_groups";
pub const CMD_MANAGE_POLICIES: &str = "policy.manage";

const CHANNEL_ACCOUNTS: &str = "mods.accounts";

fn target() -> GroupTarget {
    GroupTarget::new(USER_MENU, SESSION_GROUP)
}

fn audited(id: &'static str, label: &str, required: &[&str]) -> CommandProxy {
    CommandProxy::new(
        Command::new(id, label, move || {
            log::info!(target: CHANNEL_ACCOUNTS, "'{id}' requested");
            Vec::new()
        })
        .requiring(CapabilitySet::of(required.iter().copied())),
    )
}

fn session_contributor(identity: Arc<InMemoryIdentitySource>, login_as: ActorId) -> StaticContributor {
    let logout_identity = Arc::clone(&identity);
    StaticContributor::new("accounts.session")
        .command(
            target(),
            CommandProxy::new(Command::new(CMD_LOGIN, "Login", move || {
                identity.login(login_as.clone());
                Vec::new()
            })),
        )
        .command(
            target(),
            CommandProxy::new(Command::new(CMD_LOGOUT, "Logout", move || {
                logout_identity.logout();
                Vec::new()
            })),
        )
}

fn user_actions() -> StaticContributor {
    StaticContributor::new("accounts.user_actions").command(
        target(),
        audited(CMD_CHANGE_PASSWORD, "Change Password", &[MANAGE_USERS_PERM]),
    )
}

fn user_management() -> StaticContributor {
    StaticContributor::new("accounts.user_management")
        .command(target(), audited(CMD_MANAGE_USERS, "Manage Users", &[MANAGE_USERS_PERM]))
        .command(target(), audited(CMD_MANAGE_GROUPS, "Manage Groups", &[MANAGE_USERS_PERM]))
}

fn policy_management() -> StaticContributor {
    StaticContributor::new("accounts.policy_management").command(
        target(),
        audited(CMD_MANAGE_POLICIES, "Manage Policies", &[MANAGE_POLICY_PERM]),
    )
}

/// Adds the `User` menu contributors. `Login` switches `identity` to
/// `login_as`; `Logout` returns it to the anonymous actor.
pub fn install(
    builder: ShellBuilder,
    identity: Arc<InMemoryIdentitySource>,
    login_as: ActorId,
) -> ShellBuilder {
    builder
        .contributor(Arc::new(session_contributor(identity, login_as)))
        .contributor(Arc::new(user_actions()))
        .contributor(Arc::new(user_management()))
        .contributor(Arc::new(policy_management()))
}
