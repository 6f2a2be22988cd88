/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Menu model assembled from independent contributors.
//!
//! Contributors are consulted in registration order and each one's items
//! are appended in the order it yields them, so a shared group reads as
//! the concatenation of every contributor's slice. The builder does no
//! gating of its own; entries that need it arrive as [`CommandProxy`]s and
//! are queried against the actor whenever the menu is presented.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ShellError};
use crate::registries::atomic::capability::CapabilitySource;
use crate::registries::atomic::command::CommandProxy;

pub(crate) const CHANNEL_MENU: &str = "registry.menu";

/// The group a contribution lands in, addressed by top-level menu name and
/// group name within that menu.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupTarget {
    pub menu: String,
    pub group: String,
}

impl GroupTarget {
    pub fn new(menu: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            menu: menu.into(),
            group: group.into(),
        }
    }
}

impl std::fmt::Display for GroupTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.menu, self.group)
    }
}

#[derive(Debug, Clone)]
pub enum MenuItem {
    Command(CommandProxy),
    SubMenu(SubMenu),
}

#[derive(Debug, Clone)]
pub struct SubMenu {
    pub label: String,
    pub groups: Vec<MenuGroup>,
}

#[derive(Debug, Clone)]
pub struct MenuGroup {
    name: String,
    items: Vec<MenuItem>,
}

impl MenuGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items: Vec::new(),
        }
    }

    pub fn with_command(mut self, proxy: CommandProxy) -> Self {
        self.items.push(MenuItem::Command(proxy));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    /// Ids of the direct command entries, in order.
    pub fn command_ids(&self) -> Vec<&str> {
        self.items
            .iter()
            .filter_map(|item| match item {
                MenuItem::Command(proxy) => Some(proxy.id()),
                MenuItem::SubMenu(_) => None,
            })
            .collect()
    }

    fn contains_command(&self, command_id: &str) -> bool {
        self.command_ids().contains(&command_id)
    }
}

#[derive(Debug, Clone)]
pub struct MenuBranch {
    name: String,
    groups: Vec<MenuGroup>,
}

impl MenuBranch {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn groups(&self) -> &[MenuGroup] {
        &self.groups
    }

    pub fn group(&self, name: &str) -> Option<&MenuGroup> {
        self.groups.iter().find(|group| group.name == name)
    }

    fn group_mut_or_insert(&mut self, name: &str) -> &mut MenuGroup {
        let index = match self.groups.iter().position(|group| group.name == name) {
            Some(index) => index,
            None => {
                self.groups.push(MenuGroup::new(name));
                self.groups.len() - 1
            }
        };
        &mut self.groups[index]
    }
}

/// One presentation row of a [`MenuTree`] snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuRow {
    pub menu: String,
    pub group: String,
    pub depth: usize,
    pub label: String,
    pub command_id: Option<String>,
    pub enabled: bool,
}

#[derive(Debug, Clone, Default)]
pub struct MenuTree {
    branches: Vec<MenuBranch>,
}

impl MenuTree {
    pub fn branches(&self) -> &[MenuBranch] {
        &self.branches
    }

    pub fn branch(&self, name: &str) -> Option<&MenuBranch> {
        self.branches.iter().find(|branch| branch.name == name)
    }

    pub fn group(&self, menu: &str, group: &str) -> Option<&MenuGroup> {
        self.branch(menu)?.group(group)
    }

    /// First proxy with this id, depth-first in presentation order.
    pub fn find(&self, command_id: &str) -> Option<&CommandProxy> {
        self.branches
            .iter()
            .find_map(|branch| find_in_groups(&branch.groups, command_id))
    }

    /// Flattened rows with enablement evaluated against the actor now.
    /// Nothing is cached between calls.
    pub fn snapshot<A>(&self, actor: &A) -> Vec<MenuRow>
    where
        A: CapabilitySource + ?Sized,
    {
        let mut rows = Vec::new();
        for branch in &self.branches {
            push_rows(&mut rows, &branch.name, &branch.groups, 0, actor);
        }
        rows
    }
}

fn find_in_groups<'a>(groups: &'a [MenuGroup], command_id: &str) -> Option<&'a CommandProxy> {
    groups.iter().flat_map(|group| &group.items).find_map(|item| match item {
        MenuItem::Command(proxy) if proxy.id() == command_id => Some(proxy),
        MenuItem::Command(_) => None,
        MenuItem::SubMenu(sub_menu) => find_in_groups(&sub_menu.groups, command_id),
    })
}

fn push_rows<A>(rows: &mut Vec<MenuRow>, menu: &str, groups: &[MenuGroup], depth: usize, actor: &A)
where
    A: CapabilitySource + ?Sized,
{
    for group in groups {
        for item in &group.items {
            match item {
                MenuItem::Command(proxy) => rows.push(MenuRow {
                    menu: menu.to_string(),
                    group: group.name.clone(),
                    depth,
                    label: proxy.label().to_string(),
                    command_id: Some(proxy.id().to_string()),
                    enabled: proxy.is_enabled(actor),
                }),
                MenuItem::SubMenu(sub_menu) => {
                    rows.push(MenuRow {
                        menu: menu.to_string(),
                        group: group.name.clone(),
                        depth,
                        label: sub_menu.label.clone(),
                        command_id: None,
                        enabled: true,
                    });
                    push_rows(rows, menu, &sub_menu.groups, depth + 1, actor);
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct MenuContribution {
    pub target: GroupTarget,
    pub item: MenuItem,
}

impl MenuContribution {
    pub fn command(target: GroupTarget, proxy: CommandProxy) -> Self {
        Self {
            target,
            item: MenuItem::Command(proxy),
        }
    }

    pub fn sub_menu(target: GroupTarget, sub_menu: SubMenu) -> Self {
        Self {
            target,
            item: MenuItem::SubMenu(sub_menu),
        }
    }
}

/// An independent source of menu and toolbar entries.
pub trait CommandContributor: Send + Sync {
    fn contributor_id(&self) -> &str;

    fn menu_items(&self) -> Vec<MenuContribution>;

    fn toolbar_items(&self) -> Vec<CommandProxy> {
        Vec::new()
    }
}

/// Contributor backed by fixed lists.
#[derive(Debug, Clone, Default)]
pub struct StaticContributor {
    id: String,
    items: Vec<MenuContribution>,
    toolbar: Vec<CommandProxy>,
}

impl StaticContributor {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn command(mut self, target: GroupTarget, proxy: CommandProxy) -> Self {
        self.items.push(MenuContribution::command(target, proxy));
        self
    }

    pub fn item(mut self, contribution: MenuContribution) -> Self {
        self.items.push(contribution);
        self
    }

    pub fn toolbar(mut self, proxy: CommandProxy) -> Self {
        self.toolbar.push(proxy);
        self
    }
}

impl CommandContributor for StaticContributor {
    fn contributor_id(&self) -> &str {
        &self.id
    }

    fn menu_items(&self) -> Vec<MenuContribution> {
        self.items.clone()
    }

    fn toolbar_items(&self) -> Vec<CommandProxy> {
        self.toolbar.clone()
    }
}

/// What to do when a command id is appended twice to one group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    #[default]
    Accept,
    Reject,
}

#[derive(Debug, Clone)]
pub struct ToolBar {
    items: Vec<CommandProxy>,
    show_tool_names: bool,
}

impl ToolBar {
    pub fn items(&self) -> &[CommandProxy] {
        &self.items
    }

    pub fn show_tool_names(&self) -> bool {
        self.show_tool_names
    }

    pub fn find(&self, command_id: &str) -> Option<&CommandProxy> {
        self.items.iter().find(|proxy| proxy.id() == command_id)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MenuModelBuilder {
    order: Vec<String>,
    policy: DuplicatePolicy,
    show_tool_names: bool,
}

impl MenuModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Top-level menus named here come first, in this order; the rest
    /// follow in order of first contribution.
    pub fn with_order<I, S>(mut self, order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.order = order.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_tool_names(mut self, show_tool_names: bool) -> Self {
        self.show_tool_names = show_tool_names;
        self
    }

    pub fn build(&self, contributors: &[Arc<dyn CommandContributor>]) -> Result<MenuTree> {
        let mut branches: Vec<MenuBranch> = Vec::new();

        for contributor in contributors {
            let contributions = contributor.menu_items();
            log::debug!(
                target: CHANNEL_MENU,
                "contributor '{}' yielded {} item(s)",
                contributor.contributor_id(),
                contributions.len()
            );

            for MenuContribution { target, item } in contributions {
                let branch_index = match branches.iter().position(|branch| branch.name == target.menu) {
                    Some(index) => index,
                    None => {
                        branches.push(MenuBranch {
                            name: target.menu.clone(),
                            groups: Vec::new(),
                        });
                        branches.len() - 1
                    }
                };
                let group = branches[branch_index].group_mut_or_insert(&target.group);

                if let MenuItem::Command(proxy) = &item
                    && group.contains_command(proxy.id())
                {
                    match self.policy {
                        DuplicatePolicy::Accept => log::debug!(
                            target: CHANNEL_MENU,
                            "keeping duplicate '{}' in {}",
                            proxy.id(),
                            target
                        ),
                        DuplicatePolicy::Reject => {
                            return Err(ShellError::DuplicateCommand {
                                group: target.to_string(),
                                command: proxy.id().to_string(),
                            });
                        }
                    }
                }

                group.items.push(item);
            }
        }

        branches.sort_by_key(|branch| {
            self.order
                .iter()
                .position(|name| *name == branch.name)
                .unwrap_or(usize::MAX)
        });

        Ok(MenuTree { branches })
    }

    pub fn build_toolbar(&self, contributors: &[Arc<dyn CommandContributor>]) -> ToolBar {
        ToolBar {
            items: contributors
                .iter()
                .flat_map(|contributor| contributor.toolbar_items())
                .collect(),
            show_tool_names: self.show_tool_names,
        }
    }
}
