/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Built-in contributor for the `View` menu: one entry per layout.

use crate::registries::atomic::command::{Command, CommandProxy, ShellIntent};
use crate::registries::atomic::menu::{
    CommandContributor, GroupTarget, MenuContribution, MenuGroup, SubMenu,
};

pub const VIEW_MENU: &str = "View";
pub const VIEW_MENU_LAYOUTS_GROUP: &str = "layouts";
pub const LAYOUT_COMMAND_PREFIX: &str = "view.layout.";

pub(crate) struct ViewMenuContributor {
    layouts: Vec<CommandProxy>,
}

impl ViewMenuContributor {
    pub(crate) fn new<'a>(layout_names: impl IntoIterator<Item = &'a str>) -> Self {
        let layouts = layout_names
            .into_iter()
            .map(|name| {
                let target = name.to_string();
                CommandProxy::new(Command::new(
                    layout_command_id(name),
                    name,
                    move || vec![ShellIntent::ActivateLayout(target.clone())],
                ))
            })
            .collect();
        Self { layouts }
    }
}

/// Layout names are case-sensitive, so the id keeps the name as written.
pub fn layout_command_id(layout_name: &str) -> String {
    format!("{LAYOUT_COMMAND_PREFIX}{layout_name}")
}

impl CommandContributor for ViewMenuContributor {
    fn contributor_id(&self) -> &str {
        "shell.view_menu"
    }

    fn menu_items(&self) -> Vec<MenuContribution> {
        if self.layouts.is_empty() {
            return Vec::new();
        }
        let group = self
            .layouts
            .iter()
            .cloned()
            .fold(MenuGroup::new(VIEW_MENU_LAYOUTS_GROUP), MenuGroup::with_command);
        vec![MenuContribution::sub_menu(
            GroupTarget::new(VIEW_MENU, VIEW_MENU_LAYOUTS_GROUP),
            SubMenu {
                label: "Layouts".to_string(),
                groups: vec![group],
            },
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registries::atomic::capability::CapabilitySet;
    use crate::registries::atomic::menu::MenuItem;

    #[test]
    fn one_ungated_entry_per_layout() {
        let contributor = ViewMenuContributor::new(["Foo", "Bar"]);
        let items = contributor.menu_items();
        assert_eq!(items.len(), 1);

        let MenuItem::SubMenu(sub_menu) = &items[0].item else {
            panic!("expected a sub-menu");
        };
        let ids = sub_menu.groups[0].command_ids();
        assert_eq!(ids, vec!["view.layout.Foo", "view.layout.Bar"]);

        let MenuItem::Command(proxy) = &sub_menu.groups[0].items()[1] else {
            panic!("expected a command");
        };
        let execution = proxy.invoke(&CapabilitySet::empty()).unwrap();
        assert!(matches!(
            execution.intents.as_slice(),
            [ShellIntent::ActivateLayout(name)] if name == "Bar"
        ));
    }

    #[test]
    fn layouts_differing_only_in_case_get_distinct_commands() {
        let contributor = ViewMenuContributor::new(["Foo", "foo"]);
        let items = contributor.menu_items();
        let MenuItem::SubMenu(sub_menu) = &items[0].item else {
            panic!("expected a sub-menu");
        };
        assert_eq!(sub_menu.groups[0].command_ids(), vec!["view.layout.Foo", "view.layout.foo"]);

        let MenuItem::Command(proxy) = &sub_menu.groups[0].items()[1] else {
            panic!("expected a command");
        };
        let execution = proxy.invoke(&CapabilitySet::empty()).unwrap();
        assert!(matches!(
            execution.intents.as_slice(),
            [ShellIntent::ActivateLayout(name)] if name == "foo"
        ));
    }

    #[test]
    fn no_layouts_contributes_nothing() {
        let contributor = ViewMenuContributor::new(std::iter::empty());
        assert!(contributor.menu_items().is_empty());
    }
}
