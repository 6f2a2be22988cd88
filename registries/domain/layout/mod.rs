/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Named layouts and their activation against a session's view pool.
//!
//! Activation only re-parents existing view instances. Views the new layout
//! omits stay alive in the pool, unplaced.

pub mod anchor;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{LayoutReference, Result, ShellError};
use crate::registries::atomic::view::ViewInstancePool;
use anchor::{Anchor, AnchorSet};

pub(crate) const CHANNEL_LAYOUT: &str = "registry.layout";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub view: String,
    pub anchor: Anchor,
}

impl Placement {
    pub fn new(view: impl Into<String>, anchor: Anchor) -> Self {
        Self {
            view: view.into(),
            anchor,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    pub name: String,
    #[serde(default)]
    pub placements: Vec<Placement>,
}

#[derive(Debug, Clone, Default)]
pub struct LayoutRegistry {
    layouts: Vec<Layout>,
    anchors: AnchorSet,
}

impl LayoutRegistry {
    /// Registers or replaces the layout called `name`.
    pub fn register(&mut self, name: impl Into<String>, placements: Vec<Placement>) -> Result<()> {
        let name = name.into();

        let mut seen = HashSet::new();
        for placement in &placements {
            if !seen.insert(placement.view.as_str()) {
                return Err(ShellError::InvalidLayoutReference {
                    layout: name,
                    reference: LayoutReference::RepeatedView(placement.view.clone()),
                });
            }
        }

        let layout = Layout { name, placements };
        match self.layouts.iter_mut().find(|existing| existing.name == layout.name) {
            Some(existing) => {
                log::debug!(target: CHANNEL_LAYOUT, "replacing layout '{}'", layout.name);
                *existing = layout;
            }
            None => self.layouts.push(layout),
        }
        Ok(())
    }

    pub fn register_anchor(&mut self, anchor: Anchor) {
        self.anchors.insert(anchor);
    }

    pub fn anchors(&self) -> &AnchorSet {
        &self.anchors
    }

    pub fn get(&self, name: &str) -> Option<&Layout> {
        self.layouts.iter().find(|layout| layout.name == name)
    }

    /// Layout names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.layouts.iter().map(|layout| layout.name.as_str())
    }

    /// Arranges `pool` according to layout `name`.
    ///
    /// Every placement is resolved before any view moves, so a bad reference
    /// leaves the previous arrangement untouched.
    pub fn activate(&self, name: &str, pool: &mut ViewInstancePool) -> Result<()> {
        let layout = self
            .get(name)
            .ok_or_else(|| ShellError::UnknownLayout(name.to_string()))?;

        for placement in &layout.placements {
            if !pool.contains(&placement.view) {
                log::warn!(
                    target: CHANNEL_LAYOUT,
                    "layout '{}' names unknown view '{}'",
                    layout.name,
                    placement.view
                );
                return Err(ShellError::InvalidLayoutReference {
                    layout: layout.name.clone(),
                    reference: LayoutReference::View(placement.view.clone()),
                });
            }
            if !self.anchors.contains(&placement.anchor) {
                log::warn!(
                    target: CHANNEL_LAYOUT,
                    "layout '{}' names unknown anchor '{}'",
                    layout.name,
                    placement.anchor
                );
                return Err(ShellError::InvalidLayoutReference {
                    layout: layout.name.clone(),
                    reference: LayoutReference::Anchor(placement.anchor.to_string()),
                });
            }
        }

        for instance in pool.instances_mut() {
            let anchor = layout
                .placements
                .iter()
                .find(|placement| placement.view == instance.view_id())
                .map(|placement| placement.anchor.clone());
            instance.set_anchor(anchor);
        }

        log::info!(
            target: CHANNEL_LAYOUT,
            "activated layout '{}' for {}",
            layout.name,
            pool.session()
        );
        Ok(())
    }
}
