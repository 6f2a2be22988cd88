/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Name of a host-defined anchor: trimmed, lowercase, never blank and never
/// one of the standard names. Only produced by parsing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AnchorName(String);

impl AnchorName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AnchorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named region of the shell workspace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Anchor {
    EditorArea,
    Left,
    Right,
    Top,
    Bottom,
    /// Host-defined region; must be registered before a layout can use it.
    Custom(AnchorName),
}

impl Anchor {
    pub const STANDARD: [Anchor; 5] = [
        Anchor::EditorArea,
        Anchor::Left,
        Anchor::Right,
        Anchor::Top,
        Anchor::Bottom,
    ];

    /// Parses `name` the way config does, so `custom("Left")` is
    /// [`Anchor::Left`] and `custom("Dock")` names the `dock` anchor.
    pub fn custom(name: &str) -> Result<Self, ConfigError> {
        name.parse()
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::EditorArea => "editor_area",
            Self::Left => "left",
            Self::Right => "right",
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Custom(name) => name.as_str(),
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Anchor {
    type Err = ConfigError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let normalized = name.trim().to_ascii_lowercase();
        Ok(match normalized.as_str() {
            "" => return Err(ConfigError::InvalidAnchor(name.to_string())),
            "editor_area" | "editor" => Self::EditorArea,
            "left" => Self::Left,
            "right" => Self::Right,
            "top" => Self::Top,
            "bottom" => Self::Bottom,
            _ => Self::Custom(AnchorName(normalized)),
        })
    }
}

impl TryFrom<String> for Anchor {
    type Error = ConfigError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        name.parse()
    }
}

impl From<Anchor> for String {
    fn from(anchor: Anchor) -> Self {
        anchor.as_str().to_string()
    }
}

/// The anchors a layout may place views against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorSet {
    anchors: Vec<Anchor>,
}

impl AnchorSet {
    pub fn insert(&mut self, anchor: Anchor) -> bool {
        if self.contains(&anchor) {
            return false;
        }
        self.anchors.push(anchor);
        true
    }

    pub fn contains(&self, anchor: &Anchor) -> bool {
        self.anchors.contains(anchor)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Anchor> {
        self.anchors.iter()
    }
}

impl Default for AnchorSet {
    fn default() -> Self {
        Self {
            anchors: Anchor::STANDARD.to_vec(),
        }
    }
}
