/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Shell configuration loaded from TOML.
//!
//! ```toml
//! default_layout = "Foo"
//!
//! [menu]
//! order = ["File", "View", "User"]
//! duplicate_commands = "accept"
//!
//! [toolbar]
//! show_tool_names = false
//!
//! [[layouts]]
//! name = "Foo"
//! placements = [{ view = "Black", anchor = "bottom" }, { view = "Debug", anchor = "left" }]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::registries::atomic::menu::DuplicatePolicy;
use crate::registries::domain::layout::Layout;
use crate::registries::domain::layout::anchor::Anchor;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    pub default_layout: Option<String>,
    pub menu: MenuConfig,
    pub toolbar: ToolbarConfig,
    /// Custom anchors beyond the standard five.
    pub anchors: Vec<Anchor>,
    pub layouts: Vec<Layout>,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuConfig {
    pub order: Vec<String>,
    /// Left unset, the builder's own policy stands.
    pub duplicate_commands: Option<DuplicatePolicy>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolbarConfig {
    pub show_tool_names: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `"info,registry.handler=debug"`.
    pub filter: Option<String>,
}

impl ShellConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }
}
