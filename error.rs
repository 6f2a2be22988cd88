/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Error taxonomy for the shell core.
//!
//! Per-invocation failures (`NotAuthorized`, `UnhandledObjectKind`,
//! `UnknownCommand`, `SessionClosed`) are returned to the immediate caller
//! and leave the session usable. Configuration failures
//! (`InvalidLayoutReference`, `DuplicateViewDescriptor`, `DuplicateCommand`,
//! `Config`) abort shell or session construction.

use std::path::PathBuf;

use crate::registries::atomic::capability::CapabilitySet;

pub type Result<T, E = ShellError> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug)]
pub enum ShellError {
    #[error("command '{command}' is not authorized (missing {missing})")]
    NotAuthorized {
        command: String,
        missing: CapabilitySet,
    },

    #[error("no handler of kind '{kind}' for object of type {type_name}")]
    UnhandledObjectKind {
        type_name: &'static str,
        kind: String,
    },

    #[error("layout '{layout}' references unknown {reference}")]
    InvalidLayoutReference {
        layout: String,
        reference: LayoutReference,
    },

    #[error("view descriptor '{0}' registered more than once")]
    DuplicateViewDescriptor(String),

    #[error("command '{command}' already present in menu group '{group}'")]
    DuplicateCommand { group: String, command: String },

    #[error("no command '{0}' in this session")]
    UnknownCommand(String),

    #[error("no layout named '{0}'")]
    UnknownLayout(String),

    #[error("session has exited")]
    SessionClosed,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ShellError {
    /// Configuration errors are structural; the others are recoverable
    /// outcomes of a single query or invocation.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidLayoutReference { .. }
                | Self::DuplicateViewDescriptor(_)
                | Self::DuplicateCommand { .. }
                | Self::Config(_)
        )
    }
}

/// The unresolvable part of a layout placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutReference {
    View(String),
    Anchor(String),
    /// The same view placed twice within one layout.
    RepeatedView(String),
}

impl std::fmt::Display for LayoutReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::View(id) => write!(f, "view '{id}'"),
            Self::Anchor(name) => write!(f, "anchor '{name}'"),
            Self::RepeatedView(id) => write!(f, "view '{id}' (placed twice)"),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid anchor name '{0}'")]
    InvalidAnchor(String),
}
