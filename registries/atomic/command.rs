/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Commands and the capability-gated command proxy.
//!
//! A [`Command`] is immutable once built. Its procedure is an opaque
//! zero-argument closure supplied by application code; it reports what the
//! shell should do next as a list of [`ShellIntent`]s rather than reaching
//! into the shell itself.

use std::fmt;
use std::sync::Arc;

use crate::error::{Result, ShellError};
use crate::registries::atomic::capability::{CapabilitySet, CapabilitySource, PermissionGate};
use crate::registries::atomic::handler::{ContentObject, HandlerKind};

pub(crate) const CHANNEL_COMMAND: &str = "registry.command";

/// Follow-up work a command asks its session to perform.
#[derive(Debug, Clone)]
pub enum ShellIntent {
    /// Open `object` in a handler of the requested kind.
    Edit {
        object: ContentObject,
        kind: HandlerKind,
    },
    ActivateLayout(String),
    Exit,
}

type Procedure = dyn Fn() -> Vec<ShellIntent> + Send + Sync;

pub struct Command {
    id: String,
    label: String,
    procedure: Arc<Procedure>,
    required: CapabilitySet,
}

impl Command {
    pub fn new<F>(id: impl Into<String>, label: impl Into<String>, procedure: F) -> Self
    where
        F: Fn() -> Vec<ShellIntent> + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            label: label.into(),
            procedure: Arc::new(procedure),
            required: CapabilitySet::empty(),
        }
    }

    /// Builder step attaching the capabilities an actor needs to run this
    /// command.
    pub fn requiring(mut self, required: CapabilitySet) -> Self {
        self.required = required;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn required_capabilities(&self) -> &CapabilitySet {
        &self.required
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("required", &self.required)
            .finish_non_exhaustive()
    }
}

/// Result of a permitted invocation.
#[derive(Debug)]
pub struct CommandExecution {
    pub command_id: String,
    pub intents: Vec<ShellIntent>,
}

/// Decorator gating a wrapped command on its required capabilities.
///
/// Holds no actor state. Clones share the same wrapped command.
#[derive(Debug, Clone)]
pub struct CommandProxy {
    command: Arc<Command>,
}

impl CommandProxy {
    pub fn new(command: Command) -> Self {
        Self {
            command: Arc::new(command),
        }
    }

    pub fn from_shared(command: Arc<Command>) -> Self {
        Self { command }
    }

    pub fn command(&self) -> &Command {
        &self.command
    }

    pub fn id(&self) -> &str {
        self.command.id()
    }

    pub fn label(&self) -> &str {
        self.command.label()
    }

    /// Presentation query. Reads the actor's capabilities afresh each call.
    pub fn is_enabled<A>(&self, actor: &A) -> bool
    where
        A: CapabilitySource + ?Sized,
    {
        PermissionGate::check(actor, self.command.required_capabilities())
    }

    /// Runs the wrapped procedure exactly once if the actor currently holds
    /// every required capability; otherwise runs nothing.
    pub fn invoke<A>(&self, actor: &A) -> Result<CommandExecution>
    where
        A: CapabilitySource + ?Sized,
    {
        let missing = PermissionGate::missing(actor, self.command.required_capabilities());
        if !missing.is_empty() {
            log::info!(
                target: CHANNEL_COMMAND,
                "blocked '{}': missing {}",
                self.command.id,
                missing
            );
            return Err(ShellError::NotAuthorized {
                command: self.command.id.clone(),
                missing,
            });
        }

        log::debug!(target: CHANNEL_COMMAND, "invoking '{}'", self.command.id);
        let intents = (self.command.procedure)();
        Ok(CommandExecution {
            command_id: self.command.id.clone(),
            intents,
        })
    }
}
