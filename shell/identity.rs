/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Identity source boundary and the actor handle sessions hold.
//!
//! The shell only reads identity state. Login, logout and capability grants
//! belong to whoever owns the source; the shell hears about them through
//! [`IdentitySource::subscribe`] but never needs to, because every gate
//! check reads the source directly.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender, unbounded};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

use crate::registries::atomic::capability::{Capability, CapabilitySet, CapabilitySource};

pub(crate) const CHANNEL_IDENTITY: &str = "shell.identity";

pub const ACTOR_ID_ANONYMOUS: &str = "anonymous";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(String);

impl ActorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn anonymous() -> Self {
        Self::new(ACTOR_ID_ANONYMOUS)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActorId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityEvent {
    /// A different actor became current (login or logout).
    ActorChanged(ActorId),
    CapabilitiesChanged(ActorId),
}

pub trait IdentitySource: Send + Sync {
    fn current_actor(&self) -> ActorId;

    fn capabilities_of(&self, actor: &ActorId) -> CapabilitySet;

    /// The current actor together with its capabilities. Sources that can
    /// change the current actor concurrently should override this so both
    /// values come from one consistent read.
    fn capabilities_of_current(&self) -> (ActorId, CapabilitySet) {
        let actor = self.current_actor();
        let capabilities = self.capabilities_of(&actor);
        (actor, capabilities)
    }

    /// A fresh receiver of every event published after this call.
    fn subscribe(&self) -> Receiver<IdentityEvent>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Binding {
    Fixed(ActorId),
    Current,
}

/// An actor bound to the source that owns its capabilities.
///
/// Holds no capability snapshot: each query goes back to the source. An
/// actor made with [`Actor::current`] also re-resolves *who* it is on every
/// query, so a login or logout takes effect on the next check.
#[derive(Clone)]
pub struct Actor {
    binding: Binding,
    source: Arc<dyn IdentitySource>,
}

impl Actor {
    /// Always `id`, whatever the source's current actor is.
    pub fn new(id: ActorId, source: Arc<dyn IdentitySource>) -> Self {
        Self {
            binding: Binding::Fixed(id),
            source,
        }
    }

    /// Whichever actor is current at the time of each query.
    pub fn current(source: Arc<dyn IdentitySource>) -> Self {
        Self {
            binding: Binding::Current,
            source,
        }
    }

    pub fn id(&self) -> ActorId {
        match &self.binding {
            Binding::Fixed(id) => id.clone(),
            Binding::Current => self.source.current_actor(),
        }
    }

    pub fn follows_current(&self) -> bool {
        self.binding == Binding::Current
    }
}

impl CapabilitySource for Actor {
    fn current_capabilities(&self) -> CapabilitySet {
        match &self.binding {
            Binding::Fixed(id) => self.source.capabilities_of(id),
            Binding::Current => self.source.capabilities_of_current().1,
        }
    }
}

impl fmt::Debug for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Actor")
            .field("binding", &self.binding)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
struct IdentityState {
    current: ActorId,
    grants: HashMap<ActorId, CapabilitySet>,
}

/// Reference identity source keeping everything in memory.
///
/// All reads and writes of capability state go through one `RwLock`, so a
/// query never observes a capability set halfway through a mutation.
#[derive(Debug)]
pub struct InMemoryIdentitySource {
    state: RwLock<IdentityState>,
    subscribers: Mutex<Vec<Sender<IdentityEvent>>>,
}

impl InMemoryIdentitySource {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(IdentityState {
                current: ActorId::anonymous(),
                grants: HashMap::new(),
            }),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Builder step seeding an actor's capabilities.
    pub fn with_actor(self, actor: impl Into<ActorId>, capabilities: CapabilitySet) -> Self {
        self.state.write().grants.insert(actor.into(), capabilities);
        self
    }

    pub fn login(&self, actor: impl Into<ActorId>) {
        let actor = actor.into();
        {
            let mut state = self.state.write();
            if state.current == actor {
                return;
            }
            state.current = actor.clone();
        }
        log::info!(target: CHANNEL_IDENTITY, "logged in as '{actor}'");
        self.publish(IdentityEvent::ActorChanged(actor));
    }

    pub fn logout(&self) {
        let previous = {
            let mut state = self.state.write();
            std::mem::replace(&mut state.current, ActorId::anonymous())
        };
        if previous == ActorId::anonymous() {
            return;
        }
        log::info!(target: CHANNEL_IDENTITY, "logged out '{previous}'");
        self.publish(IdentityEvent::ActorChanged(ActorId::anonymous()));
    }

    pub fn grant(&self, actor: &ActorId, capability: impl Into<Capability>) {
        let changed = self
            .state
            .write()
            .grants
            .entry(actor.clone())
            .or_default()
            .insert(capability);
        if changed {
            log::debug!(target: CHANNEL_IDENTITY, "granted capability to '{actor}'");
            self.publish(IdentityEvent::CapabilitiesChanged(actor.clone()));
        }
    }

    pub fn revoke(&self, actor: &ActorId, capability: &Capability) {
        let changed = self
            .state
            .write()
            .grants
            .get_mut(actor)
            .is_some_and(|grants| grants.remove(capability));
        if changed {
            log::debug!(target: CHANNEL_IDENTITY, "revoked '{capability}' from '{actor}'");
            self.publish(IdentityEvent::CapabilitiesChanged(actor.clone()));
        }
    }

    fn publish(&self, event: IdentityEvent) {
        self.subscribers
            .lock()
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }
}

impl Default for InMemoryIdentitySource {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentitySource for InMemoryIdentitySource {
    fn current_actor(&self) -> ActorId {
        self.state.read().current.clone()
    }

    fn capabilities_of(&self, actor: &ActorId) -> CapabilitySet {
        self.state
            .read()
            .grants
            .get(actor)
            .cloned()
            .unwrap_or_default()
    }

    fn capabilities_of_current(&self) -> (ActorId, CapabilitySet) {
        let state = self.state.read();
        let capabilities = state.grants.get(&state.current).cloned().unwrap_or_default();
        (state.current.clone(), capabilities)
    }

    fn subscribe(&self) -> Receiver<IdentityEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.lock().push(tx);
        rx
    }
}
