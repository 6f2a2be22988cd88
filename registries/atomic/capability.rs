/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Capability tokens and the permission gate.
//!
//! The gate never stores what it reads: every `check` pulls the actor's
//! capability set from its [`CapabilitySource`] at the instant of the call.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// An atomic permission token, e.g. `"NewPersonPerm"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Capability(String);

impl Capability {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Capability {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// An ordered set of capabilities. Ordering only matters for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilitySet(BTreeSet<Capability>);

impl CapabilitySet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn of<I, C>(capabilities: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Capability>,
    {
        capabilities.into_iter().map(Into::into).collect()
    }

    pub fn insert(&mut self, capability: impl Into<Capability>) -> bool {
        self.0.insert(capability.into())
    }

    pub fn remove(&mut self, capability: &Capability) -> bool {
        self.0.remove(capability)
    }

    pub fn contains(&self, capability: &Capability) -> bool {
        self.0.contains(capability)
    }

    pub fn is_superset(&self, other: &CapabilitySet) -> bool {
        self.0.is_superset(&other.0)
    }

    /// Capabilities in `self` that `held` does not contain.
    pub fn missing_from(&self, held: &CapabilitySet) -> CapabilitySet {
        Self(self.0.difference(&held.0).cloned().collect())
    }

    pub fn union(&self, other: &CapabilitySet) -> CapabilitySet {
        Self(self.0.union(&other.0).cloned().collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Capability> {
        self.0.iter()
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (index, capability) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{capability}")?;
        }
        f.write_str("}")
    }
}

/// Anything whose current capabilities can be read on demand.
///
/// Implementors must return the live set, not a snapshot taken earlier.
pub trait CapabilitySource {
    fn current_capabilities(&self) -> CapabilitySet;
}

impl CapabilitySource for CapabilitySet {
    fn current_capabilities(&self) -> CapabilitySet {
        self.clone()
    }
}

/// Stateless superset check between a source's live capabilities and a
/// requirement set.
pub struct PermissionGate;

impl PermissionGate {
    /// True iff the source currently holds every required capability.
    /// An empty requirement always passes without reading the source.
    pub fn check<S>(source: &S, required: &CapabilitySet) -> bool
    where
        S: CapabilitySource + ?Sized,
    {
        Self::missing(source, required).is_empty()
    }

    /// The required capabilities the source does not currently hold.
    pub fn missing<S>(source: &S, required: &CapabilitySet) -> CapabilitySet
    where
        S: CapabilitySource + ?Sized,
    {
        if required.is_empty() {
            return CapabilitySet::empty();
        }
        required.missing_from(&source.current_capabilities())
    }
}
