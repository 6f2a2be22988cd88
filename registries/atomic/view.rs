/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! View descriptors and the per-session view instance pool.
//!
//! Every session gets its own freshly built instance of every view. Views
//! may hold session-scoped resources (toolkit controls and the like), so an
//! instance is never handed to a second session, even for the same
//! descriptor id.

use std::any::Any;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::error::{Result, ShellError};
use crate::registries::domain::layout::anchor::Anchor;
use crate::shell::session::SessionId;

pub(crate) const CHANNEL_VIEW: &str = "registry.view";

/// A view's toolkit-independent state. Rendering is left to the host.
pub trait View: Any + Send + fmt::Debug {
    fn title(&self) -> &str;
}

/// Opaque identity of one view instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewInstanceId(uuid::Uuid);

impl ViewInstanceId {
    fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl fmt::Display for ViewInstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "view-instance:{}", self.0)
    }
}

type ViewFactory = dyn Fn(SessionId) -> Box<dyn View> + Send + Sync;

#[derive(Clone)]
pub struct ViewDescriptor {
    id: String,
    factory: Arc<ViewFactory>,
}

impl ViewDescriptor {
    pub fn new<F>(id: impl Into<String>, factory: F) -> Self
    where
        F: Fn(SessionId) -> Box<dyn View> + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            factory: Arc::new(factory),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Debug for ViewDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewDescriptor")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// Shell-wide set of view descriptors, configured once at construction.
#[derive(Debug, Clone, Default)]
pub struct ViewRegistry {
    descriptors: Vec<ViewDescriptor>,
}

impl ViewRegistry {
    pub fn register(&mut self, descriptor: ViewDescriptor) -> Result<()> {
        if self.descriptors.iter().any(|existing| existing.id == descriptor.id) {
            return Err(ShellError::DuplicateViewDescriptor(descriptor.id));
        }
        self.descriptors.push(descriptor);
        Ok(())
    }

    pub fn descriptors(&self) -> &[ViewDescriptor] {
        &self.descriptors
    }

    pub fn contains(&self, view_id: &str) -> bool {
        self.descriptors.iter().any(|descriptor| descriptor.id == view_id)
    }
}

/// A view owned by exactly one session.
#[derive(Debug)]
pub struct ViewInstance {
    id: ViewInstanceId,
    view_id: String,
    owner: SessionId,
    anchor: Option<Anchor>,
    view: Box<dyn View>,
}

impl ViewInstance {
    pub fn id(&self) -> ViewInstanceId {
        self.id
    }

    pub fn view_id(&self) -> &str {
        &self.view_id
    }

    pub fn owner(&self) -> SessionId {
        self.owner
    }

    /// Where the active layout placed this view; `None` when unplaced.
    pub fn anchor(&self) -> Option<&Anchor> {
        self.anchor.as_ref()
    }

    pub fn view(&self) -> &dyn View {
        self.view.as_ref()
    }

    pub fn downcast_ref<T: View>(&self) -> Option<&T> {
        let view: &dyn Any = self.view.as_ref();
        view.downcast_ref::<T>()
    }

    pub fn downcast_mut<T: View>(&mut self) -> Option<&mut T> {
        let view: &mut dyn Any = self.view.as_mut();
        view.downcast_mut::<T>()
    }

    pub(crate) fn set_anchor(&mut self, anchor: Option<Anchor>) {
        self.anchor = anchor;
    }
}

/// The instances built for one session, in descriptor order.
#[derive(Debug)]
pub struct ViewInstancePool {
    session: SessionId,
    instances: Vec<ViewInstance>,
}

impl ViewInstancePool {
    /// Builds a fresh instance of every descriptor for `session`.
    /// Two descriptors sharing an id fail the whole pool.
    pub fn instantiate(session: SessionId, descriptors: &[ViewDescriptor]) -> Result<Self> {
        let mut seen = HashSet::new();
        for descriptor in descriptors {
            if !seen.insert(descriptor.id.as_str()) {
                return Err(ShellError::DuplicateViewDescriptor(descriptor.id.clone()));
            }
        }

        let instances = descriptors
            .iter()
            .map(|descriptor| ViewInstance {
                id: ViewInstanceId::new(),
                view_id: descriptor.id.clone(),
                owner: session,
                anchor: None,
                view: (descriptor.factory)(session),
            })
            .collect::<Vec<_>>();

        log::debug!(
            target: CHANNEL_VIEW,
            "instantiated {} view(s) for {}",
            instances.len(),
            session
        );

        Ok(Self { session, instances })
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn instances(&self) -> &[ViewInstance] {
        &self.instances
    }

    pub fn get(&self, view_id: &str) -> Option<&ViewInstance> {
        self.instances.iter().find(|instance| instance.view_id == view_id)
    }

    pub fn get_mut(&mut self, view_id: &str) -> Option<&mut ViewInstance> {
        self.instances
            .iter_mut()
            .find(|instance| instance.view_id == view_id)
    }

    pub fn contains(&self, view_id: &str) -> bool {
        self.get(view_id).is_some()
    }

    pub(crate) fn instances_mut(&mut self) -> impl Iterator<Item = &mut ViewInstance> {
        self.instances.iter_mut()
    }

    /// Current `(view id, anchor)` pairs for placed views.
    pub fn placements(&self) -> Vec<(&str, &Anchor)> {
        self.instances
            .iter()
            .filter_map(|instance| Some((instance.view_id.as_str(), instance.anchor.as_ref()?)))
            .collect()
    }

    /// Views alive in this session but without a slot in the active layout.
    pub fn unplaced(&self) -> Vec<&str> {
        self.instances
            .iter()
            .filter(|instance| instance.anchor.is_none())
            .map(|instance| instance.view_id.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct CounterView {
        title: String,
        created_for: SessionId,
        clicks: u32,
    }

    impl View for CounterView {
        fn title(&self) -> &str {
            &self.title
        }
    }

    fn counter(id: &'static str) -> ViewDescriptor {
        ViewDescriptor::new(id, move |session| {
            Box::new(CounterView {
                title: id.to_string(),
                created_for: session,
                clicks: 0,
            })
        })
    }

    #[test]
    fn each_session_gets_distinct_instances() {
        let descriptors = vec![counter("V1"), counter("V2")];
        let first = SessionId::new();
        let second = SessionId::new();

        let mut pool_one = ViewInstancePool::instantiate(first, &descriptors).unwrap();
        let pool_two = ViewInstancePool::instantiate(second, &descriptors).unwrap();

        let ids: HashSet<ViewInstanceId> = pool_one
            .instances()
            .iter()
            .chain(pool_two.instances())
            .map(ViewInstance::id)
            .collect();
        assert_eq!(ids.len(), 4);

        pool_one
            .get_mut("V1")
            .and_then(ViewInstance::downcast_mut::<CounterView>)
            .unwrap()
            .clicks += 5;

        let untouched = pool_two.get("V1").and_then(ViewInstance::downcast_ref::<CounterView>).unwrap();
        assert_eq!(untouched.clicks, 0);
        let sibling = pool_one.get("V2").and_then(ViewInstance::downcast_ref::<CounterView>).unwrap();
        assert_eq!(sibling.clicks, 0);
    }

    #[test]
    fn instances_are_bound_to_their_session() {
        let session = SessionId::new();
        let pool = ViewInstancePool::instantiate(session, &[counter("Debug")]).unwrap();
        let instance = pool.get("Debug").unwrap();

        assert_eq!(instance.owner(), session);
        assert_eq!(instance.downcast_ref::<CounterView>().unwrap().created_for, session);
        assert_eq!(instance.view().title(), "Debug");
        assert_eq!(pool.unplaced(), vec!["Debug"]);
        assert!(pool.placements().is_empty());
    }

    #[test]
    fn reinstantiation_never_reuses_instances() {
        let session = SessionId::new();
        let descriptors = [counter("Debug")];
        let first = ViewInstancePool::instantiate(session, &descriptors).unwrap();
        let second = ViewInstancePool::instantiate(session, &descriptors).unwrap();
        assert_ne!(first.instances()[0].id(), second.instances()[0].id());
    }

    #[test]
    fn duplicate_descriptor_ids_fail_instantiation() {
        let err = ViewInstancePool::instantiate(SessionId::new(), &[counter("Debug"), counter("Debug")])
            .unwrap_err();
        assert!(matches!(err, ShellError::DuplicateViewDescriptor(ref id) if id == "Debug"));
    }

    #[test]
    fn registry_rejects_duplicate_ids() {
        let mut registry = ViewRegistry::default();
        registry.register(counter("Black")).unwrap();
        let err = registry.register(counter("Black")).unwrap_err();
        assert!(matches!(err, ShellError::DuplicateViewDescriptor(ref id) if id == "Black"));
        assert_eq!(registry.descriptors().len(), 1);
        assert!(registry.contains("Black"));
    }
}
