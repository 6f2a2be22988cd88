/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Content handler resolution.
//!
//! A handler is chosen by walking ordered `(test, factory)` descriptors:
//! a caller-supplied override chain first, then the handler last used for
//! the same object, then the shared standard chain, then the generic
//! fallback. Both chains are plain data, so a caller adds its own tier
//! without touching the shared one. A remembered id only names entries of
//! the standard chain or the fallback.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::{Result, ShellError};
use crate::registries::atomic::handler_store::RememberedHandlerStore;
use crate::shell::session::SessionId;

pub(crate) const CHANNEL_HANDLER: &str = "registry.handler";

/// Identity of a domain object, stable across repeated `edit` calls.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectKey(String);

impl ObjectKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObjectKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for ObjectKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

/// The kind of presentation requested for an object, e.g. `"editor"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HandlerKind(String);

impl HandlerKind {
    pub const EDITOR: &'static str = "editor";

    pub fn new(kind: impl Into<String>) -> Self {
        Self(kind.into())
    }

    pub fn editor() -> Self {
        Self::new(Self::EDITOR)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HandlerKind {
    fn from(kind: &str) -> Self {
        Self::new(kind)
    }
}

/// An arbitrary domain object handed to the shell for presentation.
#[derive(Clone)]
pub struct ContentObject {
    key: ObjectKey,
    type_name: &'static str,
    value: Arc<dyn Any + Send + Sync>,
}

impl ContentObject {
    pub fn new<T>(key: impl Into<ObjectKey>, value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        Self {
            key: key.into(),
            type_name: std::any::type_name::<T>(),
            value: Arc::new(value),
        }
    }

    pub fn key(&self) -> &ObjectKey {
        &self.key
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn is<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }
}

impl fmt::Debug for ContentObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentObject")
            .field("key", &self.key)
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// What a factory is told about the request it serves.
#[derive(Debug, Clone)]
pub struct HandlerContext {
    pub session: SessionId,
    pub kind: HandlerKind,
}

/// The object responsible for presenting or editing one domain object.
/// Rendering is left to the host toolkit.
pub trait Handler: Send + fmt::Debug {
    fn handler_id(&self) -> &str;
    fn object(&self) -> &ContentObject;

    fn title(&self) -> String {
        self.object().key().to_string()
    }
}

type CapabilityTest = dyn Fn(&ContentObject) -> bool + Send + Sync;
type HandlerFactory = dyn Fn(&HandlerContext, &ContentObject) -> Box<dyn Handler> + Send + Sync;

#[derive(Clone)]
pub struct HandlerDescriptor {
    id: String,
    kind: Option<HandlerKind>,
    test: Arc<CapabilityTest>,
    factory: Arc<HandlerFactory>,
}

impl HandlerDescriptor {
    pub fn new<T, F>(id: impl Into<String>, test: T, factory: F) -> Self
    where
        T: Fn(&ContentObject) -> bool + Send + Sync + 'static,
        F: Fn(&HandlerContext, &ContentObject) -> Box<dyn Handler> + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            kind: None,
            test: Arc::new(test),
            factory: Arc::new(factory),
        }
    }

    /// Descriptor matching every object whose concrete type is `V`.
    pub fn for_type<V, F>(id: impl Into<String>, factory: F) -> Self
    where
        V: Any,
        F: Fn(&HandlerContext, &ContentObject) -> Box<dyn Handler> + Send + Sync + 'static,
    {
        Self::new(id, |object: &ContentObject| object.is::<V>(), factory)
    }

    /// Restricts the descriptor to one requested kind. Unrestricted
    /// descriptors serve every kind.
    pub fn for_kind(mut self, kind: impl Into<HandlerKind>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn matches(&self, object: &ContentObject, kind: &HandlerKind) -> bool {
        self.kind.as_ref().is_none_or(|served| served == kind) && (self.test)(object)
    }

    fn create(&self, context: &HandlerContext, object: &ContentObject) -> Box<dyn Handler> {
        (self.factory)(context, object)
    }
}

impl fmt::Debug for HandlerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerDescriptor")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Ordered descriptors; the first match wins.
#[derive(Debug, Clone, Default)]
pub struct HandlerChain {
    descriptors: Vec<HandlerDescriptor>,
}

impl HandlerChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, descriptor: HandlerDescriptor) -> Self {
        self.push(descriptor);
        self
    }

    pub fn push(&mut self, descriptor: HandlerDescriptor) {
        self.descriptors.push(descriptor);
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn first_match(&self, object: &ContentObject, kind: &HandlerKind) -> Option<&HandlerDescriptor> {
        self.descriptors
            .iter()
            .find(|descriptor| descriptor.matches(object, kind))
    }

    pub fn find(&self, id: &str) -> Option<&HandlerDescriptor> {
        self.descriptors.iter().find(|descriptor| descriptor.id == id)
    }
}

impl FromIterator<HandlerDescriptor> for HandlerChain {
    fn from_iter<I: IntoIterator<Item = HandlerDescriptor>>(iter: I) -> Self {
        Self {
            descriptors: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTier {
    Remembered,
    Override,
    Standard,
    Fallback,
}

impl MatchTier {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Remembered => "remembered",
            Self::Override => "override",
            Self::Standard => "standard",
            Self::Fallback => "fallback",
        }
    }
}

#[derive(Debug)]
pub struct HandlerResolution {
    pub handler: Box<dyn Handler>,
    pub handler_id: String,
    pub matched_by: MatchTier,
}

#[derive(Default)]
pub struct ContentHandlerResolver {
    standard: HandlerChain,
    fallback: Option<HandlerDescriptor>,
    remembered: Option<Arc<dyn RememberedHandlerStore>>,
}

impl ContentHandlerResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends to the standard chain; registration order is match order.
    pub fn register(&mut self, descriptor: HandlerDescriptor) {
        self.standard.push(descriptor);
    }

    /// Factory used when no chain matches. Its test is ignored.
    pub fn set_fallback<F>(&mut self, id: impl Into<String>, factory: F)
    where
        F: Fn(&HandlerContext, &ContentObject) -> Box<dyn Handler> + Send + Sync + 'static,
    {
        self.fallback = Some(HandlerDescriptor::new(id, |_: &ContentObject| true, factory));
    }

    pub fn set_remembered_store(&mut self, store: Arc<dyn RememberedHandlerStore>) {
        self.remembered = Some(store);
    }

    pub fn standard_chain(&self) -> &HandlerChain {
        &self.standard
    }

    pub fn resolve(
        &self,
        object: &ContentObject,
        context: &HandlerContext,
        overrides: Option<&HandlerChain>,
    ) -> Result<HandlerResolution> {
        let kind = &context.kind;

        let selected = overrides
            .and_then(|chain| chain.first_match(object, kind))
            .map(|descriptor| (descriptor, MatchTier::Override))
            .or_else(|| {
                self.remembered_descriptor(object, kind)
                    .map(|descriptor| (descriptor, MatchTier::Remembered))
            })
            .or_else(|| {
                self.standard
                    .first_match(object, kind)
                    .map(|descriptor| (descriptor, MatchTier::Standard))
            })
            .or_else(|| {
                self.fallback
                    .as_ref()
                    .map(|descriptor| (descriptor, MatchTier::Fallback))
            });

        let Some((descriptor, matched_by)) = selected else {
            log::warn!(
                target: CHANNEL_HANDLER,
                "no {} handler for {} ({})",
                kind,
                object.key(),
                object.type_name()
            );
            return Err(ShellError::UnhandledObjectKind {
                type_name: object.type_name(),
                kind: kind.to_string(),
            });
        };

        log::debug!(
            target: CHANNEL_HANDLER,
            "{} -> {} (matched by {})",
            object.key(),
            descriptor.id(),
            matched_by.as_str()
        );

        if matched_by != MatchTier::Remembered
            && let Some(store) = &self.remembered
        {
            store.remember(object.key(), descriptor.id());
        }

        Ok(HandlerResolution {
            handler: descriptor.create(context, object),
            handler_id: descriptor.id().to_string(),
            matched_by,
        })
    }

    fn remembered_descriptor(&self, object: &ContentObject, kind: &HandlerKind) -> Option<&HandlerDescriptor> {
        let handler_id = self.remembered.as_ref()?.remembered(object.key())?;

        let descriptor = self
            .standard
            .find(&handler_id)
            .or_else(|| self.fallback.as_ref().filter(|fallback| fallback.id == handler_id));

        match descriptor {
            Some(descriptor) if descriptor.matches(object, kind) => Some(descriptor),
            _ => {
                log::debug!(
                    target: CHANNEL_HANDLER,
                    "ignoring stale remembered handler '{}' for {}",
                    handler_id,
                    object.key()
                );
                None
            }
        }
    }
}

impl fmt::Debug for ContentHandlerResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentHandlerResolver")
            .field("standard", &self.standard)
            .field("fallback", &self.fallback)
            .field("remembered", &self.remembered.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registries::atomic::handler_store::InMemoryHandlerStore;

    #[derive(Debug)]
    struct Tagged {
        id: String,
        object: ContentObject,
    }

    impl Handler for Tagged {
        fn handler_id(&self) -> &str {
            &self.id
        }

        fn object(&self) -> &ContentObject {
            &self.object
        }
    }

    fn tagged(id: &'static str) -> impl Fn(&HandlerContext, &ContentObject) -> Box<dyn Handler> {
        move |_, object| {
            Box::new(Tagged {
                id: id.to_string(),
                object: object.clone(),
            })
        }
    }

    fn context() -> HandlerContext {
        HandlerContext {
            session: SessionId::new(),
            kind: HandlerKind::editor(),
        }
    }

    fn resolver_with_standard_text() -> ContentHandlerResolver {
        let mut resolver = ContentHandlerResolver::new();
        resolver.register(HandlerDescriptor::for_type::<String, _>("standard:text", tagged("standard:text")));
        resolver.register(HandlerDescriptor::for_type::<u32, _>("standard:number", tagged("standard:number")));
        resolver
    }

    #[test]
    fn override_chain_wins_when_its_test_matches() {
        let resolver = resolver_with_standard_text();
        let overrides = HandlerChain::new()
            .with(HandlerDescriptor::for_type::<String, _>("override:text", tagged("override:text")));
        let object = ContentObject::new("note", String::from("hello"));

        let resolution = resolver.resolve(&object, &context(), Some(&overrides)).unwrap();
        assert_eq!(resolution.handler_id, "override:text");
        assert_eq!(resolution.matched_by, MatchTier::Override);
        assert_eq!(resolution.handler.handler_id(), "override:text");
        assert_eq!(resolution.handler.object().key().as_str(), "note");
    }

    #[test]
    fn falls_through_to_standard_chain_when_override_misses() {
        let resolver = resolver_with_standard_text();
        let overrides = HandlerChain::new()
            .with(HandlerDescriptor::for_type::<String, _>("override:text", tagged("override:text")));
        let object = ContentObject::new("count", 7_u32);

        let resolution = resolver.resolve(&object, &context(), Some(&overrides)).unwrap();
        assert_eq!(resolution.handler_id, "standard:number");
        assert_eq!(resolution.matched_by, MatchTier::Standard);
    }

    #[test]
    fn standard_chain_is_consulted_in_registration_order() {
        let mut resolver = ContentHandlerResolver::new();
        resolver.register(HandlerDescriptor::new("first", |_: &ContentObject| true, tagged("first")));
        resolver.register(HandlerDescriptor::new("second", |_: &ContentObject| true, tagged("second")));

        let object = ContentObject::new("x", ());
        let resolution = resolver.resolve(&object, &context(), None).unwrap();
        assert_eq!(resolution.handler_id, "first");
    }

    #[test]
    fn generic_fallback_catches_unmatched_objects() {
        let mut resolver = resolver_with_standard_text();
        resolver.set_fallback("fallback:inspector", tagged("fallback:inspector"));
        let object = ContentObject::new("flag", true);

        let resolution = resolver.resolve(&object, &context(), None).unwrap();
        assert_eq!(resolution.handler_id, "fallback:inspector");
        assert_eq!(resolution.matched_by, MatchTier::Fallback);
    }

    #[test]
    fn unhandled_object_kind_without_fallback() {
        let resolver = resolver_with_standard_text();
        let object = ContentObject::new("flag", true);

        let err = resolver.resolve(&object, &context(), None).unwrap_err();
        assert!(matches!(
            err,
            ShellError::UnhandledObjectKind { type_name: "bool", ref kind } if kind == "editor"
        ));
    }

    #[test]
    fn kind_restricted_descriptor_is_skipped_for_other_kinds() {
        let mut resolver = ContentHandlerResolver::new();
        resolver.register(
            HandlerDescriptor::for_type::<String, _>("viewer:text", tagged("viewer:text")).for_kind("viewer"),
        );
        resolver.register(HandlerDescriptor::for_type::<String, _>("any:text", tagged("any:text")));
        let object = ContentObject::new("note", String::from("hi"));

        let as_editor = resolver.resolve(&object, &context(), None).unwrap();
        assert_eq!(as_editor.handler_id, "any:text");

        let viewer_context = HandlerContext {
            session: SessionId::new(),
            kind: HandlerKind::new("viewer"),
        };
        let as_viewer = resolver.resolve(&object, &viewer_context, None).unwrap();
        assert_eq!(as_viewer.handler_id, "viewer:text");
    }

    #[test]
    fn remembered_handler_is_preferred_over_chain_order() {
        let store = Arc::new(InMemoryHandlerStore::default());
        let mut resolver = resolver_with_standard_text();
        resolver.set_remembered_store(store.clone());
        let overrides = HandlerChain::new()
            .with(HandlerDescriptor::for_type::<String, _>("override:text", tagged("override:text")));
        let object = ContentObject::new("note", String::from("hello"));

        let first = resolver.resolve(&object, &context(), Some(&overrides)).unwrap();
        assert_eq!(first.matched_by, MatchTier::Override);
        assert_eq!(store.remembered(object.key()).as_deref(), Some("override:text"));

        // Override ids are never looked up from the store.
        let second = resolver.resolve(&object, &context(), None).unwrap();
        assert_eq!(second.handler_id, "standard:text");
        assert_eq!(second.matched_by, MatchTier::Standard);

        let third = resolver.resolve(&object, &context(), None).unwrap();
        assert_eq!(third.handler_id, "standard:text");
        assert_eq!(third.matched_by, MatchTier::Remembered);
    }

    #[test]
    fn matching_override_beats_remembered_handler() {
        let store = Arc::new(InMemoryHandlerStore::default());
        let mut resolver = resolver_with_standard_text();
        resolver.set_remembered_store(store.clone());
        let object = ContentObject::new("note", String::from("hello"));

        resolver.resolve(&object, &context(), None).unwrap();
        assert_eq!(store.remembered(object.key()).as_deref(), Some("standard:text"));

        let overrides = HandlerChain::new()
            .with(HandlerDescriptor::for_type::<String, _>("override:text", tagged("override:text")));
        let resolution = resolver.resolve(&object, &context(), Some(&overrides)).unwrap();
        assert_eq!(resolution.handler_id, "override:text");
        assert_eq!(resolution.matched_by, MatchTier::Override);

        let unmatched = HandlerChain::new()
            .with(HandlerDescriptor::for_type::<u32, _>("override:number", tagged("override:number")));
        let resolution = resolver.resolve(&object, &context(), Some(&unmatched)).unwrap();
        assert_eq!(resolution.handler_id, "standard:text");
        assert_eq!(resolution.matched_by, MatchTier::Standard);
    }

    #[test]
    fn absent_remembered_entry_is_not_an_error() {
        let mut resolver = resolver_with_standard_text();
        resolver.set_remembered_store(Arc::new(InMemoryHandlerStore::default()));
        let object = ContentObject::new("count", 3_u32);

        let resolution = resolver.resolve(&object, &context(), None).unwrap();
        assert_eq!(resolution.matched_by, MatchTier::Standard);
    }
}
