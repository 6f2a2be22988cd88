/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Remembered-handler store: which handler was last chosen for an object.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::registries::atomic::handler::ObjectKey;

/// Optional external store consulted after the override chain and before
/// the standard chain. A missing entry is not an error.
pub trait RememberedHandlerStore: Send + Sync {
    fn remembered(&self, key: &ObjectKey) -> Option<String>;
    fn remember(&self, key: &ObjectKey, handler_id: &str);
}

#[derive(Debug, Default)]
pub struct InMemoryHandlerStore {
    entries: Mutex<HashMap<ObjectKey, String>>,
}

impl InMemoryHandlerStore {
    pub fn forget(&self, key: &ObjectKey) -> Option<String> {
        self.entries.lock().remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl RememberedHandlerStore for InMemoryHandlerStore {
    fn remembered(&self, key: &ObjectKey) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn remember(&self, key: &ObjectKey, handler_id: &str) {
        self.entries.lock().insert(key.clone(), handler_id.to_string());
    }
}
