// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The durable key-value seam every store persists through.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::Fallible;

/// Key holding the card collection.
pub const CARDS_KEY: &str = "cards";

/// Key holding the cached shuffled order of the current session.
pub const DECK_KEY: &str = "deck";

/// Key holding the answers recorded in the current session.
pub const PROGRESS_KEY: &str = "session-progress";

/// Key holding the presentation settings.
pub const PREFERENCES_KEY: &str = "preferences";

/// A string-valued key-value store.
///
/// Handles are cheap to clone, and clones refer to the same underlying
/// storage, so each component can own its own handle.
pub trait KeyValueStore: Clone {
    fn get(&self, key: &str) -> Fallible<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Fallible<()>;

    fn remove(&self, key: &str) -> Fallible<()>;
}

/// An in-process store. Nothing survives the process, but clones share data.
#[derive(Clone, Default, Debug)]
pub struct MemoryStore {
    inner: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Fallible<Option<String>> {
        Ok(self.inner.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Fallible<()> {
        self.inner
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Fallible<()> {
        self.inner.borrow_mut().remove(key);
        Ok(())
    }
}

/// Reads a key, treating a failed read the same as a missing value.
pub(crate) fn read_or_none<S: KeyValueStore>(store: &S, key: &str) -> Option<String> {
    match store.get(key) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Failed to read '{key}', treating it as empty: {e}");
            None
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_data() -> Fallible<()> {
        let a = MemoryStore::new();
        let b = a.clone();
        a.set("k", "v")?;
        assert_eq!(b.get("k")?, Some("v".to_string()));
        b.remove("k")?;
        assert_eq!(a.get("k")?, None);
        assert!(a.is_empty());
        Ok(())
    }
}
