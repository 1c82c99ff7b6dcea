//! Browser-style key-value backing.
//!
//! Web storage exposes a flat string-to-string map (`getItem` / `setItem`).
//! [`KeyValueBacking`] stores the whole serialized tree under one key of such
//! a store. The store itself is abstracted by [`KeyValueStore`] so the same
//! backing works over web storage bindings or the in-process
//! [`InMemoryKeyValueStore`].

use crate::backing::Backing;
use crate::document::{decode_tree, encode_tree, DocumentTree};
use crate::error::BackingResult;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// A flat string key-value store.
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, or `None` if the key is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be accessed.
    fn get_item(&self, key: &str) -> BackingResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the write (for example, quota exceeded).
    fn set_item(&mut self, key: &str, value: String) -> BackingResult<()>;

    /// Removes `key` from the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be accessed.
    fn remove_item(&mut self, key: &str) -> BackingResult<()>;
}

/// A key-value store kept in process memory.
///
/// Clones share the same entries, like tabs sharing one origin's storage.
#[derive(Debug, Clone, Default)]
pub struct InMemoryKeyValueStore {
    items: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryKeyValueStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    /// Returns true if no keys are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}

impl KeyValueStore for InMemoryKeyValueStore {
    fn get_item(&self, key: &str) -> BackingResult<Option<String>> {
        Ok(self.items.read().get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: String) -> BackingResult<()> {
        self.items.write().insert(key.to_string(), value);
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> BackingResult<()> {
        self.items.write().remove(key);
        Ok(())
    }
}

/// A backing that stores the tree as JSON text under a single key.
///
/// An absent key reads as `None`, matching web storage where `getItem`
/// returns `null` for unknown keys.
///
/// # Example
///
/// ```rust
/// use pathdb_storage::{Backing, DocumentTree, InMemoryKeyValueStore, KeyValueBacking};
///
/// let store = InMemoryKeyValueStore::new();
/// let mut backing = KeyValueBacking::new(store.clone(), "app-state");
/// backing.write(&DocumentTree::new()).unwrap();
/// assert_eq!(store.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct KeyValueBacking<S> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> KeyValueBacking<S> {
    /// Creates a backing that stores the tree under `key` in `store`.
    pub fn new(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Returns the storage key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the underlying store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: KeyValueStore> Backing for KeyValueBacking<S> {
    fn read(&self) -> BackingResult<Option<DocumentTree>> {
        match self.store.get_item(&self.key)? {
            Some(text) => decode_tree(&text),
            None => Ok(None),
        }
    }

    fn write(&mut self, tree: &DocumentTree) -> BackingResult<()> {
        let text = encode_tree(tree)?;
        self.store.set_item(&self.key, text)
    }
}
