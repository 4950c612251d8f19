//! Transient keyed store for parsed CSV documents and per-session state.
//!
//! Nothing here is persisted: entries live as long as the store value,
//! which the web server constructs once and shares through its state.
//! There is no eviction and no size bound.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use chrono::Utc;
use uuid::Uuid;

use crate::document::CsvDocument;

/// Store holding one parsed CSV per upload.
pub type CsvStore = MemoryStore<CsvDocument>;

#[derive(Debug)]
pub struct MemoryStore<V> {
    prefix: &'static str,
    entries: RwLock<HashMap<String, V>>,
}

impl<V> Default for MemoryStore<V> {
    fn default() -> Self {
        Self::new("csv")
    }
}

impl<V> MemoryStore<V> {
    /// `prefix` is prepended to every generated id.
    pub fn new(prefix: &'static str) -> Self {
        Self { prefix, entries: RwLock::new(HashMap::new()) }
    }

    /// Store `value` under a freshly generated id and return the id.
    pub fn put(&self, value: V) -> String {
        let id = self.generate_id();
        self.insert(id.clone(), value);
        id
    }

    pub fn insert(&self, id: impl Into<String>, value: V) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.into(), value);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(id)
    }

    /// Run `f` against the entry in place. Returns `None` for unknown ids.
    pub fn update<R>(&self, id: &str, f: impl FnOnce(&mut V) -> R) -> Option<R> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(id)
            .map(f)
    }

    pub fn remove(&self, id: &str) -> Option<V> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn generate_id(&self) -> String {
        let random = Uuid::new_v4().simple().to_string();
        format!("{}-{}-{}", self.prefix, Utc::now().timestamp_millis(), &random[..8])
    }
}

impl<V: Clone> MemoryStore<V> {
    pub fn get(&self, id: &str) -> Option<V> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }
}
