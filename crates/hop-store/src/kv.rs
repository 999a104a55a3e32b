//! The `KeyValueStore` trait and the in-memory backend.

use std::collections::HashMap;

use crate::StoreResult;

/// String key-value persistence.
///
/// Implemented by [`MemoryStore`], [`crate::FileStore`], and (feature
/// `sqlite`) `SqliteStore`.
pub trait KeyValueStore: Send {
    /// Stored value for `key`, or `None` if never set.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    fn set(&mut self, key: &str, value: &str) -> StoreResult<()>;

    /// Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> StoreResult<()>;
}

/// Volatile backend; also the fallback when nothing persistent is configured.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> StoreResult<()> {
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StoreResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> StoreResult<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> StoreResult<()> {
        (**self).remove(key)
    }
}
