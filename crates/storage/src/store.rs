//! Keyed store trait and the in-memory implementation.
//!
//! Adapters (SQL tables, files, etc.) implement [`KeyedStore`] externally. The
//! key rules live in the trait contract so every adapter rejects the same
//! inputs: an empty key is an invalid argument, and `update`/`delete` require
//! the key to exist.

use crate::error::StorageError;
use crate::Result;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Trait for keyed value storage.
///
/// # Example
///
/// ```ignore
/// use storage::{InMemoryStore, KeyedStore};
///
/// let store = InMemoryStore::new();
/// store.create("SPY", 412.5)?;
/// assert_eq!(store.get("SPY"), Some(412.5));
/// ```
pub trait KeyedStore<V>: Send + Sync {
    /// Get the value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<V>;

    /// Store `value` under `key`, replacing any previous value.
    fn create(&self, key: &str, value: V) -> Result<()>;

    /// Full key/value mapping.
    fn read(&self) -> HashMap<String, V>;

    /// Replace the value under an existing key.
    fn update(&self, key: &str, value: V) -> Result<()>;

    /// Remove an existing key.
    fn delete(&self, key: &str) -> Result<()>;

    /// Check if a key exists.
    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Create the key if absent, update it otherwise.
    fn upsert(&self, key: &str, value: V) -> Result<()> {
        if self.contains(key) {
            self.update(key, value)
        } else {
            self.create(key, value)
        }
    }
}

fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(StorageError::InvalidArgument(
            "key cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// In-memory implementation of [`KeyedStore`].
#[derive(Debug)]
pub struct InMemoryStore<V> {
    data: Arc<RwLock<HashMap<String, V>>>,
}

impl<V> InMemoryStore<V> {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Get the number of keys in the store.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Remove every key.
    pub fn clear(&self) {
        self.data.write().clear();
    }
}

impl<V> Default for InMemoryStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Clone for InMemoryStore<V> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

impl<V: Clone + Send + Sync> KeyedStore<V> for InMemoryStore<V> {
    fn get(&self, key: &str) -> Option<V> {
        self.data.read().get(key).cloned()
    }

    fn create(&self, key: &str, value: V) -> Result<()> {
        validate_key(key)?;
        debug!(key, "Creating store entry");
        self.data.write().insert(key.to_string(), value);
        Ok(())
    }

    fn read(&self) -> HashMap<String, V> {
        self.data.read().clone()
    }

    fn update(&self, key: &str, value: V) -> Result<()> {
        validate_key(key)?;
        let mut data = self.data.write();
        match data.get_mut(key) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(StorageError::NotFound(key.to_string())),
        }
    }

    fn delete(&self, key: &str) -> Result<()> {
        validate_key(key)?;
        if self.data.write().remove(key).is_some() {
            debug!(key, "Deleted store entry");
            Ok(())
        } else {
            Err(StorageError::NotFound(key.to_string()))
        }
    }
}
