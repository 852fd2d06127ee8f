use std::collections::HashMap;
use std::sync::RwLock;

use mdag_types::Digest;

use crate::error::{StoreError, StoreResult};
use crate::traits::ObjectStore;

/// In-memory, HashMap-based object store.
///
/// Intended for tests and embedding. All values are held in memory behind a
/// `RwLock` for safe concurrent access. Values are cloned on read/write.
pub struct InMemoryObjectStore {
    objects: RwLock<HashMap<Digest, Vec<u8>>>,
}

impl InMemoryObjectStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
        }
    }

    /// Number of objects currently stored.
    pub fn len(&self) -> usize {
        self.objects.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.read().expect("lock poisoned").is_empty()
    }

    /// Total bytes across all stored values.
    pub fn total_bytes(&self) -> u64 {
        self.objects
            .read()
            .expect("lock poisoned")
            .values()
            .map(|v| v.len() as u64)
            .sum()
    }

    /// Remove all objects from the store.
    pub fn clear(&self) {
        self.objects.write().expect("lock poisoned").clear();
    }

    /// Return a sorted list of all keys in the store.
    pub fn all_keys(&self) -> Vec<Digest> {
        let map = self.objects.read().expect("lock poisoned");
        let mut keys: Vec<Digest> = map.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Overwrite the value under `key`, bypassing idempotency.
    ///
    /// Only useful for corrupting a store in tests.
    pub fn overwrite(&self, key: &Digest, value: Vec<u8>) {
        self.objects
            .write()
            .expect("lock poisoned")
            .insert(key.clone(), value);
    }

    /// Remove the value under `key`. Returns `true` if it existed.
    pub fn remove(&self, key: &Digest) -> bool {
        self.objects
            .write()
            .expect("lock poisoned")
            .remove(key)
            .is_some()
    }
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn get(&self, key: &Digest) -> StoreResult<Option<Vec<u8>>> {
        let map = self.objects.read().expect("lock poisoned");
        Ok(map.get(key).cloned())
    }

    fn put(&self, key: &Digest, value: &[u8]) -> StoreResult<()> {
        if key.is_empty() {
            return Err(StoreError::EmptyKey);
        }
        let mut map = self.objects.write().expect("lock poisoned");
        // Same key always maps to the same content.
        map.entry(key.clone()).or_insert_with(|| value.to_vec());
        Ok(())
    }

    fn contains(&self, key: &Digest) -> StoreResult<bool> {
        let map = self.objects.read().expect("lock poisoned");
        Ok(map.contains_key(key))
    }
}

impl std::fmt::Debug for InMemoryObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.len();
        f.debug_struct("InMemoryObjectStore")
            .field("object_count", &count)
            .finish()
    }
}
