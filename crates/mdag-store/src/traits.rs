use mdag_types::Digest;

use crate::error::StoreResult;

/// Content-addressed key-value store for encoded objects.
///
/// All implementations must satisfy these invariants:
/// - Keys are object digests; values are encoded objects.
/// - Values are immutable once written. Writing an existing key is a
///   successful no-op, since the same key always maps to the same bytes.
/// - Concurrent reads are always safe.
/// - The store never interprets values.
/// - All I/O errors are propagated, never silently ignored.
pub trait ObjectStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// Returns `Ok(None)` if the key does not exist.
    fn get(&self, key: &Digest) -> StoreResult<Option<Vec<u8>>>;

    /// Store `value` under `key`. Idempotent.
    fn put(&self, key: &Digest, value: &[u8]) -> StoreResult<()>;

    /// Check whether `key` exists.
    ///
    /// Default implementation reads the value. Backends may override.
    fn contains(&self, key: &Digest) -> StoreResult<bool> {
        Ok(self.get(key)?.is_some())
    }
}

impl<S: ObjectStore + ?Sized> ObjectStore for &S {
    fn get(&self, key: &Digest) -> StoreResult<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn put(&self, key: &Digest, value: &[u8]) -> StoreResult<()> {
        (**self).put(key, value)
    }

    fn contains(&self, key: &Digest) -> StoreResult<bool> {
        (**self).contains(key)
    }
}

impl<S: ObjectStore + ?Sized> ObjectStore for std::sync::Arc<S> {
    fn get(&self, key: &Digest) -> StoreResult<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn put(&self, key: &Digest, value: &[u8]) -> StoreResult<()> {
        (**self).put(key, value)
    }

    fn contains(&self, key: &Digest) -> StoreResult<bool> {
        (**self).contains(key)
    }
}
