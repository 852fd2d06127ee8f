use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use mdag_types::Digest;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::ObjectStore;

/// Directory-backed object store.
///
/// Each value lives in its own file at `<root>/<first 2 hex>/<remaining hex>`,
/// the same fan-out git uses for loose objects. Keys of a single byte have no
/// remainder to split off and are stored as `<root>/<hex>`. Writes go to a
/// temporary file in the target directory and are renamed into place, so a
/// reader never observes a partially written value.
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    /// Open (or create) a store rooted at `root`.
    pub fn open(root: impl AsRef<Path>) -> StoreResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// The store's root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file holding `key`.
    pub fn object_path(&self, key: &Digest) -> PathBuf {
        let hex = key.to_hex();
        if hex.len() < 3 {
            return self.root.join(hex);
        }
        let (fanout, rest) = hex.split_at(2);
        self.root.join(fanout).join(rest)
    }
}

impl ObjectStore for FsObjectStore {
    fn get(&self, key: &Digest) -> StoreResult<Option<Vec<u8>>> {
        if key.is_empty() {
            return Ok(None);
        }
        match fs::read(self.object_path(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    fn put(&self, key: &Digest, value: &[u8]) -> StoreResult<()> {
        if key.is_empty() {
            return Err(StoreError::EmptyKey);
        }
        let path = self.object_path(key);
        if path.exists() {
            return Ok(());
        }
        let dir = path
            .parent()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "object path has no parent"))?;
        fs::create_dir_all(dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(value)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| StoreError::Io(e.error))?;

        debug!(key = %key.short_hex(), bytes = value.len(), "wrote object file");
        Ok(())
    }

    fn contains(&self, key: &Digest) -> StoreResult<bool> {
        Ok(!key.is_empty() && self.object_path(key).is_file())
    }
}
