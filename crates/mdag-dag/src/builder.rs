//! DAG construction from a source tree.
//!
//! [`DagBuilder`] walks a [`SourceNode`] and writes one object per blob,
//! list node and directory to the store, children before parents, so that
//! every digest a parent links to is already durable.
//!
//! # Files
//!
//! A file no larger than `chunk_size` becomes a single blob. A larger file
//! is cut into `ceil(size / chunk_size)` chunks and covered by a tree of list
//! nodes whose height is [`indirection_height`]. A level-1 list node links
//! directly to up to `max_fanout` chunk blobs; a level-k node links to up to
//! `max_fanout` level-(k-1) nodes, each consuming as much of the remaining
//! bytes as it can hold, left to right.
//!
//! # Directories
//!
//! A directory becomes a tree object with one named link per child, in the
//! source's iteration order.

use mdag_crypto::ObjectHasher;
use mdag_store::ObjectStore;
use mdag_types::{codec, Digest, Link, LinkTag, Object, ObjectKind};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::DagConfig;
use crate::error::{DagError, DagResult};
use crate::source::{DirSource, FileSource, SourceNode};

/// Number of chunks needed to cover `size` bytes.
pub fn chunk_count(size: u64, chunk_size: usize) -> u64 {
    size.div_ceil(chunk_size.max(1) as u64)
}

/// Number of list-node levels above the chunk blobs of a file.
///
/// The smallest `height >= 1` such that `num_chunks / max_fanout^height`
/// is zero under integer division. `max_fanout` values below 2 are treated
/// as 2.
pub fn indirection_height(num_chunks: u64, max_fanout: usize) -> u32 {
    let fanout = max_fanout.max(2) as u64;
    let mut height = 1;
    let mut rest = num_chunks / fanout;
    while rest != 0 {
        height += 1;
        rest /= fanout;
    }
    height
}

/// Counters collected during one build.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BuildStats {
    /// Objects handed to the store, duplicates included.
    pub objects_written: u64,
    /// Chunk and single-blob file objects.
    pub blobs: u64,
    /// List nodes.
    pub lists: u64,
    /// Directory objects.
    pub trees: u64,
    /// File content bytes consumed.
    pub bytes: u64,
    /// Greatest indirection height of any file.
    pub max_height: u32,
}

/// Result of building one node.
struct Built {
    digest: Digest,
    size: u64,
    tag: LinkTag,
}

#[derive(Default)]
struct BuildContext {
    stats: BuildStats,
    path: Vec<String>,
}

impl BuildContext {
    fn source_error(&self, source: std::io::Error) -> DagError {
        DagError::Source {
            path: self.path.join("/"),
            source,
        }
    }
}

/// Builds Merkle DAGs into an object store.
pub struct DagBuilder<'s> {
    store: &'s dyn ObjectStore,
    hasher: ObjectHasher,
    config: DagConfig,
}

impl<'s> DagBuilder<'s> {
    /// Builder with the canonical configuration.
    pub fn new(store: &'s dyn ObjectStore) -> Self {
        let config = DagConfig::default();
        Self {
            store,
            hasher: config.hasher(),
            config,
        }
    }

    /// Builder with a custom configuration.
    pub fn with_config(store: &'s dyn ObjectStore, config: DagConfig) -> DagResult<Self> {
        config.validate()?;
        Ok(Self {
            store,
            hasher: config.hasher(),
            config,
        })
    }

    /// Replace the hasher, e.g. with one over a custom primitive.
    pub fn with_hasher(mut self, hasher: ObjectHasher) -> Self {
        self.hasher = hasher;
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &DagConfig {
        &self.config
    }

    /// Build `node` into the store and return the root digest.
    pub fn add(&self, node: &SourceNode<'_>) -> DagResult<Digest> {
        self.add_with_stats(node).map(|(digest, _)| digest)
    }

    /// Build `node` into the store, returning the root digest and counters.
    pub fn add_with_stats(&self, node: &SourceNode<'_>) -> DagResult<(Digest, BuildStats)> {
        let mut cx = BuildContext::default();
        let built = self.build_node(&mut cx, node)?;
        self.confirm_root(&built.digest)?;

        info!(
            root = %built.digest.short_hex(),
            objects = cx.stats.objects_written,
            bytes = cx.stats.bytes,
            hash = self.hasher.algorithm_name(),
            "added DAG"
        );
        Ok((built.digest, cx.stats))
    }

    fn build_node(&self, cx: &mut BuildContext, node: &SourceNode<'_>) -> DagResult<Built> {
        match node {
            SourceNode::File(file) => self.build_file(cx, file.as_ref()),
            SourceNode::Dir(dir) => self.build_dir(cx, dir.as_ref()),
        }
    }

    fn build_file(&self, cx: &mut BuildContext, file: &dyn FileSource) -> DagResult<Built> {
        let size = file.size();
        let chunk_size = self.config.chunk_size as u64;
        cx.stats.bytes += size;

        if size <= chunk_size {
            let data = file.read_at(0, size as usize).map_err(|e| cx.source_error(e))?;
            let digest = self.write_object(cx, &Object::blob(data), ObjectKind::Blob)?;
            return Ok(Built {
                digest,
                size,
                tag: LinkTag::Blob,
            });
        }

        let height = indirection_height(
            chunk_count(size, self.config.chunk_size),
            self.config.max_fanout,
        );
        cx.stats.max_height = cx.stats.max_height.max(height);
        debug!(size, height, "chunking file");
        self.build_list(cx, file, height, 0)
    }

    /// Build a level-`level` list node covering bytes from `start` onward.
    fn build_list(
        &self,
        cx: &mut BuildContext,
        file: &dyn FileSource,
        level: u32,
        start: u64,
    ) -> DagResult<Built> {
        let size = file.size();
        let chunk_size = self.config.chunk_size as u64;
        let mut node = Object::node();
        let mut offset = start;

        while node.links.len() < self.config.max_fanout && offset < size {
            if level == 1 {
                let len = chunk_size.min(size - offset);
                let data = file
                    .read_at(offset, len as usize)
                    .map_err(|e| cx.source_error(e))?;
                let digest = self.write_object(cx, &Object::blob(data), ObjectKind::Blob)?;
                node.push_link(Link::unnamed(digest, len), LinkTag::Blob);
                offset += len;
            } else {
                let child = self.build_list(cx, file, level - 1, offset)?;
                offset += child.size;
                node.push_link(Link::unnamed(child.digest, child.size), LinkTag::List);
            }
        }

        let digest = self.write_object(cx, &node, ObjectKind::List)?;
        Ok(Built {
            digest,
            size: offset - start,
            tag: LinkTag::List,
        })
    }

    fn build_dir(&self, cx: &mut BuildContext, dir: &dyn DirSource) -> DagResult<Built> {
        let mut tree = Object::node();
        let children = dir.children().map_err(|e| cx.source_error(e))?;

        for child in children {
            let child = child.map_err(|e| cx.source_error(e))?;
            cx.path.push(child.name().to_string());
            let built = self.build_node(cx, &child)?;
            cx.path.pop();
            tree.push_link(Link::new(child.name(), built.digest, built.size), built.tag);
        }

        let digest = self.write_object(cx, &tree, ObjectKind::Tree)?;
        Ok(Built {
            digest,
            size: tree.span(),
            tag: LinkTag::Tree,
        })
    }

    fn write_object(
        &self,
        cx: &mut BuildContext,
        object: &Object,
        kind: ObjectKind,
    ) -> DagResult<Digest> {
        let (encoded, digest) = self.hasher.encode_and_hash(object).map_err(DagError::Encode)?;
        self.store
            .put(&digest, &encoded)
            .map_err(|source| DagError::StoreWrite {
                digest: digest.clone(),
                source,
            })?;

        cx.stats.objects_written += 1;
        match kind {
            ObjectKind::Blob => cx.stats.blobs += 1,
            ObjectKind::List => cx.stats.lists += 1,
            ObjectKind::Tree => cx.stats.trees += 1,
        }
        debug!(
            digest = %digest.short_hex(),
            %kind,
            links = object.links.len(),
            bytes = encoded.len(),
            "stored object"
        );
        Ok(digest)
    }

    /// Re-read the root and check it hashes to the key it was stored under.
    fn confirm_root(&self, root: &Digest) -> DagResult<()> {
        let stored = self
            .store
            .get(root)
            .map_err(|source| DagError::StoreRead {
                digest: root.clone(),
                source,
            })?
            .ok_or_else(|| DagError::MissingObject(root.clone()))?;
        let object = codec::decode(&stored).map_err(|source| DagError::Decode {
            digest: root.clone(),
            source,
        })?;
        let computed = self.hasher.hash(&object, &stored);
        if computed != *root {
            return Err(DagError::DigestMismatch {
                expected: root.clone(),
                computed,
            });
        }
        Ok(())
    }
}

impl std::fmt::Debug for DagBuilder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DagBuilder")
            .field("config", &self.config)
            .field("hasher", &self.hasher)
            .finish()
    }
}
