//! Error types for DAG construction and resolution.

use mdag_store::StoreError;
use mdag_types::{CodecError, Digest};

/// Errors that can occur while building or resolving a DAG.
///
/// Every error is local to a single build or resolve call. Objects are
/// immutable and writes idempotent, so a failed build can be retried from
/// scratch without cleanup.
#[derive(Debug, thiserror::Error)]
pub enum DagError {
    /// Stored bytes do not decode to an object.
    #[error("cannot decode object {digest:?}: {source}")]
    Decode {
        /// Key the bytes were read from.
        digest: Digest,
        source: CodecError,
    },

    /// An object could not be serialized during a build.
    #[error("cannot encode object: {0}")]
    Encode(#[source] CodecError),

    /// A path component has no matching link at its level.
    #[error("path not found: no entry {component:?} while resolving {path:?}")]
    PathNotFound {
        /// The full path being resolved.
        path: String,
        /// The component that failed to match.
        component: String,
    },

    /// A referenced digest is absent from the store.
    #[error("object missing from store: {0:?}")]
    MissingObject(Digest),

    /// The store failed to read a key.
    #[error("store read failed for {digest:?}: {source}")]
    StoreRead { digest: Digest, source: StoreError },

    /// The store failed to write a key.
    #[error("store write failed for {digest:?}: {source}")]
    StoreWrite { digest: Digest, source: StoreError },

    /// The source tree could not be read.
    #[error("cannot read source {path:?}: {source}")]
    Source {
        /// Slash-separated path of the entry within the source tree.
        path: String,
        source: std::io::Error,
    },

    /// A stored object does not hash to the key it is stored under.
    #[error("digest mismatch: expected {expected:?}, computed {computed:?}")]
    DigestMismatch { expected: Digest, computed: Digest },

    /// The DAG configuration is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Writing reconstructed bytes to the output sink failed.
    #[error("output error: {0}")]
    Output(#[source] std::io::Error),
}

/// Convenience alias for DAG results.
pub type DagResult<T> = Result<T, DagError>;
