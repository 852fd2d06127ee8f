//! Content-addressed object storage for the mdag Merkle DAG.
//!
//! The DAG core treats storage as an external key-value map keyed by object
//! digest. This crate defines that contract and ships two backends.
//!
//! # Storage Backends
//!
//! All backends implement the [`ObjectStore`] trait:
//!
//! - [`InMemoryObjectStore`] -- `HashMap`-based store for tests and embedding
//! - [`FsObjectStore`] -- one file per object under a root directory
//!
//! # Design Rules
//!
//! 1. Values are immutable once written (content-addressing guarantees this).
//! 2. `put` of an existing key is a successful no-op.
//! 3. Concurrent reads are always safe.
//! 4. The store never interprets values -- it is a pure key-value store.
//! 5. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod fs;
pub mod memory;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use error::{StoreError, StoreResult};
pub use fs::FsObjectStore;
pub use memory::InMemoryObjectStore;
pub use traits::ObjectStore;
