//! Merkle DAG construction and resolution.
//!
//! [`DagBuilder`] turns a source tree of files and directories into
//! immutable, content-addressed objects: small files become single blobs,
//! large files are chunked under a bounded-fanout list tree, and directories
//! become trees of named links. [`DagResolver`] walks named links from a root
//! digest and reconstructs the bytes beneath any path.
//!
//! Both sides talk to storage only through [`mdag_store::ObjectStore`], and
//! hash only through [`mdag_crypto::ObjectHasher`].

pub mod builder;
pub mod config;
pub mod error;
pub mod resolver;
pub mod source;

pub use builder::{chunk_count, indirection_height, BuildStats, DagBuilder};
pub use config::DagConfig;
pub use error::{DagError, DagResult};
pub use resolver::DagResolver;
pub use source::{
    DirSource, FileSource, FsDir, FsFile, FsSource, MemDir, MemFile, MemNode, SourceIter,
    SourceNode,
};
