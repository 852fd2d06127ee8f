//! Hashing for the mdag Merkle DAG.
//!
//! Provides pluggable hash primitives ([`HashPrimitive`], with BLAKE3 and
//! SHA-256 built in) and the [`ObjectHasher`] that applies the canonical
//! object digest rule on top of any of them.
//!
//! The built-in primitives wrap the `blake3` and `sha2` crates.

pub mod hasher;
pub mod primitive;

pub use hasher::ObjectHasher;
pub use primitive::{DigestState, HashAlgorithm, HashPrimitive};
