//! Foundation types for the mdag Merkle DAG.
//!
//! Every other mdag crate depends on `mdag-types`.
//!
//! # Key Types
//!
//! - [`Digest`] -- content hash of an object, also its store key
//! - [`Link`] -- named, sized reference to a child object
//! - [`Object`] -- the unit of storage: a link list plus a data payload
//! - [`LinkTag`] / [`ObjectKind`] -- blob, list, and tree markers
//!
//! The [`codec`] module holds the stable wire encoding.

pub mod codec;
pub mod digest;
pub mod error;
pub mod object;

pub use codec::{decode, encode};
pub use digest::Digest;
pub use error::{CodecError, CodecResult, TypeError};
pub use object::{Link, LinkTag, Object, ObjectKind, CHUNK_SIZE, MAX_FANOUT, TAG_WIDTH};
