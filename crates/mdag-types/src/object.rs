use serde::{Deserialize, Serialize};

use crate::codec::{base64_bytes, nullable_links};
use crate::digest::Digest;

/// Size of a single file chunk (256 KiB).
pub const CHUNK_SIZE: usize = 256 * 1024;

/// Maximum number of links held by one list node.
pub const MAX_FANOUT: usize = 4096;

/// Width in bytes of each per-link tag stored in a link-bearing object's data.
pub const TAG_WIDTH: usize = 4;

// ---------------------------------------------------------------------------
// LinkTag
// ---------------------------------------------------------------------------

/// Type marker recorded in a parent's data for each of its links.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LinkTag {
    /// The child is a single chunk blob.
    Blob,
    /// The child is a list node (file indirection).
    List,
    /// The child is a directory tree.
    Tree,
}

impl LinkTag {
    /// The 4-byte wire form of this tag.
    pub const fn as_bytes(&self) -> &'static [u8; TAG_WIDTH] {
        match self {
            Self::Blob => b"blob",
            Self::List => b"link",
            Self::Tree => b"tree",
        }
    }

    /// Parse a 4-byte wire tag.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        match bytes {
            b"blob" => Some(Self::Blob),
            b"link" => Some(Self::List),
            b"tree" => Some(Self::Tree),
            _ => None,
        }
    }
}

impl std::fmt::Display for LinkTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blob => write!(f, "blob"),
            Self::List => write!(f, "list"),
            Self::Tree => write!(f, "tree"),
        }
    }
}

// ---------------------------------------------------------------------------
// Link
// ---------------------------------------------------------------------------

/// A named, sized reference from a parent object to a child object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Entry name. Empty for file-chunk links.
    #[serde(rename = "Name", default)]
    pub name: String,
    /// Digest of the child object.
    #[serde(rename = "Hash")]
    pub hash: Digest,
    /// Bytes of content reachable through this link.
    #[serde(rename = "Size")]
    pub size: u64,
}

impl Link {
    /// Create a named link (directory entry).
    pub fn new(name: impl Into<String>, hash: Digest, size: u64) -> Self {
        Self {
            name: name.into(),
            hash,
            size,
        }
    }

    /// Create an unnamed link (file chunk or list node).
    pub fn unnamed(hash: Digest, size: u64) -> Self {
        Self::new(String::new(), hash, size)
    }
}

// ---------------------------------------------------------------------------
// Object
// ---------------------------------------------------------------------------

/// Logical kind of an object, derived from its shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// Leaf holding raw bytes.
    Blob,
    /// File indirection node.
    List,
    /// Directory node.
    Tree,
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blob => write!(f, "blob"),
            Self::List => write!(f, "list"),
            Self::Tree => write!(f, "tree"),
        }
    }
}

/// The unit of storage in the DAG.
///
/// When `links` is empty, `data` is raw file content, or `None` for an empty
/// directory. Otherwise `data` holds one [`LinkTag`] per link, in link order. Link order is significant: it is
/// the byte order of a chunked file and the enumeration order of a directory.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Object {
    #[serde(rename = "Links", with = "nullable_links")]
    pub links: Vec<Link>,
    #[serde(rename = "Data", with = "base64_bytes")]
    pub data: Option<Vec<u8>>,
}

impl Object {
    /// Create a leaf object holding `data`.
    pub fn blob(data: impl Into<Vec<u8>>) -> Self {
        Self {
            links: Vec::new(),
            data: Some(data.into()),
        }
    }

    /// Create an empty link-bearing object to be filled with [`push_link`].
    ///
    /// [`push_link`]: Object::push_link
    pub fn node() -> Self {
        Self::default()
    }

    /// Append a link and its tag.
    pub fn push_link(&mut self, link: Link, tag: LinkTag) {
        self.links.push(link);
        self.data
            .get_or_insert_with(Vec::new)
            .extend_from_slice(tag.as_bytes());
    }

    /// The data bytes; empty when `data` is `None`.
    pub fn payload(&self) -> &[u8] {
        self.data.as_deref().unwrap_or(&[])
    }

    /// Returns `true` if this object has no links.
    pub fn is_leaf(&self) -> bool {
        self.links.is_empty()
    }

    /// Classify the object by its shape.
    ///
    /// A directory is recognised by a `tree` tag or any named link. An empty
    /// directory has neither links nor data.
    pub fn kind(&self) -> ObjectKind {
        if self.is_leaf() {
            return match self.data {
                Some(_) => ObjectKind::Blob,
                None => ObjectKind::Tree,
            };
        }
        let named = self.links.iter().any(|l| !l.name.is_empty());
        let has_tree_tag = self.tags().any(|t| t == Some(LinkTag::Tree));
        if named || has_tree_tag {
            ObjectKind::Tree
        } else {
            ObjectKind::List
        }
    }

    /// Iterate over the per-link tags. Yields nothing for leaf objects.
    ///
    /// Unrecognised tags yield `None`; tags are informational only.
    pub fn tags(&self) -> impl Iterator<Item = Option<LinkTag>> + '_ {
        let raw: &[u8] = if self.is_leaf() { &[] } else { self.payload() };
        raw.chunks(TAG_WIDTH).map(LinkTag::from_bytes)
    }

    /// The tag recorded for the link at `index`, if any.
    pub fn tag_at(&self, index: usize) -> Option<LinkTag> {
        self.tags().nth(index).flatten()
    }

    /// Look up a link by name. Returns the first match.
    pub fn get(&self, name: &str) -> Option<&Link> {
        self.links.iter().find(|l| l.name == name)
    }

    /// Bytes of content this object represents.
    pub fn span(&self) -> u64 {
        if self.is_leaf() {
            self.payload().len() as u64
        } else {
            self.links.iter().map(|l| l.size).sum()
        }
    }
}
