//! The source tree a DAG is built from.
//!
//! A [`SourceNode`] is either a file or a directory. Files expose their
//! length and ranged reads; directories expose an ordered, restartable
//! iteration of their children. Fan-out is unbounded here; bounding it is
//! the builder's job.
//!
//! Two implementations ship with the crate: [`MemNode`] for trees built in
//! memory and [`FsSource`] for trees on disk.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Byte content of a source file.
pub trait FileSource {
    /// Entry name within the parent directory.
    fn name(&self) -> &str;

    /// Length in bytes.
    fn size(&self) -> u64;

    /// Read exactly `len` bytes starting at `offset`.
    fn read_at(&self, offset: u64, len: usize) -> io::Result<Vec<u8>>;
}

/// Children of a source directory.
pub trait DirSource {
    /// Entry name within the parent directory.
    fn name(&self) -> &str;

    /// Total bytes of file content beneath this directory.
    fn size(&self) -> io::Result<u64>;

    /// Iterate the children in a stable order, each exactly once.
    ///
    /// Every call starts a fresh iteration.
    fn children(&self) -> io::Result<SourceIter<'_>>;
}

/// Iterator over a directory's children.
pub type SourceIter<'a> = Box<dyn Iterator<Item = io::Result<SourceNode<'a>>> + 'a>;

/// A node of the source tree.
pub enum SourceNode<'a> {
    File(Box<dyn FileSource + 'a>),
    Dir(Box<dyn DirSource + 'a>),
}

impl SourceNode<'_> {
    /// Entry name of the node.
    pub fn name(&self) -> &str {
        match self {
            Self::File(f) => f.name(),
            Self::Dir(d) => d.name(),
        }
    }

    /// Byte size of the node's content.
    pub fn size(&self) -> io::Result<u64> {
        match self {
            Self::File(f) => Ok(f.size()),
            Self::Dir(d) => d.size(),
        }
    }

    /// Returns `true` for directories.
    pub fn is_dir(&self) -> bool {
        matches!(self, Self::Dir(_))
    }
}

impl std::fmt::Debug for SourceNode<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = if self.is_dir() { "Dir" } else { "File" };
        f.debug_struct(kind)
            .field("name", &self.name())
            .field("size", &self.size().ok())
            .finish()
    }
}

impl<T: FileSource + ?Sized> FileSource for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn size(&self) -> u64 {
        (**self).size()
    }

    fn read_at(&self, offset: u64, len: usize) -> io::Result<Vec<u8>> {
        (**self).read_at(offset, len)
    }
}

impl<T: DirSource + ?Sized> DirSource for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn size(&self) -> io::Result<u64> {
        (**self).size()
    }

    fn children(&self) -> io::Result<SourceIter<'_>> {
        (**self).children()
    }
}

// ---------------------------------------------------------------------------
// In-memory tree
// ---------------------------------------------------------------------------

/// A file held in memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemFile {
    pub name: String,
    pub content: Vec<u8>,
}

/// A directory held in memory. Children iterate in insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemDir {
    pub name: String,
    pub children: Vec<MemNode>,
}

/// An in-memory source node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MemNode {
    File(MemFile),
    Dir(MemDir),
}

impl MemNode {
    /// A file node.
    pub fn file(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self::File(MemFile {
            name: name.into(),
            content: content.into(),
        })
    }

    /// A directory node.
    pub fn dir(name: impl Into<String>, children: Vec<MemNode>) -> Self {
        Self::Dir(MemDir {
            name: name.into(),
            children,
        })
    }

    /// Borrow this node as a builder input.
    pub fn as_source(&self) -> SourceNode<'_> {
        match self {
            Self::File(f) => SourceNode::File(Box::new(f)),
            Self::Dir(d) => SourceNode::Dir(Box::new(d)),
        }
    }
}

impl FileSource for MemFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.content.len() as u64
    }

    fn read_at(&self, offset: u64, len: usize) -> io::Result<Vec<u8>> {
        let start = usize::try_from(offset)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "offset overflows usize"))?;
        let end = start
            .checked_add(len)
            .filter(|end| *end <= self.content.len())
            .ok_or_else(|| io::Error::from(io::ErrorKind::UnexpectedEof))?;
        Ok(self.content[start..end].to_vec())
    }
}

impl DirSource for MemDir {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> io::Result<u64> {
        self.children.iter().try_fold(0u64, |total, child| -> io::Result<u64> {
            let size = match child {
                MemNode::File(f) => f.size(),
                MemNode::Dir(d) => d.size()?,
            };
            Ok(total + size)
        })
    }

    fn children(&self) -> io::Result<SourceIter<'_>> {
        Ok(Box::new(
            self.children
                .iter()
                .map(|c| Ok::<_, io::Error>(c.as_source())),
        ))
    }
}

// ---------------------------------------------------------------------------
// Filesystem tree
// ---------------------------------------------------------------------------

/// Entry point for building from the filesystem.
///
/// Children are visited in file-name order. Symbolic links and special
/// files are skipped. Names that are not valid UTF-8 are converted lossily.
pub struct FsSource;

impl FsSource {
    /// Open `path` as a source node, file or directory.
    pub fn open(path: impl AsRef<Path>) -> io::Result<SourceNode<'static>> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path)?;
        let name = entry_name(path);
        if metadata.is_dir() {
            Ok(SourceNode::Dir(Box::new(FsDir {
                path: path.to_path_buf(),
                name,
            })))
        } else if metadata.is_file() {
            Ok(SourceNode::File(Box::new(FsFile {
                path: path.to_path_buf(),
                name,
                size: metadata.len(),
            })))
        } else {
            Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is neither a file nor a directory", path.display()),
            ))
        }
    }
}

fn entry_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// A file on disk.
#[derive(Debug, Clone)]
pub struct FsFile {
    path: PathBuf,
    name: String,
    size: u64,
}

impl FileSource for FsFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn read_at(&self, offset: u64, len: usize) -> io::Result<Vec<u8>> {
        let mut file = File::open(&self.path)?;
        file.seek(SeekFrom::Start(offset))?;
        let mut buf = vec![0u8; len];
        file.read_exact(&mut buf)?;
        Ok(buf)
    }
}

/// A directory on disk.
#[derive(Debug, Clone)]
pub struct FsDir {
    path: PathBuf,
    name: String,
}

impl FsDir {
    fn entries(&self) -> impl Iterator<Item = walkdir::Result<walkdir::DirEntry>> {
        WalkDir::new(&self.path)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
    }
}

impl DirSource for FsDir {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> io::Result<u64> {
        let mut total = 0;
        for entry in WalkDir::new(&self.path).follow_links(false) {
            let entry = entry?;
            if entry.file_type().is_file() {
                total += entry.metadata()?.len();
            }
        }
        Ok(total)
    }

    fn children(&self) -> io::Result<SourceIter<'_>> {
        let iter = self.entries().filter_map(|entry| {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => return Some(Err(io::Error::from(e))),
            };
            let file_type = entry.file_type();
            let name = entry.file_name().to_string_lossy().into_owned();
            let path = entry.into_path();
            if file_type.is_dir() {
                Some(Ok(SourceNode::Dir(Box::new(FsDir { path, name }))))
            } else if file_type.is_file() {
                let size = match std::fs::metadata(&path) {
                    Ok(m) => m.len(),
                    Err(e) => return Some(Err(e)),
                };
                Some(Ok(SourceNode::File(Box::new(FsFile { path, name, size }))))
            } else {
                None
            }
        });
        Ok(Box::new(iter))
    }
}
