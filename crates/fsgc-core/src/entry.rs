//! Directory entry snapshots.

use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Type of file system entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Symbolic link (never followed).
    Symlink,
    /// Other file types (sockets, devices, etc.).
    Other,
}

impl EntryKind {
    /// Classify a file type without following links.
    pub fn from_file_type(file_type: std::fs::FileType) -> Self {
        if file_type.is_symlink() {
            Self::Symlink
        } else if file_type.is_dir() {
            Self::Directory
        } else if file_type.is_file() {
            Self::File
        } else {
            Self::Other
        }
    }

    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, Self::Directory)
    }
}

/// Read-only snapshot of an entry taken when it was visited.
///
/// The file system may change after the snapshot is taken.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirEntry {
    /// Full path as produced by the walk.
    pub path: PathBuf,
    /// Final path component.
    pub name: CompactString,
    /// Entry type.
    pub kind: EntryKind,
    /// Size in bytes (zero for directories).
    pub size: u64,
    /// Last modification time.
    pub modified: SystemTime,
    /// Depth below the walk root (root is 0).
    pub depth: usize,
}

impl DirEntry {
    /// Create a snapshot from explicit values.
    pub fn new(
        path: impl Into<PathBuf>,
        kind: EntryKind,
        size: u64,
        modified: SystemTime,
    ) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| CompactString::new(n.to_string_lossy()))
            .unwrap_or_else(|| CompactString::new(path.to_string_lossy()));
        Self {
            path,
            name,
            kind,
            size,
            modified,
            depth: 0,
        }
    }

    /// Create a snapshot from `symlink_metadata`-style metadata.
    pub fn from_metadata(path: &Path, metadata: &Metadata, depth: usize) -> Self {
        let kind = EntryKind::from_file_type(metadata.file_type());
        let size = if kind.is_dir() { 0 } else { metadata.len() };
        let modified = metadata.modified().unwrap_or(std::time::UNIX_EPOCH);
        Self::new(path, kind, size, modified).with_depth(depth)
    }

    /// Set the depth of this entry.
    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    /// Check if this entry is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }
}
