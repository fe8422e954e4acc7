//! Removal capability.

use std::fs;
use std::io;
use std::path::Path;

use fsgc_core::EntryKind;

/// Removes a single path.
pub trait Remover {
    /// Remove `path`; directories are removed with all their contents.
    fn remove(&self, path: &Path, kind: EntryKind) -> io::Result<()>;
}

/// Permanently removes entries from the file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsRemover;

impl Remover for FsRemover {
    fn remove(&self, path: &Path, kind: EntryKind) -> io::Result<()> {
        if kind.is_dir() {
            fs::remove_dir_all(path)
        } else {
            fs::remove_file(path)
        }
    }
}

/// Moves entries to the system trash instead of deleting them.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrashRemover;

impl Remover for TrashRemover {
    fn remove(&self, path: &Path, _kind: EntryKind) -> io::Result<()> {
        if fs::symlink_metadata(path).is_err() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} does not exist", path.display()),
            ));
        }
        trash::delete(path).map_err(|e| io::Error::other(e.to_string()))
    }
}
