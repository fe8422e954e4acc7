//! Serial jwalk-based traversal.

use std::io;
use std::path::{Path, PathBuf};

use jwalk::{Parallelism, WalkDir};
use tracing::debug;

use fsgc_core::{DirEntry, GcError, GcWarning, WarningKind};

/// Something observed while walking a tree.
#[derive(Debug, Clone)]
pub enum WalkEvent {
    /// An entry snapshot.
    Entry(DirEntry),
    /// A node that could not be read. Its subtree is not visited.
    Error(GcWarning),
}

/// Traversal capability used by the collector.
pub trait Walker {
    /// Visit `root` and everything below it, depth-first in lexical order.
    ///
    /// Directories are visited before their contents. Only a failure to
    /// stat `root` itself is returned as an error.
    fn walk(&self, root: &Path, visit: &mut dyn FnMut(WalkEvent)) -> Result<(), GcError>;

    /// List the immediate entries of `dir` in lexical order.
    fn read_dir(&self, dir: &Path) -> Result<Vec<DirEntry>, GcError>;
}

/// Walker backed by jwalk running on the calling thread.
///
/// Symbolic links are never followed and hidden entries are included.
#[derive(Debug, Clone, Copy, Default)]
pub struct JwalkWalker;

impl JwalkWalker {
    /// Create a new walker.
    pub fn new() -> Self {
        Self
    }

    fn walk_dir(root: &Path) -> WalkDir {
        WalkDir::new(root)
            .parallelism(Parallelism::Serial)
            .sort(true)
            .skip_hidden(false)
            .follow_links(false)
    }
}

impl Walker for JwalkWalker {
    fn walk(&self, root: &Path, visit: &mut dyn FnMut(WalkEvent)) -> Result<(), GcError> {
        let root_metadata = std::fs::symlink_metadata(root).map_err(|e| GcError::io(root, e))?;

        // A non-directory root is a single-entry tree.
        if !root_metadata.is_dir() {
            visit(WalkEvent::Entry(DirEntry::from_metadata(root, &root_metadata, 0)));
            return Ok(());
        }

        for entry_result in Self::walk_dir(root).min_depth(0) {
            let entry = match entry_result {
                Ok(e) => e,
                Err(err) => {
                    let path = error_path(&err, root);
                    visit(WalkEvent::Error(GcWarning::read_error(path, &err)));
                    continue;
                }
            };

            let path = entry.path();
            match entry.metadata() {
                Ok(metadata) => {
                    visit(WalkEvent::Entry(DirEntry::from_metadata(
                        &path,
                        &metadata,
                        entry.depth(),
                    )));
                }
                Err(err) if is_not_found(&err) => {
                    debug!(path = %path.display(), "Entry vanished before it was visited");
                    continue;
                }
                Err(err) => {
                    visit(WalkEvent::Error(GcWarning::new(
                        &path,
                        err.to_string(),
                        WarningKind::MetadataError,
                    )));
                    continue;
                }
            }

            // jwalk keeps a failed listing on the directory entry itself.
            if let Some(err) = &entry.read_children_error {
                if is_not_found(err) {
                    debug!(path = %path.display(), "Directory vanished before it was listed");
                } else {
                    visit(WalkEvent::Error(GcWarning::read_error(&path, err)));
                }
            }
        }

        Ok(())
    }

    fn read_dir(&self, dir: &Path) -> Result<Vec<DirEntry>, GcError> {
        let metadata = std::fs::symlink_metadata(dir).map_err(|e| GcError::io(dir, e))?;
        if !metadata.is_dir() {
            return Err(GcError::io(
                dir,
                io::Error::new(io::ErrorKind::NotADirectory, "not a directory"),
            ));
        }

        let mut entries = Vec::new();
        for entry_result in Self::walk_dir(dir).max_depth(1) {
            let entry = entry_result.map_err(|err| {
                let path = error_path(&err, dir);
                GcError::io(path, to_io_error(&err))
            })?;

            if entry.depth() == 0 {
                if let Some(err) = &entry.read_children_error {
                    return Err(GcError::io(dir, to_io_error(err)));
                }
                continue;
            }

            let path = entry.path();
            match entry.metadata() {
                Ok(metadata) => entries.push(DirEntry::from_metadata(&path, &metadata, 1)),
                Err(err) if is_not_found(&err) => {
                    debug!(path = %path.display(), "Entry vanished while listing");
                }
                Err(err) => return Err(GcError::io(path, to_io_error(&err))),
            }
        }

        Ok(entries)
    }
}

fn error_path(err: &jwalk::Error, fallback: &Path) -> PathBuf {
    err.path()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| fallback.to_path_buf())
}

fn is_not_found(err: &jwalk::Error) -> bool {
    err.io_error()
        .is_some_and(|e| e.kind() == io::ErrorKind::NotFound)
}

fn to_io_error(err: &jwalk::Error) -> io::Error {
    let kind = err.io_error().map_or(io::ErrorKind::Other, io::Error::kind);
    io::Error::new(kind, err.to_string())
}
