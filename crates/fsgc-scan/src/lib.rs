//! Directory traversal for fsgc.
//!
//! The collector never touches the file system for traversal directly. It is
//! handed a [`Walker`], which produces [`DirEntry`] snapshots in a stable
//! depth-first, lexically sorted order and lists single directories for
//! retention enforcement. [`JwalkWalker`] is the real implementation; tests
//! substitute their own.
//!
//! ```rust,no_run
//! use std::path::Path;
//! use fsgc_scan::{JwalkWalker, WalkEvent, Walker};
//!
//! let walker = JwalkWalker::new();
//! walker
//!     .walk(Path::new("/var/cache/builds"), &mut |event| {
//!         if let WalkEvent::Entry(entry) = event {
//!             println!("{}", entry.path.display());
//!         }
//!     })
//!     .unwrap();
//! ```

mod walker;

pub use walker::{JwalkWalker, WalkEvent, Walker};

// Re-export core types for convenience
pub use fsgc_core::{DirEntry, EntryKind, GcError, GcWarning, WarningKind};
