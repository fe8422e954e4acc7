//! Failure-tolerant deletion.

use std::path::PathBuf;

use tracing::{info, warn};

use fsgc_core::{DirEntry, GcWarning};

use crate::remover::Remover;

/// Outcome of deleting a batch of entries.
#[derive(Debug, Clone, Default)]
pub struct DeletionSummary {
    /// Paths removed, in removal order.
    pub removed: Vec<PathBuf>,
    /// Bytes freed, from the entry snapshots.
    pub bytes_freed: u64,
    /// One warning per entry that could not be removed.
    pub failures: Vec<GcWarning>,
}

impl DeletionSummary {
    /// Number of entries removed.
    pub fn deleted(&self) -> usize {
        self.removed.len()
    }

    /// Number of entries that could not be removed.
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Check if every removal succeeded.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Deletes entries through a [`Remover`], logging instead of failing.
pub struct Deleter {
    remover: Box<dyn Remover>,
}

impl Deleter {
    /// Create a deleter over the given remover.
    pub fn new(remover: impl Remover + 'static) -> Self {
        Self {
            remover: Box::new(remover),
        }
    }

    /// Create a deleter over an already boxed remover.
    pub fn boxed(remover: Box<dyn Remover>) -> Self {
        Self { remover }
    }

    /// Remove a single entry. On failure the error is logged and returned
    /// as a warning; it is never fatal.
    pub fn delete(&self, entry: &DirEntry) -> Result<(), GcWarning> {
        info!(path = %entry.path.display(), "Deleting");
        self.remover
            .remove(&entry.path, entry.kind)
            .map_err(|err| {
                warn!(path = %entry.path.display(), error = %err, "Cannot delete");
                GcWarning::delete_failed(&entry.path, &err)
            })
    }

    /// Remove every entry, continuing past failures.
    pub fn delete_all<'a>(&self, entries: impl IntoIterator<Item = &'a DirEntry>) -> DeletionSummary {
        let mut summary = DeletionSummary::default();
        for entry in entries {
            match self.delete(entry) {
                Ok(()) => {
                    summary.removed.push(entry.path.clone());
                    summary.bytes_freed += entry.size;
                }
                Err(warning) => summary.failures.push(warning),
            }
        }
        summary
    }
}

impl std::fmt::Debug for Deleter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deleter").finish_non_exhaustive()
    }
}
