//! Collection run summary.

use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};

use crate::error::{GcWarning, WarningKind};

/// Summary of what a single collection run did.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectReport {
    /// Root path that was walked.
    pub root: PathBuf,
    /// When the run started.
    pub started_at: SystemTime,
    /// How long the run took.
    pub elapsed: Duration,
    /// Directories visited (including the root).
    pub dirs_visited: u64,
    /// Non-directory entries visited.
    pub files_visited: u64,
    /// Directories whose policy file was loaded and enforced.
    pub policies_applied: u64,
    /// Entries removed because their TTL elapsed.
    pub ttl_deleted: u64,
    /// Files removed by retention policies.
    pub retention_deleted: u64,
    /// Removals that failed.
    pub failed: u64,
    /// Bytes freed, from the visit snapshots.
    pub bytes_freed: u64,
    /// Non-fatal problems encountered.
    pub warnings: Vec<GcWarning>,
    /// Set when the root itself could not be walked.
    pub root_error: Option<String>,
}

impl CollectReport {
    /// Create an empty report for a run over `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            started_at: SystemTime::now(),
            elapsed: Duration::ZERO,
            dirs_visited: 0,
            files_visited: 0,
            policies_applied: 0,
            ttl_deleted: 0,
            retention_deleted: 0,
            failed: 0,
            bytes_freed: 0,
            warnings: Vec::new(),
            root_error: None,
        }
    }

    /// Record a visited directory.
    pub fn record_dir(&mut self) {
        self.dirs_visited += 1;
    }

    /// Record a visited non-directory entry.
    pub fn record_file(&mut self) {
        self.files_visited += 1;
    }

    /// Record a directory whose policy was enforced.
    pub fn record_policy(&mut self) {
        self.policies_applied += 1;
    }

    /// Record a TTL removal.
    pub fn record_ttl_deletion(&mut self, size: u64) {
        self.ttl_deleted += 1;
        self.bytes_freed += size;
    }

    /// Record the removals made by one directory's retention policy.
    pub fn record_retention_deletions(&mut self, count: u64, bytes: u64) {
        self.retention_deleted += count;
        self.bytes_freed += bytes;
    }

    /// Record a warning, counting failed removals.
    pub fn warn(&mut self, warning: GcWarning) {
        if warning.kind == WarningKind::DeleteError {
            self.failed += 1;
        }
        self.warnings.push(warning);
    }

    /// Total entries removed by either path.
    pub fn total_deleted(&self) -> u64 {
        self.ttl_deleted + self.retention_deleted
    }

    /// Check if there were any warnings during the run.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Whether the run could not even start walking the root.
    pub fn root_failed(&self) -> bool {
        self.root_error.is_some()
    }

    /// One-line human-readable summary.
    pub fn summary(&self) -> String {
        format!(
            "Deleted {} entries ({} by TTL, {} by retention), freed {}, {} failed, {} warnings in {:.2}s",
            self.total_deleted(),
            self.ttl_deleted,
            self.retention_deleted,
            humansize::format_size(self.bytes_freed, humansize::BINARY),
            self.failed,
            self.warnings.len(),
            self.elapsed.as_secs_f64()
        )
    }
}
