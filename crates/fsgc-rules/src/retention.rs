//! Count-based retention.

use std::path::Path;

use tracing::{debug, info};

use fsgc_core::{CompiledPolicy, DirEntry, GcError};
use fsgc_ops::{Deleter, DeletionSummary};
use fsgc_scan::Walker;

/// Classification of a directory's files under a policy.
#[derive(Debug, Clone, Default)]
pub struct RetentionPlan {
    /// Files kept, newest first.
    pub keep: Vec<DirEntry>,
    /// Files past some pattern's keep count, newest first.
    pub remove: Vec<DirEntry>,
}

/// Split the immediate entries of a directory into kept and removed files.
///
/// Directories are never candidates. The policy file is an ordinary file and
/// is removed like any other once a pattern marks it. Files are ordered newest first with a stable sort, so ties keep the
/// listing order. Every rule counts its matches in that order and marks a
/// file once its count passes the rule's keep count; a file marked by
/// several rules is listed for removal once.
pub fn plan_retention(entries: Vec<DirEntry>, policy: &CompiledPolicy) -> RetentionPlan {
    let mut files: Vec<DirEntry> = entries.into_iter().filter(|e| !e.is_dir()).collect();
    files.sort_by(|a, b| b.modified.cmp(&a.modified));

    let mut counts = vec![0u64; policy.rules().len()];
    let mut plan = RetentionPlan::default();

    for file in files {
        let mut marked = false;
        for (rule, count) in policy.rules().iter().zip(counts.iter_mut()) {
            if rule.pattern.is_match(&file.name) {
                *count += 1;
                if *count > rule.keep {
                    marked = true;
                }
            }
        }
        if marked {
            plan.remove.push(file);
        } else {
            plan.keep.push(file);
        }
    }

    plan
}

/// Applies a directory's retention policy to its immediate files.
pub struct RetentionEnforcer<'a> {
    walker: &'a dyn Walker,
    deleter: &'a Deleter,
}

impl<'a> RetentionEnforcer<'a> {
    /// Create an enforcer listing through `walker` and removing through
    /// `deleter`.
    pub fn new(walker: &'a dyn Walker, deleter: &'a Deleter) -> Self {
        Self { walker, deleter }
    }

    /// Remove the files of `dir` that exceed the policy.
    ///
    /// Fails only when the directory cannot be listed. Individual removal
    /// failures are reported in the summary.
    pub fn enforce(&self, dir: &Path, policy: &CompiledPolicy) -> Result<DeletionSummary, GcError> {
        let entries = self.walker.read_dir(dir)?;
        debug!(dir = %dir.display(), entries = entries.len(), "Listed directory for retention");

        let plan = plan_retention(entries, policy);
        info!(
            dir = %dir.display(),
            count = plan.remove.len(),
            kept = plan.keep.len(),
            "Found files for removal"
        );

        Ok(self.deleter.delete_all(&plan.remove))
    }
}
