//! Per-directory policy loading.

use std::fs;
use std::io;
use std::path::Path;

use tracing::debug;

use fsgc_core::{CompiledPolicy, GcError, Policy};

/// Reads the policy file that sits directly inside a directory.
#[derive(Debug, Clone)]
pub struct PolicyLoader {
    file_name: String,
}

impl PolicyLoader {
    /// Create a loader for the given reserved file name.
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }

    /// The reserved policy file name.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Load and compile the policy of `dir`.
    ///
    /// Returns `Ok(None)` when the directory has no policy file. A file that
    /// cannot be read, is not a JSON object of non-negative integers, or
    /// holds a pattern that does not compile is an error; callers log it
    /// and carry on as if no policy existed.
    pub fn load(&self, dir: &Path) -> Result<Option<CompiledPolicy>, GcError> {
        let path = dir.join(&self.file_name);
        let data = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(GcError::io(path, err)),
        };

        let policy = Policy::from_json(&data).map_err(|e| GcError::policy(&path, e))?;
        let compiled = policy.compile().map_err(|e| GcError::policy(&path, e))?;
        debug!(path = %path.display(), rules = policy.len(), "Loaded policy");
        Ok(Some(compiled))
    }
}

impl Default for PolicyLoader {
    fn default() -> Self {
        Self::new(fsgc_core::DEFAULT_POLICY_FILE)
    }
}
