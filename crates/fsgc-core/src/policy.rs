//! Per-directory retention policies.

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Reserved name of the policy file looked up in each directory.
pub const DEFAULT_POLICY_FILE: &str = "fsgc.json";

/// Map from a name pattern to how many matching files are kept.
///
/// For every pattern the newest `keep` matching files in a directory are
/// retained and older matches are removed. Given the policy file
///
/// ```json
/// { "master.*\\.tar\\.gz": 2 }
/// ```
///
/// and files `master1.tar.gz`, `master2.tar.gz`, `master3.tar.gz` modified in
/// that order, only `master1.tar.gz` is removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Policy(IndexMap<String, u64>);

impl Policy {
    /// Create an empty policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a policy from its JSON document.
    pub fn from_json(data: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(data)
    }

    /// Add a rule, replacing any previous keep count for the pattern.
    pub fn with_rule(mut self, pattern: impl Into<String>, keep: u64) -> Self {
        self.0.insert(pattern.into(), keep);
        self
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the policy has no rules.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate rules in file order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(p, k)| (p.as_str(), *k))
    }

    /// Compile every pattern. A single bad pattern fails the whole policy.
    pub fn compile(&self) -> Result<CompiledPolicy, regex::Error> {
        let rules = self
            .iter()
            .map(|(pattern, keep)| {
                Ok(RetentionRule {
                    pattern: Regex::new(pattern)?,
                    keep,
                })
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;
        Ok(CompiledPolicy { rules })
    }
}

/// A single compiled retention rule.
#[derive(Debug, Clone)]
pub struct RetentionRule {
    /// Unanchored pattern matched against file names.
    pub pattern: Regex,
    /// Number of newest matches kept.
    pub keep: u64,
}

/// A policy whose patterns have been compiled once for a directory visit.
#[derive(Debug, Clone, Default)]
pub struct CompiledPolicy {
    rules: Vec<RetentionRule>,
}

impl CompiledPolicy {
    /// Rules in file order.
    pub fn rules(&self) -> &[RetentionRule] {
        &self.rules
    }

    /// Check if the policy has no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
