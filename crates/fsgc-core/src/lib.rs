//! Core types and configuration for fsgc.
//!
//! This crate provides the data structures shared by every stage of a
//! collection run: the immutable [`CollectorConfig`], per-directory
//! retention [`Policy`] documents, [`DirEntry`] snapshots and the
//! [`CollectReport`] summarising what a run did.

mod config;
mod entry;
mod error;
mod policy;
mod report;

pub use config::{
    CollectorConfig, CollectorConfigBuilder, CollectorConfigBuilderError, DEFAULT_MARKER,
    GcSettings, MatchScope, parse_duration,
};
pub use entry::{DirEntry, EntryKind};
pub use error::{GcError, GcWarning, WarningKind};
pub use policy::{CompiledPolicy, DEFAULT_POLICY_FILE, Policy, RetentionRule};
pub use report::CollectReport;
