//! Collection orchestration for fsgc.
//!
//! A [`Collector`] walks a tree once, depth-first in lexical order. Every
//! directory gets its retention policy (if it has one) enforced on its
//! immediate files before the walk descends into it; every other entry is
//! checked for an expired TTL marker. Nothing that goes wrong on a single
//! entry stops the walk.
//!
//! ```rust,no_run
//! use fsgc_collect::Collector;
//! use fsgc_core::CollectorConfig;
//!
//! let collector = Collector::new(CollectorConfig::default());
//! let report = collector.collect("/var/cache/builds");
//! println!("{}", report.summary());
//! ```

mod collector;

pub use collector::Collector;

// Re-export the types needed to configure a collector.
pub use fsgc_core::{CollectReport, CollectorConfig, GcWarning, WarningKind};
pub use fsgc_ops::{FsRemover, Remover, TrashRemover};
pub use fsgc_rules::{Clock, FixedClock, SystemClock};
pub use fsgc_scan::{JwalkWalker, WalkEvent, Walker};
