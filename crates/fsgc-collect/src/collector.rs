//! The collector and its per-run state.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, error, info, info_span, warn};

use fsgc_core::{CollectReport, CollectorConfig, DirEntry, GcWarning, WarningKind};
use fsgc_ops::{Deleter, FsRemover, Remover};
use fsgc_rules::{
    Clock, ExpiryEvaluator, PolicyLoader, RetentionEnforcer, TtlMarkerParser,
};
use fsgc_scan::{JwalkWalker, WalkEvent, Walker};

/// Walks a tree and removes expired and over-retained entries.
///
/// The collector holds no state between runs; each [`collect`](Self::collect)
/// call is an independent single pass.
pub struct Collector {
    config: CollectorConfig,
    walker: Box<dyn Walker>,
    deleter: Deleter,
    expiry: ExpiryEvaluator,
    loader: PolicyLoader,
}

impl Collector {
    /// Create a collector over the real file system and system clock.
    pub fn new(config: CollectorConfig) -> Self {
        let loader = PolicyLoader::new(config.policy_file.clone());
        Self {
            config,
            walker: Box::new(JwalkWalker::new()),
            deleter: Deleter::new(FsRemover),
            expiry: ExpiryEvaluator::new(),
            loader,
        }
    }

    /// Use a different traversal capability.
    pub fn with_walker(mut self, walker: impl Walker + 'static) -> Self {
        self.walker = Box::new(walker);
        self
    }

    /// Use a different removal capability.
    pub fn with_remover(self, remover: impl Remover + 'static) -> Self {
        self.with_boxed_remover(Box::new(remover))
    }

    /// Use an already boxed removal capability.
    pub fn with_boxed_remover(mut self, remover: Box<dyn Remover>) -> Self {
        self.deleter = Deleter::boxed(remover);
        self
    }

    /// Use a different clock for expiry decisions.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.expiry = ExpiryEvaluator::with_clock(clock);
        self
    }

    /// The configuration this collector runs with.
    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    /// Run one full collection over `root`.
    ///
    /// Never fails: problems are logged and recorded in the returned report.
    /// If the root itself cannot be walked the report carries a root error
    /// and nothing else happens.
    pub fn collect(&self, root: impl AsRef<Path>) -> CollectReport {
        let root = root.as_ref();
        let span = info_span!("collect", root = %root.display());
        let _guard = span.enter();

        info!("Starting collection");
        let start = Instant::now();
        let mut run = Run::new(self, root);

        let walked = self.walker.walk(root, &mut |event| run.visit(event));
        if let Err(err) = walked {
            error!(error = %err, "Cannot walk root");
            run.report.root_error = Some(err.to_string());
        }

        let mut report = run.report;
        report.elapsed = start.elapsed();
        info!("{}", report.summary());
        report
    }
}

impl std::fmt::Debug for Collector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collector")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// State of a single walk.
struct Run<'a> {
    collector: &'a Collector,
    parser: TtlMarkerParser<'a>,
    report: CollectReport,
    /// Paths removed so far, so nothing is removed twice.
    removed: HashSet<PathBuf>,
}

impl<'a> Run<'a> {
    fn new(collector: &'a Collector, root: &Path) -> Self {
        Self {
            collector,
            parser: TtlMarkerParser::new(&collector.config),
            report: CollectReport::new(root),
            removed: HashSet::new(),
        }
    }

    fn visit(&mut self, event: WalkEvent) {
        match event {
            WalkEvent::Error(warning) => {
                warn!(path = %warning.path.display(), "{}", warning.message);
                self.report.warn(warning);
            }
            WalkEvent::Entry(entry) if entry.is_dir() => self.visit_dir(&entry),
            WalkEvent::Entry(entry) => self.visit_file(&entry),
        }
    }

    fn visit_dir(&mut self, entry: &DirEntry) {
        self.report.record_dir();

        let policy = match self.collector.loader.load(&entry.path) {
            Ok(Some(policy)) => policy,
            Ok(None) => return,
            Err(err) => {
                warn!(dir = %entry.path.display(), error = %err, "Ignoring policy");
                self.report.warn(GcWarning::policy(&entry.path, &err));
                return;
            }
        };

        info!(dir = %entry.path.display(), "Found policy for directory");
        self.report.record_policy();

        let enforcer =
            RetentionEnforcer::new(self.collector.walker.as_ref(), &self.collector.deleter);
        match enforcer.enforce(&entry.path, &policy) {
            Ok(summary) => {
                self.report
                    .record_retention_deletions(summary.deleted() as u64, summary.bytes_freed);
                self.removed.extend(summary.removed);
                for failure in summary.failures {
                    self.report.warn(failure);
                }
            }
            Err(err) => {
                warn!(dir = %entry.path.display(), error = %err, "Cannot read directory");
                self.report.warn(GcWarning::new(
                    &entry.path,
                    err.to_string(),
                    WarningKind::ReadError,
                ));
            }
        }
    }

    fn visit_file(&mut self, entry: &DirEntry) {
        self.report.record_file();

        if self.removed.contains(&entry.path) {
            debug!(path = %entry.path.display(), depth = entry.depth, "Already removed");
            return;
        }

        let ttl = match self.parser.ttl_for(&entry.path) {
            Ok(Some(ttl)) => ttl,
            Ok(None) => return,
            Err(warning) => {
                self.report.warn(warning);
                return;
            }
        };

        if !self.collector.expiry.is_expired(ttl, entry.modified) {
            debug!(path = %entry.path.display(), depth = entry.depth, ?ttl, "Not expired");
            return;
        }

        match self.collector.deleter.delete(entry) {
            Ok(()) => {
                self.report.record_ttl_deletion(entry.size);
                self.removed.insert(entry.path.clone());
            }
            Err(warning) => self.report.warn(warning),
        }
    }
}
