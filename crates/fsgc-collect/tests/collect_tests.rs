use std::cell::RefCell;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::{Duration, SystemTime};

use fsgc_collect::{
    Collector, CollectorConfig, FixedClock, Remover, WalkEvent, Walker, WarningKind,
};
use fsgc_core::{DirEntry, EntryKind, GcError, GcWarning, MatchScope};
use tempfile::TempDir;

const HOUR: Duration = Duration::from_secs(3600);

fn init_test_logging() {
    use tracing_subscriber::{EnvFilter, fmt};

    let _ = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Replays a fixed list of events instead of touching the file system.
struct StaticWalker {
    events: Vec<WalkEvent>,
}

impl StaticWalker {
    fn files(now: SystemTime, files: &[(&str, Duration)]) -> Self {
        let events = files
            .iter()
            .map(|(path, age)| {
                WalkEvent::Entry(DirEntry::new(*path, EntryKind::File, 1, now - *age))
            })
            .collect();
        Self { events }
    }
}

impl Walker for StaticWalker {
    fn walk(&self, _root: &Path, visit: &mut dyn FnMut(WalkEvent)) -> Result<(), GcError> {
        for event in &self.events {
            visit(event.clone());
        }
        Ok(())
    }

    fn read_dir(&self, dir: &Path) -> Result<Vec<DirEntry>, GcError> {
        Ok(self
            .events
            .iter()
            .filter_map(|event| match event {
                WalkEvent::Entry(entry) if entry.path.parent() == Some(dir) => Some(entry.clone()),
                _ => None,
            })
            .collect())
    }
}

/// A walker whose root never exists.
struct MissingRootWalker;

impl Walker for MissingRootWalker {
    fn walk(&self, root: &Path, _visit: &mut dyn FnMut(WalkEvent)) -> Result<(), GcError> {
        Err(GcError::io(root, io::Error::new(io::ErrorKind::NotFound, "missing")))
    }

    fn read_dir(&self, dir: &Path) -> Result<Vec<DirEntry>, GcError> {
        Err(GcError::io(dir, io::Error::new(io::ErrorKind::NotFound, "missing")))
    }
}

/// Records removals; fails for paths containing "locked".
#[derive(Clone, Default)]
struct RecordingRemover {
    removed: Rc<RefCell<Vec<PathBuf>>>,
}

impl Remover for RecordingRemover {
    fn remove(&self, path: &Path, _kind: EntryKind) -> io::Result<()> {
        if path.to_string_lossy().contains("locked") {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "locked"));
        }
        self.removed.borrow_mut().push(path.to_path_buf());
        Ok(())
    }
}

fn removed(remover: &RecordingRemover) -> Vec<String> {
    remover
        .removed
        .borrow()
        .iter()
        .map(|p| p.to_string_lossy().into_owned())
        .collect()
}

#[test]
fn test_collect_removes_expired_markers() {
    init_test_logging();
    let now = SystemTime::now();
    let walker = StaticWalker::files(
        now,
        &[
            ("/a/b/ttl=1", 25 * HOUR),
            ("/a/b/ttl=2", 25 * HOUR),
            ("/a/b/ttl=2h", 3 * HOUR),
            ("/a/b/ttl=2h", HOUR),
            ("/a/b/ttl=2/doc-ttl=1h.md", 2 * HOUR),
            ("/a/b/plain.txt", 1000 * HOUR),
        ],
    );
    let remover = RecordingRemover::default();

    let report = Collector::new(CollectorConfig::default())
        .with_walker(walker)
        .with_remover(remover.clone())
        .with_clock(FixedClock(now))
        .collect("/a");

    assert_eq!(
        removed(&remover),
        vec!["/a/b/ttl=1", "/a/b/ttl=2h", "/a/b/ttl=2/doc-ttl=1h.md"]
    );
    assert_eq!(report.ttl_deleted, 3);
    assert_eq!(report.files_visited, 6);
    assert_eq!(report.bytes_freed, 3);
    assert!(!report.has_warnings());
}

#[test]
fn test_entry_exactly_ttl_old_is_kept() {
    let now = SystemTime::now();
    let walker = StaticWalker::files(
        now,
        &[
            ("/x/exact-ttl=1", 24 * HOUR),
            ("/x/over-ttl=1", 24 * HOUR + Duration::from_secs(1)),
        ],
    );
    let remover = RecordingRemover::default();

    Collector::new(CollectorConfig::default())
        .with_walker(walker)
        .with_remover(remover.clone())
        .with_clock(FixedClock(now))
        .collect("/x");

    assert_eq!(removed(&remover), vec!["/x/over-ttl=1"]);
}

#[test]
fn test_failed_removal_does_not_stop_the_run() {
    let now = SystemTime::now();
    let walker = StaticWalker::files(
        now,
        &[
            ("/d/locked-ttl=1", 48 * HOUR),
            ("/d/ok-ttl=1", 48 * HOUR),
            ("/e/also-ttl=1h", 2 * HOUR),
        ],
    );
    let remover = RecordingRemover::default();

    let report = Collector::new(CollectorConfig::default())
        .with_walker(walker)
        .with_remover(remover.clone())
        .with_clock(FixedClock(now))
        .collect("/");

    assert_eq!(removed(&remover), vec!["/d/ok-ttl=1", "/e/also-ttl=1h"]);
    assert_eq!(report.ttl_deleted, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.warnings[0].kind, WarningKind::DeleteError);
}

#[test]
fn test_walk_errors_are_recorded_and_skipped() {
    let now = SystemTime::now();
    let mut walker = StaticWalker::files(now, &[("/r/old-ttl=1", 48 * HOUR)]);
    walker.events.insert(
        0,
        WalkEvent::Error(GcWarning::read_error("/r/private", "Permission denied")),
    );
    let remover = RecordingRemover::default();

    let report = Collector::new(CollectorConfig::default())
        .with_walker(walker)
        .with_remover(remover.clone())
        .with_clock(FixedClock(now))
        .collect("/r");

    assert_eq!(removed(&remover), vec!["/r/old-ttl=1"]);
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].kind, WarningKind::ReadError);
}

#[test]
fn test_missing_root_is_reported_not_raised() {
    let remover = RecordingRemover::default();
    let report = Collector::new(CollectorConfig::default())
        .with_walker(MissingRootWalker)
        .with_remover(remover.clone())
        .collect("/does/not/exist");

    assert!(report.root_failed());
    assert!(report.root_error.unwrap().contains("/does/not/exist"));
    assert!(removed(&remover).is_empty());
}

#[test]
fn test_missing_root_on_real_file_system() {
    let temp = TempDir::new().unwrap();
    let report = Collector::new(CollectorConfig::default()).collect(temp.path().join("missing"));
    assert!(report.root_failed());
    assert_eq!(report.total_deleted(), 0);
}

fn write_aged(path: &Path, age: Duration) {
    fs::write(path, b"0123456789").unwrap();
    File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(SystemTime::now() - age)
        .unwrap();
}

/// Builds:
///
/// ```text
/// root/
///   keep.txt              old, no marker
///   cache-ttl=1h          3h old            -> TTL
///   fresh-ttl=1           1h old
///   huge-ttl=99999999999999999999999        -> bad value warning
///   builds/fsgc.json      keep 2 master tarballs
///   builds/master{1,2,3}.tar.gz, master0-ttl=1.tar.gz (oldest), notes.txt
///   broken/fsgc.json      malformed
///   broken/master{1,2,3}.tar.gz
///   tmp-ttl=2h/a.log      3h old            -> TTL via ancestor
/// ```
fn create_test_tree() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    write_aged(&root.join("keep.txt"), 5000 * HOUR);
    write_aged(&root.join("cache-ttl=1h"), 3 * HOUR);
    write_aged(&root.join("fresh-ttl=1"), HOUR);
    write_aged(&root.join("huge-ttl=99999999999999999999999"), 5000 * HOUR);

    fs::create_dir(root.join("builds")).unwrap();
    fs::write(root.join("builds/fsgc.json"), r#"{ "master.*\\.tar\\.gz": 2 }"#).unwrap();
    write_aged(&root.join("builds/master0-ttl=1.tar.gz"), 120 * HOUR);
    write_aged(&root.join("builds/master1.tar.gz"), 30 * HOUR);
    write_aged(&root.join("builds/master2.tar.gz"), 20 * HOUR);
    write_aged(&root.join("builds/master3.tar.gz"), 10 * HOUR);
    write_aged(&root.join("builds/notes.txt"), 500 * HOUR);

    fs::create_dir(root.join("broken")).unwrap();
    fs::write(root.join("broken/fsgc.json"), "{ oops").unwrap();
    write_aged(&root.join("broken/master1.tar.gz"), 30 * HOUR);
    write_aged(&root.join("broken/master2.tar.gz"), 20 * HOUR);
    write_aged(&root.join("broken/master3.tar.gz"), 10 * HOUR);

    fs::create_dir(root.join("tmp-ttl=2h")).unwrap();
    write_aged(&root.join("tmp-ttl=2h/a.log"), 3 * HOUR);

    temp
}

#[test]
fn test_collect_real_tree() {
    init_test_logging();
    let temp = create_test_tree();
    let root = temp.path();

    let report = Collector::new(CollectorConfig::default()).collect(root);

    assert!(!root.join("cache-ttl=1h").exists());
    assert!(root.join("fresh-ttl=1").exists());
    assert!(root.join("keep.txt").exists());
    assert!(root.join("huge-ttl=99999999999999999999999").exists());

    assert!(!root.join("builds/master0-ttl=1.tar.gz").exists());
    assert!(!root.join("builds/master1.tar.gz").exists());
    assert!(root.join("builds/master2.tar.gz").exists());
    assert!(root.join("builds/master3.tar.gz").exists());
    assert!(root.join("builds/notes.txt").exists());
    assert!(root.join("builds/fsgc.json").exists());

    assert!(root.join("broken/master1.tar.gz").exists());
    assert!(root.join("broken/master2.tar.gz").exists());
    assert!(root.join("broken/master3.tar.gz").exists());

    assert!(!root.join("tmp-ttl=2h/a.log").exists());
    assert!(root.join("tmp-ttl=2h").is_dir());

    assert_eq!(report.ttl_deleted, 2);
    assert_eq!(report.retention_deleted, 2);
    assert_eq!(report.policies_applied, 1);
    assert_eq!(report.failed, 0);
    assert_eq!(report.bytes_freed, 40);
    assert!(report.dirs_visited >= 4);

    let kinds: Vec<_> = report.warnings.iter().map(|w| w.kind).collect();
    assert_eq!(kinds.len(), 2);
    assert!(kinds.contains(&WarningKind::PolicyError));
    assert!(kinds.contains(&WarningKind::TtlValueError));
}

#[test]
fn test_second_run_deletes_nothing() {
    let temp = create_test_tree();
    let collector = Collector::new(CollectorConfig::default());

    let first = collector.collect(temp.path());
    assert_eq!(first.total_deleted(), 4);

    let second = collector.collect(temp.path());
    assert_eq!(second.total_deleted(), 0);
    assert_eq!(second.failed, 0);
}

#[test]
fn test_base_name_scope_ignores_ancestor_markers() {
    let temp = create_test_tree();
    let root = temp.path();
    let config = CollectorConfig::builder()
        .match_scope(MatchScope::BaseName)
        .build()
        .unwrap();

    let report = Collector::new(config).collect(root);

    assert!(root.join("tmp-ttl=2h/a.log").exists());
    assert!(!root.join("cache-ttl=1h").exists());
    assert_eq!(report.ttl_deleted, 1);
}

#[test]
fn test_policy_file_name_is_configurable() {
    let temp = create_test_tree();
    let root = temp.path();
    let config = CollectorConfig::builder()
        .policy_file(".retention")
        .build()
        .unwrap();

    let report = Collector::new(config).collect(root);

    // fsgc.json is just another file now.
    assert!(root.join("builds/master1.tar.gz").exists());
    assert_eq!(report.policies_applied, 0);
    assert_eq!(report.retention_deleted, 0);
}

#[test]
fn test_policy_can_remove_its_own_file() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::write(root.join("fsgc.json"), r#"{ "\\.json$": 0 }"#).unwrap();
    write_aged(&root.join("a.json"), HOUR);
    write_aged(&root.join("notes.txt"), HOUR);

    let report = Collector::new(CollectorConfig::default()).collect(root);

    assert!(!root.join("a.json").exists());
    assert!(!root.join("fsgc.json").exists());
    assert!(root.join("notes.txt").exists());
    assert_eq!(report.policies_applied, 1);
    assert_eq!(report.retention_deleted, 2);
    assert_eq!(report.failed, 0);
}

#[test]
fn test_collector_exposes_its_config() {
    let config = CollectorConfig::builder()
        .policy_file(".retention")
        .match_scope(MatchScope::BaseName)
        .build()
        .unwrap();

    let collector = Collector::new(config);
    assert_eq!(collector.config().policy_file, ".retention");
    assert_eq!(collector.config().match_scope, MatchScope::BaseName);
}
