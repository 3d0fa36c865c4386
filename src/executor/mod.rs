//! Applies a scan snapshot to the mirror tree
//!
//! Every snapshot directory becomes one [`TransferJob`]. Jobs run on a
//! [`WorkerPool`]; inside a job files are handled strictly in order and each
//! one ends as a [`CopyOutcome`] that is recorded and counted as progress.

pub mod copy;
pub mod pool;
pub mod progress;

pub use copy::{clear_readonly, copy_file};
pub use pool::{JobHandler, PoolStats, TransferJob, WorkerPool};
pub use progress::{NoProgress, ProgressSink, ProgressTracker};

use crate::diff::decide;
use crate::stats::StatisticsAggregator;
use crate::types::{MirraError, OperationKind, PathMapping, ScanSnapshot, SyncDecision};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Result of syncing a single file.
#[derive(Debug)]
pub enum CopyOutcome {
    /// Target already up to date
    Skipped,
    Added,
    Updated,
    Failed(MirraError),
}

impl CopyOutcome {
    /// Operation to record, if any
    pub fn operation(&self) -> Option<OperationKind> {
        match self {
            CopyOutcome::Skipped => None,
            CopyOutcome::Added => Some(OperationKind::Add),
            CopyOutcome::Updated => Some(OperationKind::Update),
            CopyOutcome::Failed(_) => Some(OperationKind::Failure),
        }
    }
}

/// Summary of an apply pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplySummary {
    pub jobs: usize,
    pub files: usize,
    pub workers: usize,
    /// Whether jobs had to run inline because the pool was unavailable
    pub inline: bool,
}

/// Bring `target` in line with `source` for one file.
pub fn sync_file(source: &Path, target: &Path) -> CopyOutcome {
    let decision = match decide(source, target) {
        Ok(decision) => decision,
        Err(e) => return CopyOutcome::Failed(e),
    };

    match decision {
        SyncDecision::Skip => CopyOutcome::Skipped,
        SyncDecision::Copy { is_update } => match copy_file(source, target, is_update) {
            Ok(_) if is_update => CopyOutcome::Updated,
            Ok(_) => CopyOutcome::Added,
            Err(e) => CopyOutcome::Failed(e),
        },
    }
}

/// Shared state for every job of one apply pass
struct JobContext {
    mapping: PathMapping,
    stats: Arc<StatisticsAggregator>,
    progress: Arc<ProgressTracker>,
}

impl JobContext {
    fn run(&self, job: TransferJob) {
        let target_dir = match self.prepare_directory(&job.directory) {
            Ok(dir) => dir,
            Err(e) => {
                debug!(
                    directory = %job.directory.display(),
                    "cannot create mirror directory: {}", e
                );
                for file in &job.files {
                    let target = self.mapping.to_mirror(file).unwrap_or_else(|| file.clone());
                    self.stats.record(&target, OperationKind::Failure);
                    self.progress.advance();
                }
                return;
            }
        };

        for file in &job.files {
            let outcome = match file.file_name() {
                Some(name) => {
                    let target = target_dir.join(name);
                    let outcome = sync_file(file, &target);
                    if let CopyOutcome::Failed(e) = &outcome {
                        debug!(
                            path = %file.display(),
                            permission = e.is_permission_error(),
                            "copy failed: {}", e
                        );
                    }
                    outcome.operation().map(|kind| (target, kind))
                }
                None => Some((file.clone(), OperationKind::Failure)),
            };

            if let Some((target, kind)) = outcome {
                self.stats.record(&target, kind);
            }
            self.progress.advance();
        }
    }

    fn prepare_directory(&self, directory: &Path) -> Result<std::path::PathBuf, MirraError> {
        let target_dir = self.mapping.to_mirror(directory).ok_or_else(|| {
            MirraError::Validation(format!(
                "{} is outside the source root",
                directory.display()
            ))
        })?;
        fs::create_dir_all(&target_dir).map_err(|e| MirraError::from_io(&target_dir, e))?;
        Ok(target_dir)
    }
}

/// Copy new and newer files from every snapshot directory into the mirror.
///
/// Runs on `threads` workers and returns once every job has finished. Per-file
/// problems are recorded as `Failure` and never stop the pass; if the worker
/// pool itself can't be started the jobs run inline on the calling thread.
/// Progress always ends at exactly `1.0`.
pub fn apply(
    snapshot: &ScanSnapshot,
    mapping: &PathMapping,
    threads: usize,
    progress: Arc<dyn ProgressSink>,
    stats: &Arc<StatisticsAggregator>,
) -> ApplySummary {
    let tracker = Arc::new(ProgressTracker::new(progress, snapshot.file_count()));
    let context = Arc::new(JobContext {
        mapping: mapping.clone(),
        stats: Arc::clone(stats),
        progress: Arc::clone(&tracker),
    });

    let jobs: Vec<TransferJob> = snapshot
        .iter()
        .enumerate()
        .map(|(index, (directory, files))| TransferJob {
            index,
            directory: directory.clone(),
            files: files.clone(),
        })
        .collect();

    let mut summary = ApplySummary {
        jobs: jobs.len(),
        files: snapshot.file_count(),
        workers: threads.max(1),
        inline: false,
    };

    let leftover = match run_on_pool(jobs, threads, &context) {
        Ok(()) => Vec::new(),
        Err((e, leftover)) => {
            warn!("worker pool unavailable, applying inline: {}", e);
            summary.inline = true;
            leftover
        }
    };
    for job in leftover {
        context.run(job);
    }

    tracker.finish();
    debug!(
        processed = tracker.processed(),
        jobs = summary.jobs,
        inline = summary.inline,
        "apply pass complete"
    );
    summary
}

/// Feed `jobs` through a pool; on failure hand back the jobs that never ran.
fn run_on_pool(
    jobs: Vec<TransferJob>,
    threads: usize,
    context: &Arc<JobContext>,
) -> Result<(), (MirraError, Vec<TransferJob>)> {
    let handler: Arc<JobHandler> = {
        let context = Arc::clone(context);
        Arc::new(move |job: TransferJob| context.run(job))
    };

    let pool = match WorkerPool::new(threads, jobs.len(), handler) {
        Ok(pool) => pool,
        Err(e) => return Err((e, jobs)),
    };

    let mut pending = jobs.into_iter();
    while let Some(job) = pending.next() {
        if let Err(e) = pool.enqueue(job.clone()) {
            let mut leftover = vec![job];
            leftover.extend(pending);
            // Already-queued jobs still drain before we fall back
            if let Err(close_error) = pool.close_and_wait() {
                warn!("apply pool shut down uncleanly: {}", close_error);
            }
            return Err((e, leftover));
        }
    }

    match pool.close_and_wait() {
        Ok(stats) => {
            debug!(
                workers = stats.workers,
                completed = stats.completed,
                panicked = stats.panicked,
                per_worker = ?stats.per_worker_completed,
                "apply pool drained"
            );
            Ok(())
        }
        Err(e) => {
            warn!("apply pool shut down uncleanly: {}", e);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filetime::FileTime;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingSink {
        values: Mutex<Vec<f64>>,
    }

    impl ProgressSink for RecordingSink {
        fn report(&self, fraction: f64) {
            self.values.lock().expect("lock values").push(fraction);
        }
    }

    struct Fixture {
        _src: TempDir,
        _dst: TempDir,
        source_root: PathBuf,
        mapping: PathMapping,
    }

    fn fixture() -> Fixture {
        let src = TempDir::new().expect("create src tempdir");
        let dst = TempDir::new().expect("create dst tempdir");
        let source_root = src.path().join("project");
        fs::create_dir(&source_root).expect("create source root");
        let mapping = PathMapping::new(&source_root, dst.path().join("project"));
        Fixture {
            _src: src,
            _dst: dst,
            source_root,
            mapping,
        }
    }

    fn snapshot_of(root: &Path, files: &[&str]) -> ScanSnapshot {
        let mut entries: Vec<(PathBuf, Vec<PathBuf>)> = Vec::new();
        for rel in files {
            let path = root.join(rel);
            fs::create_dir_all(path.parent().expect("parent")).expect("create parent");
            fs::write(&path, rel.as_bytes()).expect("write source file");
            let dir = path.parent().expect("parent").to_path_buf();
            match entries.iter_mut().find(|(d, _)| *d == dir) {
                Some((_, list)) => list.push(path),
                None => entries.push((dir, vec![path])),
            }
        }
        ScanSnapshot::from_entries(entries)
    }

    #[test]
    fn test_sync_file_outcomes() {
        let fx = fixture();
        let src = fx.source_root.join("a.txt");
        let dst = fx.source_root.join("b.txt");
        fs::write(&src, b"payload").expect("write src");

        assert!(matches!(sync_file(&src, &dst), CopyOutcome::Added));
        assert!(matches!(sync_file(&src, &dst), CopyOutcome::Skipped));

        filetime::set_file_mtime(&src, FileTime::from_unix_time(4_000_000_000, 0))
            .expect("bump src mtime");
        assert!(matches!(sync_file(&src, &dst), CopyOutcome::Updated));

        let missing = fx.source_root.join("missing.txt");
        assert!(matches!(sync_file(&missing, &dst), CopyOutcome::Failed(_)));
    }

    #[test]
    fn test_apply_copies_every_directory() {
        let fx = fixture();
        let snapshot = snapshot_of(&fx.source_root, &["a.txt", "sub/b.txt", "sub/deep/c.md"]);
        let stats = Arc::new(StatisticsAggregator::new());
        let sink = Arc::new(RecordingSink::default());

        let summary = apply(&snapshot, &fx.mapping, 4, sink.clone(), &stats);

        assert_eq!(summary.jobs, 3);
        assert_eq!(summary.files, 3);
        assert!(!summary.inline);
        let mirror = fx.mapping.mirror_root();
        assert_eq!(fs::read(mirror.join("sub/deep/c.md")).expect("read c.md"), b"sub/deep/c.md");
        assert_eq!(stats.operations().added, 3);

        let values = sink.values.lock().expect("lock values").clone();
        assert!(values.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(values.last().copied(), Some(1.0));
    }

    #[test]
    fn test_apply_failure_does_not_stop_directory() {
        let fx = fixture();
        let mut snapshot_files = vec![fx.source_root.join("ghost.txt")];
        fs::write(fx.source_root.join("real.txt"), b"real").expect("write real");
        snapshot_files.push(fx.source_root.join("real.txt"));
        let snapshot = ScanSnapshot::from_entries(vec![(fx.source_root.clone(), snapshot_files)]);
        let stats = Arc::new(StatisticsAggregator::new());

        apply(&snapshot, &fx.mapping, 2, Arc::new(NoProgress), &stats);

        let ops = stats.operations();
        assert_eq!(ops.failed, 1);
        assert_eq!(ops.added, 1);
        assert!(fx.mapping.mirror_root().join("real.txt").exists());
    }

    #[test]
    fn test_apply_empty_snapshot_reports_completion() {
        let fx = fixture();
        let stats = Arc::new(StatisticsAggregator::new());
        let sink = Arc::new(RecordingSink::default());

        let summary = apply(&ScanSnapshot::default(), &fx.mapping, 2, sink.clone(), &stats);

        assert_eq!(summary.jobs, 0);
        assert_eq!(*sink.values.lock().expect("lock values"), vec![1.0]);
    }

    #[test]
    fn test_apply_unusable_mirror_directory_fails_its_files() {
        let fx = fixture();
        let snapshot = snapshot_of(&fx.source_root, &["top.txt", "sub/a.txt", "sub/b.txt"]);
        let mirror = fx.mapping.mirror_root();
        fs::create_dir_all(mirror).expect("create mirror root");
        fs::write(mirror.join("sub"), b"a file where a directory belongs").expect("block sub");

        let stats = Arc::new(StatisticsAggregator::new());
        let sink = Arc::new(RecordingSink::default());
        apply(&snapshot, &fx.mapping, 2, sink.clone(), &stats);

        let ops = stats.operations();
        assert_eq!(ops.failed, 2);
        assert_eq!(ops.added, 1);
        assert!(mirror.join("top.txt").exists());

        let values = sink.values.lock().expect("lock values").clone();
        assert!(values.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(values.last().copied(), Some(1.0));
        assert_eq!(values.iter().filter(|v| **v == 1.0).count(), 1);
    }

    #[test]
    #[cfg(unix)]
    fn test_apply_updates_read_only_target() {
        use std::os::unix::fs::PermissionsExt;

        let fx = fixture();
        let snapshot = snapshot_of(&fx.source_root, &["locked.txt"]);
        let target = fx.mapping.mirror_root().join("locked.txt");
        fs::create_dir_all(fx.mapping.mirror_root()).expect("create mirror root");
        fs::write(&target, b"old").expect("write stale target");
        filetime::set_file_mtime(&target, FileTime::from_unix_time(1_000, 0))
            .expect("age target");
        fs::set_permissions(&target, fs::Permissions::from_mode(0o444)).expect("lock target");

        let stats = Arc::new(StatisticsAggregator::new());
        apply(&snapshot, &fx.mapping, 1, Arc::new(NoProgress), &stats);

        assert_eq!(stats.operations().updated, 1);
        assert_eq!(fs::read(&target).expect("read target"), b"locked.txt");
    }
}
