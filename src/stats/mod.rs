//! Run statistics shared by every worker
//!
//! [`StatisticsAggregator`] is written to concurrently by the apply workers and
//! the cleanup pass, then frozen into a [`RunStatistics`] for reporting.

pub mod report;

use crate::types::OperationKind;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, OnceLock};
use std::time::{Duration, Instant};

/// Key used for files without an extension
pub const NO_EXTENSION: &str = "{none}";

/// How many extensions the report ranks
pub const TOP_EXTENSIONS: usize = 5;

/// Per-extension totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtensionStat {
    pub count: usize,
    pub bytes: u64,
}

/// Number of records per operation kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OperationCounts {
    pub added: usize,
    pub updated: usize,
    pub removed: usize,
    pub failed: usize,
}

impl OperationCounts {
    /// Operations that changed the target tree
    pub fn changes(&self) -> usize {
        self.added + self.updated + self.removed
    }
}

/// Frozen report of a finished run
#[derive(Debug, Clone, PartialEq)]
pub struct RunStatistics {
    pub elapsed: Duration,
    pub total_bytes: u64,
    pub operations: OperationCounts,
    /// Most frequent extensions, highest count first
    pub top_by_count: Vec<(String, usize)>,
    /// Heaviest extensions, most bytes first
    pub top_by_bytes: Vec<(String, u64)>,
}

/// Thread-safe accumulator for a single run.
///
/// The clock starts on construction.
#[derive(Debug)]
pub struct StatisticsAggregator {
    started: Instant,
    stopped: OnceLock<Duration>,
    bytes: AtomicU64,
    added: AtomicUsize,
    updated: AtomicUsize,
    removed: AtomicUsize,
    failed: AtomicUsize,
    extensions: Mutex<BTreeMap<String, ExtensionStat>>,
}

impl Default for StatisticsAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl StatisticsAggregator {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            stopped: OnceLock::new(),
            bytes: AtomicU64::new(0),
            added: AtomicUsize::new(0),
            updated: AtomicUsize::new(0),
            removed: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
            extensions: Mutex::new(BTreeMap::new()),
        }
    }

    /// Record one processed file.
    ///
    /// Transfers (`Add`/`Update`) also count the file's current size, read
    /// from `path`, towards the byte totals.
    pub fn record(&self, path: &Path, kind: OperationKind) {
        self.counter(kind).fetch_add(1, Ordering::Relaxed);
        if !kind.is_transfer() {
            return;
        }

        let size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
        self.bytes.fetch_add(size, Ordering::Relaxed);

        let mut extensions = self
            .extensions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let stat = extensions.entry(extension_key(path)).or_default();
        stat.count += 1;
        stat.bytes += size;
    }

    /// Freeze the clock. Later calls keep the first value.
    pub fn stop(&self) {
        self.stopped.get_or_init(|| self.started.elapsed());
    }

    /// Frozen duration after [`stop`](Self::stop), live value before it.
    pub fn elapsed(&self) -> Duration {
        match self.stopped.get() {
            Some(elapsed) => *elapsed,
            None => self.started.elapsed(),
        }
    }

    pub fn total_bytes(&self) -> u64 {
        self.bytes.load(Ordering::Relaxed)
    }

    pub fn operations(&self) -> OperationCounts {
        OperationCounts {
            added: self.added.load(Ordering::Relaxed),
            updated: self.updated.load(Ordering::Relaxed),
            removed: self.removed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }

    /// Stop the clock and take a snapshot of everything recorded.
    pub fn finalize(&self) -> RunStatistics {
        self.stop();

        let extensions: Vec<(String, ExtensionStat)> = self
            .extensions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .map(|(ext, stat)| (ext.clone(), *stat))
            .collect();

        // BTreeMap order + stable sort: ties stay alphabetical
        let mut by_count = extensions.clone();
        by_count.sort_by(|a, b| b.1.count.cmp(&a.1.count));
        let mut by_bytes = extensions;
        by_bytes.sort_by(|a, b| b.1.bytes.cmp(&a.1.bytes));

        RunStatistics {
            elapsed: self.elapsed(),
            total_bytes: self.total_bytes(),
            operations: self.operations(),
            top_by_count: by_count
                .into_iter()
                .take(TOP_EXTENSIONS)
                .map(|(ext, stat)| (ext, stat.count))
                .collect(),
            top_by_bytes: by_bytes
                .into_iter()
                .take(TOP_EXTENSIONS)
                .map(|(ext, stat)| (ext, stat.bytes))
                .collect(),
        }
    }

    fn counter(&self, kind: OperationKind) -> &AtomicUsize {
        match kind {
            OperationKind::Add => &self.added,
            OperationKind::Update => &self.updated,
            OperationKind::Remove => &self.removed,
            OperationKind::Failure => &self.failed,
        }
    }
}

/// Lower-cased extension of `path`, or [`NO_EXTENSION`].
pub fn extension_key(path: &Path) -> String {
    match path.extension() {
        Some(ext) => ext.to_string_lossy().to_lowercase(),
        None => NO_EXTENSION.to_string(),
    }
}
