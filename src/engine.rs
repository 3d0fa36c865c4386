//! One sync run, from scan to final statistics

use crate::cleanup::{cleanup, CleanupSummary};
use crate::config::SyncConfig;
use crate::executor::{apply, ApplySummary, ProgressSink};
use crate::scanner::{scan_directory, PathFilter};
use crate::stats::{RunStatistics, StatisticsAggregator};
use crate::types::PathMapping;
use std::sync::Arc;
use tracing::info;

/// Everything a run produced
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub statistics: RunStatistics,
    pub apply: ApplySummary,
    pub cleanup: CleanupSummary,
}

/// Engine for a single run; build a new one per invocation.
#[derive(Debug, Clone)]
pub struct SyncEngine {
    filter: PathFilter,
    mapping: PathMapping,
    threads: usize,
    max_size: u64,
    verbose: bool,
}

impl SyncEngine {
    /// Prepare a run. `config` is expected to be validated already.
    pub fn new(config: &SyncConfig) -> Self {
        Self {
            filter: PathFilter::from_config(config),
            mapping: PathMapping::new(&config.source, config.mirror_root()),
            threads: config.resolved_threads(),
            max_size: config.max_size,
            verbose: config.verbose,
        }
    }

    pub fn mapping(&self) -> &PathMapping {
        &self.mapping
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Scan, apply, clean up, and report, strictly in that order.
    ///
    /// File-level problems show up in the statistics as failures; the run
    /// itself always completes.
    pub fn run(&self, progress: Arc<dyn ProgressSink>) -> RunOutcome {
        let stats = Arc::new(StatisticsAggregator::new());

        let snapshot = scan_directory(
            self.mapping.source_root(),
            &self.filter,
            self.max_size,
            self.verbose,
        );
        info!(
            directories = snapshot.directory_count(),
            files = snapshot.file_count(),
            "scanned source"
        );

        let apply_summary = apply(&snapshot, &self.mapping, self.threads, progress, &stats);
        let cleanup_summary = cleanup(&snapshot, &self.mapping, &stats);

        RunOutcome {
            statistics: stats.finalize(),
            apply: apply_summary,
            cleanup: cleanup_summary,
        }
    }
}
