//! Mirror cleanup: prune what the source no longer has

use crate::stats::StatisticsAggregator;
use crate::types::{MirraError, OperationKind, PathMapping, ScanSnapshot};
use std::fs;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// What a cleanup pass did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupSummary {
    pub removed_files: usize,
    pub removed_dirs: usize,
    /// Stale entries that could not be deleted
    pub skipped: usize,
}

/// Remove stale files and emptied directories from the mirror.
///
/// Walks `mapping.mirror_root()` children-first. A file is stale when its
/// directory maps back to a source directory missing from `snapshot`, or when
/// its name is not among that directory's eligible files. Each deleted file
/// is recorded as `Remove`. Once a directory's contents have been handled it
/// is deleted if nothing is left in it, so empty chains collapse upward.
/// The mirror root itself is kept.
///
/// Must only run after the apply pass has finished. Deletion failures are
/// skipped without a record.
pub fn cleanup(
    snapshot: &ScanSnapshot,
    mapping: &PathMapping,
    stats: &StatisticsAggregator,
) -> CleanupSummary {
    let mut summary = CleanupSummary::default();
    let mirror_root = mapping.mirror_root();
    if !mirror_root.is_dir() {
        return summary;
    }

    let names = snapshot.file_names();
    let walker = WalkDir::new(mirror_root)
        .follow_links(false)
        .contents_first(true);

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!("skipping unreadable mirror entry: {}", e);
                continue;
            }
        };

        if entry.file_type().is_dir() {
            if entry.depth() > 0 && is_empty_dir(entry.path()) {
                match fs::remove_dir(entry.path()) {
                    Ok(()) => summary.removed_dirs += 1,
                    Err(e) => {
                        summary.skipped += 1;
                        let error = MirraError::from_io(entry.path(), e);
                        debug!(
                            path = %entry.path().display(),
                            permission = error.is_permission_error(),
                            "cannot remove directory: {}", error
                        );
                    }
                }
            }
            continue;
        }

        let source_dir = match entry.path().parent().and_then(|p| mapping.to_source(p)) {
            Some(dir) => dir,
            None => continue,
        };
        let stale = match names.get(&source_dir.as_path()) {
            Some(expected) => !expected.contains(entry.file_name()),
            None => true,
        };
        if !stale {
            continue;
        }

        match fs::remove_file(entry.path()) {
            Ok(()) => {
                summary.removed_files += 1;
                stats.record(entry.path(), OperationKind::Remove);
            }
            Err(e) => {
                summary.skipped += 1;
                let error = MirraError::from_io(entry.path(), e);
                debug!(
                    path = %entry.path().display(),
                    permission = error.is_permission_error(),
                    "cannot remove stale file: {}", error
                );
            }
        }
    }

    debug!(
        removed_files = summary.removed_files,
        removed_dirs = summary.removed_dirs,
        skipped = summary.skipped,
        "cleanup complete"
    );
    summary
}

fn is_empty_dir(path: &Path) -> bool {
    fs::read_dir(path)
        .map(|mut entries| entries.next().is_none())
        .unwrap_or(false)
}
