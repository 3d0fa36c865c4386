//! Sequential source walker producing a `ScanSnapshot`

use super::PathFilter;
use crate::types::ScanSnapshot;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// What the walker made of a single entry.
enum EntryOutcome {
    /// Regular file that passed every filter
    Eligible { directory: PathBuf, file: PathBuf },
    /// Directory, special file, filtered-out file, or oversized file
    Ignored,
    /// Entry or directory listing that could not be read
    Unreadable(ignore::Error),
}

/// Scan `root_path` and group eligible files by their directory.
///
/// Directories rejected by `filter` are pruned before they are read, so
/// neither their files nor their subtrees show up. Read failures (permission
/// denied, entries vanishing mid-walk, overlong paths) skip only the affected
/// entry; the walk itself never fails. With `verbose` set each failure is
/// logged as a warning, otherwise at debug level.
pub fn scan_directory(
    root_path: &Path,
    filter: &PathFilter,
    max_size: u64,
    verbose: bool,
) -> ScanSnapshot {
    let start_time = Instant::now();
    let dir_filter = Arc::new(filter.clone());

    let walker = ignore::WalkBuilder::new(root_path)
        .standard_filters(false) // mirror hidden and git-ignored files too
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(move |entry| {
            let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
            entry.depth() == 0 || !is_dir || dir_filter.accepts_directory(entry.file_name())
        })
        .build();

    let mut directories: BTreeMap<PathBuf, Vec<PathBuf>> = BTreeMap::new();
    let mut unreadable = 0usize;

    for result in walker {
        match classify(result, filter, max_size) {
            EntryOutcome::Eligible { directory, file } => {
                directories.entry(directory).or_default().push(file);
            }
            EntryOutcome::Ignored => {}
            EntryOutcome::Unreadable(error) => {
                unreadable += 1;
                if verbose {
                    warn!("Skipping unreadable entry during scan: {}", error);
                } else {
                    debug!("Skipping unreadable entry during scan: {}", error);
                }
            }
        }
    }

    let snapshot = ScanSnapshot::from_entries(directories);
    debug!(
        root = %root_path.display(),
        directories = snapshot.directory_count(),
        files = snapshot.file_count(),
        unreadable,
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "scan complete"
    );
    snapshot
}

fn classify(
    result: Result<ignore::DirEntry, ignore::Error>,
    filter: &PathFilter,
    max_size: u64,
) -> EntryOutcome {
    let entry = match result {
        Ok(entry) => entry,
        Err(e) => return EntryOutcome::Unreadable(e),
    };

    // Symlinks and special files are left alone
    if !entry.file_type().is_some_and(|ft| ft.is_file()) {
        return EntryOutcome::Ignored;
    }

    if !filter.accepts_file(entry.file_name()) {
        return EntryOutcome::Ignored;
    }

    let metadata = match entry.metadata() {
        Ok(m) => m,
        Err(e) => return EntryOutcome::Unreadable(e),
    };
    if metadata.len() > max_size {
        debug!(
            path = %entry.path().display(),
            size = metadata.len(),
            "file exceeds maximum size, skipping"
        );
        return EntryOutcome::Ignored;
    }

    match entry.path().parent() {
        Some(directory) => EntryOutcome::Eligible {
            directory: directory.to_path_buf(),
            file: entry.path().to_path_buf(),
        },
        None => EntryOutcome::Ignored,
    }
}
