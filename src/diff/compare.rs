//! File comparison logic

use crate::types::{MirraError, SyncDecision};
use std::io::ErrorKind;
use std::path::Path;
use std::time::SystemTime;

/// Decide whether `source` has to be copied to `target`.
///
/// * target missing → `Copy { is_update: false }`
/// * source strictly newer than target → `Copy { is_update: true }`
/// * anything else, including equal timestamps → `Skip`
///
/// Sizes are deliberately not compared. A source whose metadata can't be
/// read yields an error that the caller records as a failure.
pub fn decide(source: &Path, target: &Path) -> Result<SyncDecision, MirraError> {
    let source_mtime = std::fs::metadata(source)
        .and_then(|m| m.modified())
        .map_err(|e| MirraError::from_io(source, e))?;

    let target_mtime = match std::fs::metadata(target) {
        Ok(metadata) => Some(
            metadata
                .modified()
                .map_err(|e| MirraError::from_io(target, e))?,
        ),
        Err(e) if e.kind() == ErrorKind::NotFound => None,
        Err(e) => return Err(MirraError::from_io(target, e)),
    };

    Ok(compare_mtimes(source_mtime, target_mtime))
}

/// Metadata-only half of [`decide`].
pub fn compare_mtimes(source: SystemTime, target: Option<SystemTime>) -> SyncDecision {
    match target {
        None => SyncDecision::Copy { is_update: false },
        Some(target) if source > target => SyncDecision::Copy { is_update: true },
        Some(_) => SyncDecision::Skip,
    }
}
