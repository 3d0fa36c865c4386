//! ScanSnapshot - eligible source files grouped by directory

use std::collections::{BTreeMap, HashSet};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Result of one source scan.
///
/// Maps each absolute source directory to the absolute paths of its eligible
/// files. Only directories holding at least one eligible file are present.
/// Built once by the scanner and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSnapshot {
    directories: BTreeMap<PathBuf, Vec<PathBuf>>,
}

impl ScanSnapshot {
    /// Assemble a snapshot from `(directory, files)` pairs, dropping empty lists.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (PathBuf, Vec<PathBuf>)>,
    {
        let mut directories: BTreeMap<PathBuf, Vec<PathBuf>> = BTreeMap::new();
        for (dir, files) in entries {
            if files.is_empty() {
                continue;
            }
            directories.entry(dir).or_default().extend(files);
        }
        Self { directories }
    }

    /// Files recorded for `directory`, if any.
    pub fn files_in(&self, directory: &Path) -> Option<&[PathBuf]> {
        self.directories.get(directory).map(Vec::as_slice)
    }

    pub fn contains_directory(&self, directory: &Path) -> bool {
        self.directories.contains_key(directory)
    }

    /// Iterate `(directory, files)` in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&PathBuf, &Vec<PathBuf>)> {
        self.directories.iter()
    }

    /// Number of directories with eligible files
    pub fn directory_count(&self) -> usize {
        self.directories.len()
    }

    /// Number of eligible files across all directories
    pub fn file_count(&self) -> usize {
        self.directories.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.directories.is_empty()
    }

    /// File names per directory, the join key between source and target roots.
    pub fn file_names(&self) -> BTreeMap<&Path, HashSet<OsString>> {
        self.directories
            .iter()
            .map(|(dir, files)| {
                let names = files
                    .iter()
                    .filter_map(|f| f.file_name().map(|n| n.to_os_string()))
                    .collect();
                (dir.as_path(), names)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_entries_drops_empty_directories() {
        let snapshot = ScanSnapshot::from_entries(vec![
            (PathBuf::from("/src"), vec![PathBuf::from("/src/a.txt")]),
            (PathBuf::from("/src/empty"), vec![]),
        ]);

        assert_eq!(snapshot.directory_count(), 1);
        assert!(snapshot.contains_directory(Path::new("/src")));
        assert!(!snapshot.contains_directory(Path::new("/src/empty")));
    }

    #[test]
    fn test_file_count_sums_all_directories() {
        let snapshot = ScanSnapshot::from_entries(vec![
            (
                PathBuf::from("/src"),
                vec![PathBuf::from("/src/a.txt"), PathBuf::from("/src/b.txt")],
            ),
            (PathBuf::from("/src/sub"), vec![PathBuf::from("/src/sub/c.md")]),
        ]);

        assert_eq!(snapshot.file_count(), 3);
        assert_eq!(
            snapshot.files_in(Path::new("/src/sub")),
            Some(&[PathBuf::from("/src/sub/c.md")][..])
        );
    }

    #[test]
    fn test_file_names_are_keyed_by_directory() {
        let snapshot = ScanSnapshot::from_entries(vec![(
            PathBuf::from("/src/docs"),
            vec![PathBuf::from("/src/docs/readme.md")],
        )]);

        let names = snapshot.file_names();
        let docs = names.get(Path::new("/src/docs")).expect("docs entry");
        assert!(docs.contains(&OsString::from("readme.md")));
        assert!(snapshot.files_in(Path::new("/src")).is_none());
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = ScanSnapshot::default();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.file_count(), 0);
    }
}
