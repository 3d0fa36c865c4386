//! Path translation between the source tree and its mirror

use std::path::{Path, PathBuf};

/// Maps directories between `source_root` and `mirror_root`.
///
/// Both roots are expected to be absolute; relative paths under one root
/// land at the same relative position under the other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMapping {
    source_root: PathBuf,
    mirror_root: PathBuf,
}

impl PathMapping {
    pub fn new(source_root: impl Into<PathBuf>, mirror_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
            mirror_root: mirror_root.into(),
        }
    }

    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    pub fn mirror_root(&self) -> &Path {
        &self.mirror_root
    }

    /// Mirror location of a source path; `None` if it lies outside the source root.
    pub fn to_mirror(&self, source_path: &Path) -> Option<PathBuf> {
        source_path
            .strip_prefix(&self.source_root)
            .ok()
            .map(|relative| join_relative(&self.mirror_root, relative))
    }

    /// Source location of a mirror path; `None` if it lies outside the mirror root.
    pub fn to_source(&self, mirror_path: &Path) -> Option<PathBuf> {
        mirror_path
            .strip_prefix(&self.mirror_root)
            .ok()
            .map(|relative| join_relative(&self.source_root, relative))
    }
}

// `root.join("")` would append a trailing separator
fn join_relative(root: &Path, relative: &Path) -> PathBuf {
    if relative.as_os_str().is_empty() {
        root.to_path_buf()
    } else {
        root.join(relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping() -> PathMapping {
        PathMapping::new("/data/photos", "/backup/photos")
    }

    #[test]
    fn test_to_mirror() {
        assert_eq!(
            mapping().to_mirror(Path::new("/data/photos/2024/may")),
            Some(PathBuf::from("/backup/photos/2024/may"))
        );
    }

    #[test]
    fn test_roots_map_onto_each_other() {
        let m = mapping();
        assert_eq!(
            m.to_mirror(Path::new("/data/photos")),
            Some(PathBuf::from("/backup/photos"))
        );
        assert_eq!(
            m.to_source(Path::new("/backup/photos")),
            Some(PathBuf::from("/data/photos"))
        );
    }

    #[test]
    fn test_to_source_reverses_to_mirror() {
        let m = mapping();
        let source = Path::new("/data/photos/a/b");
        let mirrored = m.to_mirror(source).expect("inside source root");
        assert_eq!(m.to_source(&mirrored).as_deref(), Some(source));
    }

    #[test]
    fn test_paths_outside_roots() {
        let m = mapping();
        assert!(m.to_mirror(Path::new("/data/music")).is_none());
        assert!(m.to_source(Path::new("/backup/music")).is_none());
    }
}
