//! Name-based eligibility rules for files and directories

use crate::config::SyncConfig;
use std::collections::HashSet;
use std::ffi::OsStr;
use std::path::Path;

/// Decides which files and directories take part in a sync.
///
/// Works purely on names: nothing here touches the filesystem.
///
/// * A non-empty inclusion set admits only the listed extensions and the
///   exclusion set is ignored.
/// * An empty inclusion set admits everything not in the exclusion set.
/// * Directories are rejected by exact name, wherever they appear.
#[derive(Debug, Clone, Default)]
pub struct PathFilter {
    include: HashSet<String>,
    exclude: HashSet<String>,
    excluded_dirs: HashSet<String>,
}

impl PathFilter {
    pub fn new<S: AsRef<str>>(include: &[S], exclude: &[S], excluded_dirs: &[S]) -> Self {
        Self {
            include: include.iter().map(|e| normalize(e.as_ref())).collect(),
            exclude: exclude.iter().map(|e| normalize(e.as_ref())).collect(),
            excluded_dirs: excluded_dirs
                .iter()
                .map(|d| d.as_ref().to_string())
                .collect(),
        }
    }

    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(&config.include, &config.exclude, &config.excluded_dirs)
    }

    /// Check an extension (without the dot); `None` means the file has none.
    pub fn accepts_extension(&self, extension: Option<&str>) -> bool {
        let extension = extension.map(normalize);
        if !self.include.is_empty() {
            return extension.is_some_and(|e| self.include.contains(&e));
        }
        extension.map_or(true, |e| !self.exclude.contains(&e))
    }

    /// Check a file by its name or path.
    pub fn accepts_file<P: AsRef<Path>>(&self, path: P) -> bool {
        match path.as_ref().extension() {
            Some(ext) => match ext.to_str() {
                Some(ext) => self.accepts_extension(Some(ext)),
                // Non UTF-8 extensions can't match a configured one
                None => self.include.is_empty(),
            },
            None => self.accepts_extension(None),
        }
    }

    /// Check a directory by its bare name.
    pub fn accepts_directory<N: AsRef<OsStr>>(&self, name: N) -> bool {
        match name.as_ref().to_str() {
            Some(name) => !self.excluded_dirs.contains(name),
            None => true,
        }
    }
}

fn normalize(extension: &str) -> String {
    extension.trim_start_matches('.').to_lowercase()
}
