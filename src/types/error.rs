//! Error types for mirra

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error types for mirra operations
#[derive(Debug, Error)]
pub enum MirraError {
    /// Standard IO error (automatically converted via #[from])
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation error (logic checks)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Permission denied for specific path
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Worker pool failure (closed queue, panicked task)
    #[error("Worker pool error: {0}")]
    Pool(String),
}

impl MirraError {
    /// Classify an IO error raised while touching `path`.
    pub fn from_io(path: &Path, error: std::io::Error) -> Self {
        if error.kind() == ErrorKind::PermissionDenied {
            MirraError::PermissionDenied {
                path: path.to_path_buf(),
            }
        } else {
            MirraError::Io(error)
        }
    }

    /// Check if this error is related to permissions
    pub fn is_permission_error(&self) -> bool {
        match self {
            MirraError::PermissionDenied { .. } => true,
            MirraError::Io(e) => e.kind() == ErrorKind::PermissionDenied,
            _ => false,
        }
    }
}
