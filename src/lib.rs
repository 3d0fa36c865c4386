//! # mirra - One-way directory mirroring
//!
//! Keeps `<target>/<source name>` an exact copy of the eligible files under
//! a source tree. New and newer files are copied in parallel, files and
//! directories that disappeared from the source are pruned, and each run
//! ends with a statistics report.

// Module declarations
pub mod cleanup;
pub mod commands;
pub mod config;
pub mod diff;
pub mod engine;
pub mod executor;
pub mod scanner;
pub mod stats;
pub mod types;
pub mod ui;

// Re-export commonly used types
pub use config::SyncConfig;
pub use engine::{RunOutcome, SyncEngine};
pub use executor::ProgressSink;
pub use stats::RunStatistics;
pub use types::{MirraError, OperationKind, ScanSnapshot};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
