//! Main sync command

use crate::engine::{RunOutcome, SyncEngine};
use crate::stats::report;
use crate::types::MirraError;
use crate::ui::console::{self, MessageKind};
use crate::ui::ProgressReporter;
use crate::SyncConfig;
use std::io::ErrorKind;
use std::sync::Arc;
use tracing::debug;

/// Run the sync operation and print its report.
pub fn run(config: &SyncConfig) -> RunOutcome {
    console::print_start();

    let engine = SyncEngine::new(config);
    debug!(
        source = %engine.mapping().source_root().display(),
        mirror = %engine.mapping().mirror_root().display(),
        threads = engine.threads(),
        "starting sync"
    );

    let reporter = Arc::new(ProgressReporter::new());
    let outcome = engine.run(reporter.clone());
    reporter.finish();

    for line in report::render(&outcome.statistics, config.verbose) {
        console::print_tagged(MessageKind::Info, &line);
    }
    let operations = &outcome.statistics.operations;
    if operations.changes() == 0 && operations.failed == 0 {
        console::print_tagged(MessageKind::Info, "Mirror is already up to date");
    }
    if outcome.apply.inline {
        console::print_tagged(
            MessageKind::Info,
            "Worker pool unavailable, files were copied on the main thread",
        );
    }

    outcome
}

/// Message and optional hint shown for an error that stops the run.
pub fn humanize_error(error: &MirraError) -> (String, Option<&'static str>) {
    match error {
        MirraError::Io(io) => match io.kind() {
            ErrorKind::NotFound => (
                "File or directory was not found".to_string(),
                Some("Verify the path still exists and retry."),
            ),
            ErrorKind::PermissionDenied => (
                "Permission denied while accessing file".to_string(),
                Some("Check file permissions or run with a user that has access."),
            ),
            _ => (format!("I/O operation failed: {}", io), None),
        },
        MirraError::PermissionDenied { path } => (
            format!("Permission denied: {}", path.display()),
            Some("Check file permissions or run with a user that has access."),
        ),
        MirraError::Config(msg) | MirraError::Validation(msg) => {
            (msg.clone(), Some("Run `mirra --help` for the accepted options."))
        }
        MirraError::Pool(msg) => (format!("Worker pool failed: {}", msg), None),
    }
}
