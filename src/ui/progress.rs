//! Progress reporting

use crate::executor::ProgressSink;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Resolution of the transfer bar
const BAR_STEPS: u64 = 1000;

/// Console progress: a spinner while scanning, then a bar once files move.
pub struct ProgressReporter {
    bar: ProgressBar,
    transferring: AtomicBool,
}

impl ProgressReporter {
    /// Create a new progress reporter
    pub fn new() -> Self {
        Self::with_bar(ProgressBar::new_spinner())
    }

    /// Reporter that draws nothing, for tests and non-interactive output.
    pub fn hidden() -> Self {
        Self::with_bar(ProgressBar::with_draw_target(
            None,
            ProgressDrawTarget::hidden(),
        ))
    }

    fn with_bar(bar: ProgressBar) -> Self {
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            bar.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "));
        }
        bar.set_message("Scanning source...");
        bar.enable_steady_tick(Duration::from_millis(120));

        Self {
            bar,
            transferring: AtomicBool::new(false),
        }
    }

    /// Clear the bar from the terminal.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    fn start_transfer(&self) {
        if let Ok(style) =
            ProgressStyle::with_template("{bar:30.cyan/blue} {percent:>3}% | {elapsed} | {msg}")
        {
            self.bar.set_style(style.progress_chars("=>-"));
        }
        self.bar.set_length(BAR_STEPS);
        self.bar.set_message("Syncing files");
    }
}

impl ProgressSink for ProgressReporter {
    fn report(&self, fraction: f64) {
        if !self.transferring.swap(true, Ordering::AcqRel) {
            self.start_transfer();
        }
        let position = (fraction.clamp(0.0, 1.0) * BAR_STEPS as f64).round() as u64;
        self.bar.set_position(position);
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_report_switches_to_bar() {
        let reporter = ProgressReporter::hidden();
        assert_eq!(reporter.bar.length(), None);

        reporter.report(0.25);

        assert_eq!(reporter.bar.length(), Some(BAR_STEPS));
        assert_eq!(reporter.bar.position(), 250);
    }

    #[test]
    fn test_report_clamps_fraction() {
        let reporter = ProgressReporter::hidden();
        reporter.report(1.5);
        assert_eq!(reporter.bar.position(), BAR_STEPS);
    }

    #[test]
    fn test_scan_message_is_shown_before_transfer() {
        let reporter = ProgressReporter::hidden();
        assert!(reporter.bar.message().contains("Scanning"));
        reporter.report(0.5);
        assert!(reporter.bar.message().contains("Syncing"));
        reporter.finish();
    }
}
