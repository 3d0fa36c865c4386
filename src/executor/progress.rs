//! Progress fractions delivered from the apply workers

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Receiver of progress updates in `[0.0, 1.0]`.
///
/// Called from worker threads; implementations must not block for long.
pub trait ProgressSink: Send + Sync {
    fn report(&self, fraction: f64);
}

/// Sink that drops every update
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _fraction: f64) {}
}

#[derive(Debug, Default)]
struct Reported {
    processed: usize,
    done: bool,
}

/// Counts processed files and forwards the fraction to a [`ProgressSink`].
///
/// Workers pay one atomic increment plus a `try_lock`; when another worker
/// is already reporting, the update is folded into that worker's report.
/// The sink therefore sees a non-decreasing sequence, and [`finish`]
/// guarantees the last value it sees is exactly `1.0`.
///
/// [`finish`]: ProgressTracker::finish
pub struct ProgressTracker {
    sink: Arc<dyn ProgressSink>,
    total: usize,
    processed: AtomicUsize,
    reported: Mutex<Reported>,
}

impl ProgressTracker {
    pub fn new(sink: Arc<dyn ProgressSink>, total: usize) -> Self {
        Self {
            sink,
            total,
            processed: AtomicUsize::new(0),
            reported: Mutex::new(Reported::default()),
        }
    }

    /// Mark one file as processed, whatever its outcome.
    pub fn advance(&self) {
        self.processed.fetch_add(1, Ordering::AcqRel);

        let Ok(mut reported) = self.reported.try_lock() else {
            return;
        };
        let current = self.processed.load(Ordering::Acquire).min(self.total);
        if current > reported.processed && !reported.done {
            reported.processed = current;
            reported.done = current == self.total;
            self.sink.report(fraction(current, self.total));
        }
    }

    /// Report completion if the workers did not already.
    pub fn finish(&self) {
        let mut reported = self
            .reported
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if !reported.done {
            reported.processed = self.total;
            reported.done = true;
            self.sink.report(1.0);
        }
    }

    pub fn processed(&self) -> usize {
        self.processed.load(Ordering::Acquire)
    }
}

fn fraction(processed: usize, total: usize) -> f64 {
    if total == 0 || processed >= total {
        1.0
    } else {
        processed as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[derive(Default)]
    struct RecordingSink {
        values: Mutex<Vec<f64>>,
    }

    impl ProgressSink for RecordingSink {
        fn report(&self, fraction: f64) {
            self.values.lock().expect("lock values").push(fraction);
        }
    }

    #[test]
    fn test_sequential_progress_reports_every_step() {
        let sink = Arc::new(RecordingSink::default());
        let tracker = ProgressTracker::new(sink.clone(), 4);
        for _ in 0..4 {
            tracker.advance();
        }
        tracker.finish();

        let values = sink.values.lock().expect("lock values").clone();
        assert_eq!(values, vec![0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn test_finish_reports_one_for_empty_run() {
        let sink = Arc::new(RecordingSink::default());
        let tracker = ProgressTracker::new(sink.clone(), 0);
        tracker.finish();
        tracker.finish();

        assert_eq!(*sink.values.lock().expect("lock values"), vec![1.0]);
    }

    #[test]
    fn test_concurrent_progress_is_monotonic_and_complete() {
        let sink = Arc::new(RecordingSink::default());
        let tracker = Arc::new(ProgressTracker::new(sink.clone(), 4_000));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let tracker = Arc::clone(&tracker);
                thread::spawn(move || {
                    for _ in 0..500 {
                        tracker.advance();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("join worker");
        }
        tracker.finish();

        let values = sink.values.lock().expect("lock values").clone();
        assert!(values.windows(2).all(|w| w[0] <= w[1]), "progress went backwards");
        assert_eq!(values.last().copied(), Some(1.0));
        assert_eq!(values.iter().filter(|v| **v == 1.0).count(), 1);
        assert_eq!(tracker.processed(), 4_000);
    }
}
