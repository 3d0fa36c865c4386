//! Human-readable rendering of `RunStatistics`

use super::RunStatistics;
use indicatif::HumanBytes;
use std::time::Duration;

/// Report lines for the console, one statistic per line.
pub fn render(stats: &RunStatistics, verbose: bool) -> Vec<String> {
    let ops = &stats.operations;
    let mut lines = vec![
        format!("Elapsed time:\t\t{}", format_elapsed(stats.elapsed)),
        format!("Added files:\t\t{}", ops.added),
        format!("Updated files:\t\t{}", ops.updated),
        format!("Removed files:\t\t{}", ops.removed),
    ];
    if ops.failed > 0 {
        lines.push(format!("Failed files:\t\t{}", ops.failed));
    }
    if verbose {
        lines.push(format!("Bytes copied:\t\t{}", stats.total_bytes));
    }
    lines.push(format!("Approximate size:\t{}", HumanBytes(stats.total_bytes)));

    if verbose && !stats.top_by_count.is_empty() {
        let frequent = stats
            .top_by_count
            .iter()
            .map(|(ext, count)| format!("{}: {}", ext, count))
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!("Frequent extensions:\t{}", frequent));

        let heaviest = stats
            .top_by_bytes
            .iter()
            .map(|(ext, bytes)| format!("{}: {}", ext, HumanBytes(*bytes)))
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!("Heaviest extensions:\t{}", heaviest));
    }

    lines
}

/// `h:mm:ss.mmm`
pub fn format_elapsed(elapsed: Duration) -> String {
    let total_secs = elapsed.as_secs();
    format!(
        "{}:{:02}:{:02}.{:03}",
        total_secs / 3600,
        (total_secs / 60) % 60,
        total_secs % 60,
        elapsed.subsec_millis()
    )
}
