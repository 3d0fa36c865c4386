//! Terminal output

pub mod console;
mod progress;

pub use progress::ProgressReporter;
