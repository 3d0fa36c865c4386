//! Directory scanning logic

mod filter;
mod walker;

pub use filter::PathFilter;
pub use walker::scan_directory;
