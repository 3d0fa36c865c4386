//! Per-file sync decisions

mod compare;

pub use compare::{compare_mtimes, decide};
