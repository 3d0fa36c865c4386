//! Core type definitions for mirra

mod action;
mod error;
mod mapping;
mod snapshot;

pub use action::{OperationKind, SyncDecision};
pub use error::MirraError;
pub use mapping::PathMapping;
pub use snapshot::ScanSnapshot;
