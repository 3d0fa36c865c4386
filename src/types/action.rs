//! Decisions made by the planner and the records they produce

/// What the planner wants done with a single source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncDecision {
    /// Target is up to date (or newer)
    Skip,

    /// Copy source over target; `is_update` is false when the target is missing
    Copy { is_update: bool },
}

/// Classification recorded for every processed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Add,
    Update,
    Remove,
    Failure,
}

impl OperationKind {
    /// Whether this kind moved bytes into the target tree
    pub fn is_transfer(&self) -> bool {
        matches!(self, OperationKind::Add | OperationKind::Update)
    }
}
