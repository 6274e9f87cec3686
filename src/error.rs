use thiserror::Error;

/// Errors surfaced by the engine. Queries either fail validation up front
/// or run to completion; nothing errors mid-search except a broken invariant.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Malformed or contradictory query parameters. Carries the offending field.
    #[error("invalid input for `{field}`: {reason}")]
    InvalidInput {
        field: &'static str,
        reason: String,
    },
    /// An internal invariant was violated, e.g. subtracting a profile that is
    /// not contained in the minuend. Indicates a defect, not a caller mistake.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot error: {0}")]
    Snapshot(#[from] bincode::Error),
    #[error("index build error: {0}")]
    IndexBuild(#[from] fst::Error),
}

impl EngineError {
    pub fn invalid_input(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}
