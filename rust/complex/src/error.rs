use thiserror::Error;

/// Result type for complex operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the subdivision machinery.
///
/// These are invariant violations — a bug or an unmodelled predicate
/// outcome, never a user error. Numeric decisions themselves never fail.
#[derive(Error, Debug)]
pub enum Error {
    #[error("no rotation pivot while partitioning the edge cycle of face {0}")]
    CyclePartitionPivot(usize),

    #[error("edge cycle of face {0} never returns to the splitting plane")]
    CyclePartitionClose(usize),

    #[error("cannot orient degenerate common face {0}")]
    DegenerateCommonFace(usize),

    #[error("invariant violated: {0}")]
    Invariant(String),
}
